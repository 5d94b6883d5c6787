use std::borrow::Cow;

use tracing::{debug, trace, warn};
use url::Url;

use crate::rules::matcher::host_matches;
use crate::rules::{RedirectHandler, RuleSet};
use super::extractor::absolute_target;
use super::url_validator::{extract_host, validate_url, MAX_URL_LENGTH};

/// Default bound on nested redirector unwrapping.
pub const MAX_REDIRECT_DEPTH: usize = 5;

const GOOGLE_HOST: &str = "google.com";
const GOOGLE_REDIRECT_PARAM: &str = "url";
const YOUTU_BE_HOST: &str = "youtu.be";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

// Shorteners that hide their target server-side; nothing to recover offline.
const OPAQUE_SHORTENERS: &[&str] = &["goo.gl", "bit.ly", "t.co", "tinyurl.com", "ow.ly", "buff.ly"];

/// Unwraps redirectors and short links without touching the network.
#[derive(Debug, Clone, Copy)]
pub struct RedirectResolver<'a> {
    rules: &'a RuleSet,
    max_depth: usize,
    max_url_length: usize,
}

impl<'a> RedirectResolver<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            max_depth: MAX_REDIRECT_DEPTH,
            max_url_length: MAX_URL_LENGTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_url_length(mut self, max_url_length: usize) -> Self {
        self.max_url_length = max_url_length;
        self
    }

    /// Resolves `url` to the destination it points at.
    ///
    /// URLs that are not redirectors come back unchanged. `None` means a
    /// redirector was recognised but its target could not be recovered:
    /// the parameter is missing, the target is not a URL, the short link has
    /// no id, or the chain nests deeper than the configured bound.
    pub fn resolve(&self, url: &str) -> Option<String> {
        self.resolve_at_depth(url, 0)
    }

    fn resolve_at_depth(&self, url: &str, depth: usize) -> Option<String> {
        let parsed = validate_url(url, self.max_url_length).ok()?;
        let host = extract_host(&parsed)?;
        trace!("Resolving {} (depth {})", url, depth);

        if let Some(handler) = self.rules.redirect_handler(&host) {
            debug!("Redirect handler matched host {}", host);
            return self.apply_handler(url, &parsed, handler, depth);
        }

        if host_matches(&host, GOOGLE_HOST) {
            if let Some(target) = query_param(&parsed, GOOGLE_REDIRECT_PARAM) {
                debug!("Unwrapping Google redirect from {}", host);
                return self.follow(&target, depth);
            }
        }

        if host_matches(&host, YOUTU_BE_HOST) {
            return match last_path_segment(&parsed) {
                Some(video_id) => {
                    debug!("Expanding short link for video {}", video_id);
                    Some(format!("{}{}", YOUTUBE_WATCH_URL, video_id))
                }
                None => {
                    warn!("Short link without video id: {}", url);
                    None
                }
            };
        }

        if OPAQUE_SHORTENERS.iter().any(|shortener| host_matches(&host, shortener)) {
            debug!("{} is a shortener that cannot be expanded offline", host);
        }

        Some(url.to_string())
    }

    fn apply_handler(
        &self,
        url: &str,
        parsed: &Url,
        handler: &RedirectHandler,
        depth: usize,
    ) -> Option<String> {
        if let Some(param) = handler.extract_param.as_deref() {
            let Some(value) = query_param(parsed, param) else {
                warn!("Redirect parameter '{}' missing from {}", param, url);
                return None;
            };
            let target = if handler.decode {
                match urlencoding::decode(&value) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(e) => {
                        warn!("Failed to decode redirect target '{}': {}", value, e);
                        return None;
                    }
                }
            } else {
                value.into_owned()
            };
            return self.follow(&target, depth);
        }

        if handler.follow_redirect {
            // following would need an HTTP request; keep the URL as it is
            debug!("Handler wants a live redirect, keeping {}", url);
            return Some(url.to_string());
        }

        warn!("Redirect handler for {} has nothing to apply", url);
        None
    }

    fn follow(&self, target: &str, depth: usize) -> Option<String> {
        if depth + 1 > self.max_depth {
            warn!("Redirect chain exceeds {} levels, giving up", self.max_depth);
            return None;
        }
        let Some(candidate) = absolute_target(target) else {
            warn!("Redirect target '{}' is not an absolute URL", target);
            return None;
        };
        debug!("Following redirect to {}", candidate);
        self.resolve_at_depth(&candidate, depth + 1)
    }
}

fn query_param<'u>(url: &'u Url, name: &str) -> Option<Cow<'u, str>> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
