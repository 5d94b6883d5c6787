//! Sanitization facade.
//!
//! [`Sanitizer`] is the single entry point for callers: it chains
//! extraction, redirect resolution and parameter filtering, and reports the
//! outcome of every call as a [`ProcessingResult`] instead of an error.

pub mod batch;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{ErrorKind, Result};
use crate::rules::{RuleSet, RuleSource};
use crate::url_parser::{
    count_params, extract_urls, removed_param_names, validate_url, ParameterFilter,
    RedirectResolver, MAX_REDIRECT_DEPTH, MAX_URL_LENGTH,
};

pub use batch::{process_batch, BatchSummary};

/// Engine limits that can be tuned from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// How many nested redirectors may be unwrapped.
    pub max_redirect_depth: usize,
    /// Longest URL accepted, in bytes.
    pub max_url_length: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_redirect_depth: MAX_REDIRECT_DEPTH,
            max_url_length: MAX_URL_LENGTH,
        }
    }
}

/// Outcome of sanitizing one URL or one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub original_url: Option<String>,
    pub sanitized_url: Option<String>,
    pub removed_param_count: usize,
    /// Failure kind, or a non-fatal diagnostic when `success` is true.
    pub error: Option<ErrorKind>,
    /// Names of the original URL's parameters missing from the sanitized
    /// one, in original order. This covers parameters lost to redirect
    /// resolution as well as those the filter dropped.
    pub removed_params: Vec<String>,
    /// How many candidates text extraction produced (1 for a plain URL).
    pub candidate_count: usize,
}

impl ProcessingResult {
    fn failure(original_url: Option<String>, error: ErrorKind) -> Self {
        Self {
            success: false,
            original_url,
            error: Some(error),
            ..Default::default()
        }
    }

    /// True when text extraction found more than one URL and only the first
    /// was processed.
    pub fn has_multiple_candidates(&self) -> bool {
        self.candidate_count > 1
    }

    /// The URL to hand to the user: sanitized when available, else the original.
    pub fn fallback_url(&self) -> Option<&str> {
        self.sanitized_url
            .as_deref()
            .or(self.original_url.as_deref())
    }

    /// Short human-readable status line.
    pub fn status_message(&self) -> String {
        match (self.success, self.removed_param_count) {
            (true, 0) => "URL is already clean".to_string(),
            (true, 1) => "Removed 1 tracking parameter".to_string(),
            (true, n) => format!("Removed {} tracking parameters", n),
            (false, _) => {
                let error = self.error.unwrap_or(ErrorKind::NoUrlFound);
                if self.original_url.is_some() {
                    format!("Warning: {}", error)
                } else {
                    format!("Error: {}", error)
                }
            }
        }
    }
}

/// Strips tracking parameters from URLs using a shared, immutable rule set.
///
/// Cloning is cheap; clones share the same [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Arc<RuleSet>,
    options: EngineOptions,
}

impl Sanitizer {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            options: EngineOptions::default(),
        }
    }

    /// Builds a sanitizer over the bundled rule set.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(RuleSet::bundled()?))
    }

    /// Loads a rule set and builds a sanitizer over it.
    pub fn from_source(source: RuleSource<'_>) -> Result<Self> {
        match source {
            RuleSource::Bundled => Self::bundled(),
            other => Ok(Self::new(Arc::new(RuleSet::load(other)?))),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Finds URL candidates in free text.
    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        extract_urls(text)
    }

    /// Resolves redirects in a URL and removes its tracking parameters.
    #[instrument(level = "debug", skip(self))]
    pub fn process_url(&self, url: &str) -> ProcessingResult {
        let url = url.trim();

        if let Err(kind) = validate_url(url, self.options.max_url_length) {
            warn!("Cannot sanitize '{}': {}", url, kind);
            return ProcessingResult::failure(Some(url.to_string()), kind);
        }

        let resolver = RedirectResolver::new(&self.rules)
            .with_max_depth(self.options.max_redirect_depth)
            .with_max_url_length(self.options.max_url_length);
        let (resolved, diagnostic) = match resolver.resolve(url) {
            Some(resolved) => {
                if resolved != url {
                    debug!("Resolved {} -> {}", url, resolved);
                }
                (resolved, None)
            }
            None => {
                warn!("Redirect in {} could not be resolved, filtering it as-is", url);
                (url.to_string(), Some(ErrorKind::RedirectUnresolvable))
            }
        };

        let outcome = ParameterFilter::new(&self.rules).filter_with_report(&resolved);
        let removed_param_count = count_params(url).saturating_sub(count_params(&outcome.url));
        let removed_params = removed_param_names(url, &outcome.url);

        info!("Sanitized URL, removed {} parameters", removed_param_count);
        ProcessingResult {
            success: true,
            original_url: Some(url.to_string()),
            sanitized_url: Some(outcome.url),
            removed_param_count,
            error: diagnostic,
            removed_params,
            candidate_count: 1,
        }
    }

    /// Extracts URLs from text and sanitizes the first one.
    ///
    /// The number of candidates found is reported in
    /// [`ProcessingResult::candidate_count`] so callers can ask the user
    /// instead of silently picking one.
    #[instrument(level = "debug", skip(self, text))]
    pub fn process_text(&self, text: &str) -> ProcessingResult {
        let candidates = extract_urls(text);
        let Some(first) = candidates.first() else {
            info!("No URLs found in text");
            return ProcessingResult::failure(None, ErrorKind::NoUrlFound);
        };

        if candidates.len() > 1 {
            info!("Text contains {} URLs, processing the first", candidates.len());
        }

        ProcessingResult {
            candidate_count: candidates.len(),
            ..self.process_url(first)
        }
    }

    /// Sanitizes every input in order, one result per input.
    pub fn process_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<ProcessingResult> {
        urls.iter().map(|url| self.process_url(url.as_ref())).collect()
    }
}
