use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

// URLs with an explicit http(s) scheme, taken verbatim up to the next whitespace
static PROTOCOL_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://\S+").unwrap()
});

// A whole whitespace-delimited token that reads as a bare domain with optional path
static DOMAIN_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:www\.)?[a-zA-Z0-9][a-zA-Z0-9.-]*\.[a-zA-Z]{2,}(?:/\S*)?$").unwrap()
});

static DOMAIN_VALIDATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*\.[a-zA-Z]{2,}.*$").unwrap()
});

/// Prefixes `https://` unless the candidate already carries an http(s) scheme.
pub fn with_default_scheme(candidate: &str) -> String {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        candidate.to_string()
    } else {
        format!("https://{}", candidate)
    }
}

/// Turns a value pulled out of a redirector into an absolute URL.
///
/// Explicit http(s) URLs are taken as they are and bare domains get
/// `https://`. Anything else (relative paths, search terms) is `None`.
pub fn absolute_target(target: &str) -> Option<String> {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        Some(target.to_string())
    } else if DOMAIN_TOKEN_REGEX.is_match(target) {
        Some(with_default_scheme(target))
    } else {
        None
    }
}

/// Finds URL candidates in free text.
///
/// Explicit `http(s)://` URLs come first, verbatim, followed by bare
/// domains (`www.example.com/page`) given an `https://` prefix. When neither
/// pass finds anything, a single domain-looking token is accepted as a last
/// resort. Duplicates are dropped, keeping the first occurrence.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |candidate: String| {
        if seen.insert(candidate.clone()) {
            urls.push(candidate);
        }
    };

    for found in PROTOCOL_URL_REGEX.find_iter(text) {
        trace!("Found URL with scheme: {}", found.as_str());
        push(found.as_str().to_string());
    }

    for token in text.split_whitespace() {
        if DOMAIN_TOKEN_REGEX.is_match(token) {
            trace!("Found bare domain: {}", token);
            push(with_default_scheme(token));
        }
    }

    if urls.is_empty() {
        if let Some(candidate) = fallback_candidate(text) {
            debug!("No URL matched, falling back to whole input: {}", candidate);
            urls.push(candidate);
        }
    }

    debug!("Extracted {} URL candidates", urls.len());
    urls
}

fn fallback_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.contains('.')
        && !trimmed.contains(char::is_whitespace)
        && DOMAIN_VALIDATION_REGEX.is_match(trimmed)
    {
        Some(with_default_scheme(trimmed))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_text() {
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("   \n\t ").is_empty());
    }

    #[test]
    fn test_explicit_scheme_is_verbatim() {
        let urls = extract_urls("see http://example.com/a?b=c and https://foo.org/x");
        assert_eq!(urls, vec!["http://example.com/a?b=c", "https://foo.org/x"]);
    }

    #[test]
    fn test_bare_domain_gets_https() {
        let urls = extract_urls("check this out www.example.com/page?utm_campaign=x thanks");
        assert_eq!(urls, vec!["https://www.example.com/page?utm_campaign=x"]);
    }

    #[test]
    fn test_scheme_matches_precede_bare_domains() {
        let urls = extract_urls("example.org then https://example.net/");
        assert_eq!(urls, vec!["https://example.net/", "https://example.org"]);
    }

    #[test]
    fn test_duplicates_removed() {
        let urls = extract_urls("example.com https://example.com example.com");
        assert_eq!(urls, vec!["https://example.com"]);
    }

    #[test]
    fn test_single_domain_input() {
        assert_eq!(extract_urls("example.com"), vec!["https://example.com"]);
        assert_eq!(extract_urls("  sub.example.co.uk  "), vec!["https://sub.example.co.uk"]);
    }

    #[test]
    fn test_fallback_for_query_without_path() {
        // no path, so the bare-domain pass rejects it and the fallback picks it up
        assert_eq!(
            extract_urls("example.com?utm_source=x"),
            vec!["https://example.com?utm_source=x"]
        );
    }

    #[test]
    fn test_plain_prose_has_no_candidates() {
        assert!(extract_urls("nothing to see here").is_empty());
        assert!(extract_urls("version 1.2 released").is_empty());
        assert!(extract_urls("end of sentence.").is_empty());
    }

    #[test]
    fn test_absolute_target() {
        assert_eq!(absolute_target(" https://a.org/x ").as_deref(), Some("https://a.org/x"));
        assert_eq!(absolute_target("example.org/landing").as_deref(), Some("https://example.org/landing"));
        assert_eq!(absolute_target("foo"), None);
        assert_eq!(absolute_target("/search?q=rust"), None);
        assert_eq!(absolute_target("javascript:alert(1)"), None);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "a.com b.org http://c.net/x a.com";
        assert_eq!(extract_urls(text), extract_urls(text));
    }
}
