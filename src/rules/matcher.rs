use std::collections::HashMap;

/// Returns true when `host` is `key` itself or a subdomain of it.
///
/// Both sides are expected to be lower-case already. Matching is on whole
/// labels, so `notexample.com` does not match the key `example.com`.
pub fn host_matches(host: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    match host.strip_suffix(key) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// Finds the entry configured for `host`.
///
/// An exact key wins; otherwise the longest key `host` is a subdomain of,
/// which keeps the result independent of map iteration order.
pub fn lookup_host<'a, T>(map: &'a HashMap<String, T>, host: &str) -> Option<(&'a str, &'a T)> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    if let Some((key, value)) = map.get_key_value(host.as_str()) {
        return Some((key.as_str(), value));
    }

    map.iter()
        .filter(|(key, _)| host_matches(&host, key))
        .max_by_key(|(key, _)| key.len())
        .map(|(key, value)| (key.as_str(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matches_labels() {
        assert!(host_matches("example.com", "example.com"));
        assert!(host_matches("www.example.com", "example.com"));
        assert!(host_matches("a.b.example.com", "example.com"));
        assert!(!host_matches("notexample.com", "example.com"));
        assert!(!host_matches("example.com.evil.tld", "example.com"));
        assert!(!host_matches("example.com", ""));
    }

    #[test]
    fn test_lookup_prefers_exact_then_longest() {
        let mut map = HashMap::new();
        map.insert("google.com".to_string(), 1);
        map.insert("mail.google.com".to_string(), 2);

        assert_eq!(lookup_host(&map, "google.com"), Some(("google.com", &1)));
        assert_eq!(lookup_host(&map, "www.google.com"), Some(("google.com", &1)));
        assert_eq!(lookup_host(&map, "inbox.mail.google.com"), Some(("mail.google.com", &2)));
        assert_eq!(lookup_host(&map, "MAIL.Google.com"), Some(("mail.google.com", &2)));
        assert_eq!(lookup_host(&map, "google.co.uk"), None);
    }
}
