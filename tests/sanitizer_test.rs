#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use anyhow::Result;
    use linksan::url_parser::count_params;
    use linksan::{
        extract_urls, process_batch, BatchSummary, ErrorKind, RuleLoadError, RuleSet, RuleSource,
        Sanitizer,
    };

    // "ref" and "id" are global trackers here so the domain rule has something to override
    const PRECEDENCE_RULES: &str = r#"{
        "trackers": {
            "utm": ["utm_source", "utm_medium", "utm_campaign"],
            "generic": ["ref", "id"]
        },
        "patterns": ["mc_.*"],
        "domain_specific": {
            "example.com": { "keep": ["id"], "remove": ["ref"] }
        }
    }"#;

    fn precedence_sanitizer() -> Sanitizer {
        Sanitizer::from_source(RuleSource::Json(PRECEDENCE_RULES)).expect("rules load")
    }

    #[test]
    fn test_domain_rule_precedence() {
        let result = precedence_sanitizer().process_url("https://example.com/?id=1&ref=2&utm_source=3");
        assert!(result.success);
        assert_eq!(result.sanitized_url.as_deref(), Some("https://example.com/?id=1"));
        assert_eq!(result.removed_param_count, 2);
    }

    #[test]
    fn test_redirect_expansion() -> Result<()> {
        let sanitizer = Sanitizer::bundled()?;
        let result = sanitizer.process_url("https://youtu.be/abc123");
        assert_eq!(
            result.sanitized_url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(result.removed_param_count, 0);
        Ok(())
    }

    #[test]
    fn test_generic_tracking_removal() -> Result<()> {
        let sanitizer = Sanitizer::bundled()?;
        let result = sanitizer.process_url("https://shop.example/item?utm_source=x&utm_medium=y&id=42");
        assert_eq!(result.sanitized_url.as_deref(), Some("https://shop.example/item?id=42"));
        assert_eq!(result.removed_param_count, 2);
        Ok(())
    }

    #[test]
    fn test_free_text_extraction() -> Result<()> {
        let text = "check this out www.example.com/page?utm_campaign=x thanks";
        assert_eq!(extract_urls(text), vec!["https://www.example.com/page?utm_campaign=x"]);

        let result = Sanitizer::bundled()?.process_text(text);
        assert!(result.success);
        assert_eq!(result.candidate_count, 1);
        assert_eq!(result.sanitized_url.as_deref(), Some("https://www.example.com/page"));
        assert_eq!(result.removed_param_count, 1);
        Ok(())
    }

    #[test]
    fn test_clean_url_is_noop() -> Result<()> {
        let sanitizer = Sanitizer::bundled()?;
        for url in ["https://example.org", "https://example.org/a/b", "http://example.org/#frag"] {
            let result = sanitizer.process_url(url);
            assert_eq!(result.sanitized_url.as_deref(), Some(url));
            assert_eq!(result.removed_param_count, 0);
        }
        Ok(())
    }

    #[test]
    fn test_idempotence_and_count_law() -> Result<()> {
        let sanitizer = Sanitizer::bundled()?;
        let urls = [
            "https://www.youtube.com/watch?v=1&si=2&feature=3",
            "https://news.example/a?fbclid=1&page=2&gclid=3#c",
            "https://www.amazon.com/dp/B0?tag=x&k=shoes&pd_rd_w=1",
            "https://youtu.be/xyz?t=10",
            "https://a.example/?keep=1",
        ];
        for url in urls {
            let first = sanitizer.process_url(url);
            let sanitized = first.sanitized_url.clone().expect("sanitized");
            let second = sanitizer.process_url(&sanitized);

            assert_eq!(second.sanitized_url.as_deref(), Some(sanitized.as_str()), "{}", url);
            assert_eq!(second.removed_param_count, 0, "{}", url);
            assert_eq!(
                first.removed_param_count,
                count_params(url).saturating_sub(count_params(&sanitized)),
                "{}",
                url
            );
        }
        Ok(())
    }

    #[test]
    fn test_per_call_errors_are_captured() -> Result<()> {
        let sanitizer = Sanitizer::bundled()?;

        let result = sanitizer.process_text("   ");
        assert_eq!(result.error, Some(ErrorKind::NoUrlFound));

        let result = sanitizer.process_url("mailto:someone@example.com");
        assert_eq!(result.error, Some(ErrorKind::UnparseableUrl));
        assert_eq!(result.fallback_url(), Some("mailto:someone@example.com"));

        let result = sanitizer.process_url("https://l.facebook.com/l.php?utm_source=x");
        assert!(result.success);
        assert_eq!(result.error, Some(ErrorKind::RedirectUnresolvable));
        assert_eq!(result.sanitized_url.as_deref(), Some("https://l.facebook.com/l.php"));
        Ok(())
    }

    #[test]
    fn test_rules_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(PRECEDENCE_RULES.as_bytes())?;

        let sanitizer = Sanitizer::from_source(RuleSource::Path(file.path()))?;
        let result = sanitizer.process_url("https://a.example/?mc_eid=1&q=2");
        assert_eq!(result.sanitized_url.as_deref(), Some("https://a.example/?q=2"));
        Ok(())
    }

    #[test]
    fn test_rule_load_failures_are_fatal() {
        let err = RuleSet::load(RuleSource::Json(r#"{"trackers": {}}"#)).unwrap_err();
        assert!(matches!(err, RuleLoadError::MissingSection("patterns")));
        assert!(Sanitizer::from_source(RuleSource::Json("[]")).is_err());
    }

    #[tokio::test]
    async fn test_batch_over_extracted_text() -> Result<()> {
        let sanitizer = Arc::new(Sanitizer::bundled()?);
        let text = "https://a.example/?utm_source=1 b.example/x?fbclid=2&y=3 https://c.example/";
        let urls = sanitizer.extract_urls(text);
        let results = process_batch(Arc::clone(&sanitizer), urls, 2).await;

        let sanitized: Vec<&str> = results
            .iter()
            .filter_map(|r| r.sanitized_url.as_deref())
            .collect();
        assert_eq!(
            sanitized,
            vec!["https://a.example/", "https://c.example/", "https://b.example/x?y=3"]
        );

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total_removed, 2);
        assert_eq!(summary.removed_trackers, vec!["utm_source", "fbclid"]);
        assert_eq!(summary.message(), "2 trackers removed from 3 URLs");
        Ok(())
    }

    #[test]
    fn test_concurrent_calls_share_rules() -> Result<()> {
        let sanitizer = Arc::new(Sanitizer::bundled()?);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sanitizer = Arc::clone(&sanitizer);
                std::thread::spawn(move || {
                    sanitizer.process_url(&format!("https://t{}.example/?gclid=x&n={}", i, i))
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.join().expect("thread panicked");
            assert_eq!(
                result.sanitized_url,
                Some(format!("https://t{}.example/?n={}", i, i))
            );
        }
        Ok(())
    }
}
