use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::ErrorKind;
use super::{ProcessingResult, Sanitizer};

/// Default number of URLs sanitized concurrently in a batch.
pub const BATCH_CONCURRENCY: usize = 10;

/// Sanitizes many URLs on the blocking pool, in chunks of `concurrency`.
///
/// Returns one result per input, in input order. Each call is independent,
/// so the only shared state is the read-only rule set inside `sanitizer`.
pub async fn process_batch(
    sanitizer: Arc<Sanitizer>,
    urls: Vec<String>,
    concurrency: usize,
) -> Vec<ProcessingResult> {
    let concurrency = concurrency.max(1);
    info!("Processing {} URLs, {} at a time", urls.len(), concurrency);

    let mut results = Vec::with_capacity(urls.len());
    for chunk in urls.chunks(concurrency) {
        let tasks = chunk.iter().cloned().map(|url| {
            let sanitizer = Arc::clone(&sanitizer);
            async move {
                let task_url = url.clone();
                match tokio::task::spawn_blocking(move || sanitizer.process_url(&task_url)).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Sanitizer task for {} failed: {}", url, e);
                        ProcessingResult::failure(Some(url), ErrorKind::UnparseableUrl)
                    }
                }
            }
        });
        results.extend(join_all(tasks).await);
        debug!("Finished chunk, {} of {} done", results.len(), urls.len());
    }

    results
}

/// Aggregate figures over a batch of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_removed: usize,
    /// Distinct removed parameter names, in first-seen order.
    pub removed_trackers: Vec<String>,
}

impl BatchSummary {
    pub fn from_results(results: &[ProcessingResult]) -> Self {
        let mut summary = BatchSummary {
            processed: results.len(),
            ..Default::default()
        };

        for result in results {
            if !result.success {
                summary.failed += 1;
                continue;
            }
            summary.succeeded += 1;
            summary.total_removed += result.removed_param_count;
            for name in &result.removed_params {
                if !summary.removed_trackers.contains(name) {
                    summary.removed_trackers.push(name.clone());
                }
            }
        }

        summary
    }

    /// One-line summary, e.g. "3 trackers removed from 2 URLs".
    pub fn message(&self) -> String {
        let urls = plural(self.processed, "URL");
        if self.total_removed > 0 {
            format!("{} removed from {}", plural(self.total_removed, "tracker"), urls)
        } else {
            format!("{} processed - no trackers found", urls)
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
