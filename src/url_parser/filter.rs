use tracing::{debug, trace};
use url::Url;

use crate::rules::{DomainRule, RuleSet};
use super::url_reconstructor::SplitUrl;
use super::url_validator::extract_host;

/// Why a parameter was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Listed in the domain rule's `keep` list.
    KeptByDomain,
    /// Not matched by any rule.
    Kept,
    /// Listed in the domain rule's `remove` list.
    RemovedByDomain,
    /// Global tracking name or pattern.
    RemovedAsTracker,
}

impl Decision {
    pub fn is_kept(self) -> bool {
        matches!(self, Decision::KeptByDomain | Decision::Kept)
    }
}

/// Result of filtering one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub url: String,
    pub kept: usize,
    /// Decoded names of the dropped parameters, in original order.
    pub removed: Vec<String>,
}

/// Drops tracking parameters from an already redirect-resolved URL.
#[derive(Debug, Clone, Copy)]
pub struct ParameterFilter<'a> {
    rules: &'a RuleSet,
}

impl<'a> ParameterFilter<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Returns the URL with its tracking parameters removed.
    pub fn filter(&self, url: &str) -> String {
        self.filter_with_report(url).url
    }

    /// Filters a URL and reports which parameters went away.
    ///
    /// Kept segments are re-joined verbatim in their original order; the
    /// rest of the URL is not touched. A URL left with no parameters loses
    /// its `?` entirely.
    pub fn filter_with_report(&self, url: &str) -> FilterOutcome {
        let split = SplitUrl::new(url);
        let params = split.params();
        if params.is_empty() {
            trace!("No query parameters in {}", url);
            return FilterOutcome {
                url: split.rebuild(std::iter::empty::<&str>()),
                kept: 0,
                removed: Vec::new(),
            };
        }

        let host = Url::parse(url).ok().as_ref().and_then(extract_host);
        let domain_rule = host.as_deref().and_then(|host| self.rules.domain_rule(host));
        if let (Some(host), Some(_)) = (host.as_deref(), domain_rule) {
            debug!("Applying domain rule for {}", host);
        }

        let mut kept = Vec::with_capacity(params.len());
        let mut removed = Vec::new();
        for param in &params {
            let decision = self.decide(&param.name, domain_rule);
            trace!("Parameter '{}': {:?}", param.name, decision);
            if decision.is_kept() {
                kept.push(param.raw);
            } else {
                removed.push(param.name.clone());
            }
        }

        if !removed.is_empty() {
            debug!("Removed {} parameters: {:?}", removed.len(), removed);
        }

        FilterOutcome {
            url: split.rebuild(kept.iter().copied()),
            kept: kept.len(),
            removed,
        }
    }

    /// Decides a single parameter name. `keep` overrides everything; `remove`
    /// and the global tracking rules are both exclusionary.
    pub fn decide(&self, name: &str, domain_rule: Option<&DomainRule>) -> Decision {
        if let Some(rule) = domain_rule {
            if rule.keeps(name) {
                return Decision::KeptByDomain;
            }
            if rule.removes(name) {
                return Decision::RemovedByDomain;
            }
        }
        if self.rules.is_tracking(name) {
            Decision::RemovedAsTracker
        } else {
            Decision::Kept
        }
    }
}
