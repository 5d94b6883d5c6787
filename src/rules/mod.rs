//! Rule store: the immutable tracking-parameter rule set.
//!
//! A [`RuleSet`] is built once from a JSON rule document and then shared
//! read-only (behind an `Arc`) by every sanitization call. Regular
//! expressions are compiled at load time and domain keys are lower-cased, so
//! lookups never allocate regexes or normalize keys on the hot path.

pub mod matcher;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, RuleLoadError};
use self::matcher::lookup_host;

/// Rule document bundled with the crate.
pub const BUNDLED_RULES: &str = include_str!("../../assets/rules.json");

/// Category name reported for parameters caught by a pattern rather than by name.
pub const PATTERN_CATEGORY: &str = "pattern";

static BUNDLED: OnceCell<Arc<RuleSet>> = OnceCell::new();

/// Where to load a rule document from.
#[derive(Debug, Clone, Copy)]
pub enum RuleSource<'a> {
    /// The document compiled into the crate.
    Bundled,
    /// A JSON document held in memory.
    Json(&'a str),
    /// A JSON file on disk.
    Path(&'a Path),
}

// Wire shape of the rule document. Required sections are `Option` so a
// missing one can be reported by name instead of as a generic serde error.
#[derive(Debug, Deserialize)]
struct RuleDocument {
    trackers: Option<BTreeMap<String, Vec<String>>>,
    patterns: Option<Vec<String>>,
    domain_specific: Option<BTreeMap<String, DomainRuleEntry>>,
    #[serde(default)]
    redirect_handlers: BTreeMap<String, RedirectHandlerEntry>,
}

#[derive(Debug, Deserialize)]
struct DomainRuleEntry {
    #[serde(default)]
    keep: Vec<String>,
    #[serde(default)]
    remove: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RedirectHandlerEntry {
    extract_param: Option<String>,
    #[serde(default)]
    decode: bool,
    #[serde(default)]
    follow_redirect: bool,
}

/// Per-domain keep/remove overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainRule {
    keep: HashSet<String>,
    remove: HashSet<String>,
}

impl DomainRule {
    pub fn new<I, J, S, T>(keep: I, remove: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            keep: keep.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
            remove: remove.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
        }
    }

    /// Whether the parameter is explicitly kept (case-insensitive).
    pub fn keeps(&self, param: &str) -> bool {
        self.keep.contains(&param.to_lowercase())
    }

    /// Whether the parameter is explicitly removed (case-insensitive).
    pub fn removes(&self, param: &str) -> bool {
        self.remove.contains(&param.to_lowercase())
    }
}

/// How to recover the destination URL from a redirector's own query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectHandler {
    pub extract_param: Option<String>,
    pub decode: bool,
    pub follow_redirect: bool,
}

/// Immutable, indexed rule set.
#[derive(Debug)]
pub struct RuleSet {
    // lower-cased parameter name -> category it was declared in
    tracking_params: HashMap<String, String>,
    patterns: Vec<Regex>,
    domain_rules: HashMap<String, DomainRule>,
    redirect_handlers: HashMap<String, RedirectHandler>,
}

impl RuleSet {
    /// Loads and indexes a rule document.
    pub fn load(source: RuleSource<'_>) -> Result<Self> {
        match source {
            RuleSource::Bundled => Self::from_json_str(BUNDLED_RULES),
            RuleSource::Json(json) => Self::from_json_str(json),
            RuleSource::Path(path) => Self::from_path(path),
        }
    }

    /// Reads and loads a rule document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading rules from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Parses and indexes a rule document held in memory.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: RuleDocument = serde_json::from_str(json)?;

        let trackers = document.trackers.ok_or(RuleLoadError::MissingSection("trackers"))?;
        let patterns = document.patterns.ok_or(RuleLoadError::MissingSection("patterns"))?;
        let domains = document
            .domain_specific
            .ok_or(RuleLoadError::MissingSection("domain_specific"))?;

        let mut tracking_params = HashMap::new();
        for (category, names) in trackers {
            for name in names {
                let name = name.to_lowercase();
                if let Some(previous) = tracking_params.get(&name) {
                    debug!("Tracker '{}' listed under both '{}' and '{}'", name, previous, category);
                    continue;
                }
                tracking_params.insert(name, category.clone());
            }
        }

        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&format!("(?i)^(?:{})$", pattern))
                    .map_err(|source| RuleLoadError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>>>()?;

        let domain_rules: HashMap<String, DomainRule> = domains
            .into_iter()
            .map(|(domain, entry)| {
                let rule = DomainRule::new(&entry.keep, &entry.remove);
                let conflicts: Vec<&String> = rule.keep.intersection(&rule.remove).collect();
                if !conflicts.is_empty() {
                    warn!("Domain '{}' both keeps and removes {:?}; keep wins", domain, conflicts);
                }
                (domain.to_lowercase(), rule)
            })
            .collect();

        let redirect_handlers: HashMap<String, RedirectHandler> = document
            .redirect_handlers
            .into_iter()
            .map(|(domain, entry)| {
                let handler = RedirectHandler {
                    extract_param: entry.extract_param,
                    decode: entry.decode,
                    follow_redirect: entry.follow_redirect,
                };
                (domain.to_lowercase(), handler)
            })
            .collect();

        info!(
            "Loaded rules: {} tracking params, {} patterns, {} domain rules, {} redirect handlers",
            tracking_params.len(),
            patterns.len(),
            domain_rules.len(),
            redirect_handlers.len()
        );

        Ok(RuleSet {
            tracking_params,
            patterns,
            domain_rules,
            redirect_handlers,
        })
    }

    /// The bundled rule set, loaded on first use and shared afterwards.
    pub fn bundled() -> Result<Arc<RuleSet>> {
        BUNDLED
            .get_or_try_init(|| Self::load(RuleSource::Bundled).map(Arc::new))
            .map(Arc::clone)
    }

    /// Whether a parameter name is global tracking noise, by name or by pattern.
    pub fn is_tracking(&self, param: &str) -> bool {
        self.tracking_params.contains_key(&param.to_lowercase()) || self.matches_pattern(param)
    }

    /// Whether a parameter name fully matches any configured pattern.
    pub fn matches_pattern(&self, param: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(param))
    }

    /// The category a tracking parameter was declared in, or
    /// [`PATTERN_CATEGORY`] when only a pattern catches it.
    pub fn category_of(&self, param: &str) -> Option<&str> {
        match self.tracking_params.get(&param.to_lowercase()) {
            Some(category) => Some(category.as_str()),
            None if self.matches_pattern(param) => Some(PATTERN_CATEGORY),
            None => None,
        }
    }

    /// The domain rule configured for a host, if any.
    pub fn domain_rule(&self, host: &str) -> Option<&DomainRule> {
        lookup_host(&self.domain_rules, host).map(|(_, rule)| rule)
    }

    /// The redirect handler configured for a host, if any.
    pub fn redirect_handler(&self, host: &str) -> Option<&RedirectHandler> {
        lookup_host(&self.redirect_handlers, host).map(|(_, handler)| handler)
    }

    pub fn tracking_param_count(&self) -> usize {
        self.tracking_params.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
