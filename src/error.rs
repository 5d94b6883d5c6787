//! Error types for the `linksan` crate.

use serde::Serialize;

/// Failure to build a [`RuleSet`](crate::rules::RuleSet) from a rule document.
///
/// Loading is all-or-nothing: any of these aborts construction and no
/// partially populated rule set is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    /// The rule file could not be read.
    #[error("Failed to read rules from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not have the expected shape.
    #[error("Malformed rule document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required top-level section is absent.
    #[error("Rule document is missing the required `{0}` section")]
    MissingSection(&'static str),

    /// A pattern entry is not a valid regular expression.
    #[error("Invalid tracking pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Per-call failure kinds reported inside a
/// [`ProcessingResult`](crate::engine::ProcessingResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input has no scheme or host, or is otherwise not a URL.
    #[error("Could not parse URL")]
    UnparseableUrl,

    /// Free text contained no URL candidates.
    #[error("No URLs found in text")]
    NoUrlFound,

    /// A redirector could not be unwrapped; the original URL was filtered instead.
    #[error("Redirect target could not be resolved")]
    RedirectUnresolvable,
}

/// A type alias for `Result<T, RuleLoadError>`.
pub type Result<T> = std::result::Result<T, RuleLoadError>;
