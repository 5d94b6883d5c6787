//! # linksan
//!
//! Strips tracking parameters from URLs and finds URLs in free text.
//!
//! The engine is rule driven: a JSON [`RuleSet`] lists tracking parameter
//! names, name patterns, per-domain keep/remove overrides and redirect
//! handlers. It is loaded once and shared read-only by every call.
//!
//! ```
//! use linksan::Sanitizer;
//!
//! let sanitizer = Sanitizer::bundled().unwrap();
//! let result = sanitizer.process_text("see www.example.com/page?utm_campaign=x");
//! assert_eq!(result.sanitized_url.as_deref(), Some("https://www.example.com/page"));
//! assert_eq!(result.removed_param_count, 1);
//! ```
//!
//! No network requests are made: redirectors are unwrapped only when the
//! destination is embedded in the URL itself.

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod url_parser;
pub mod utils;

pub use config::AppConfig;
pub use engine::{process_batch, BatchSummary, EngineOptions, ProcessingResult, Sanitizer};
pub use error::{ErrorKind, RuleLoadError};
pub use rules::{DomainRule, RedirectHandler, RuleSet, RuleSource};
pub use url_parser::extract_urls;
