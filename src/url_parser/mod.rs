//! URL handling: candidate extraction, redirect resolution and query filtering.

pub mod extractor;
pub mod filter;
pub mod resolver;
pub mod url_reconstructor;
pub mod url_validator;


pub use extractor::{absolute_target, extract_urls, with_default_scheme};
pub use filter::{Decision, FilterOutcome, ParameterFilter};
pub use resolver::{RedirectResolver, MAX_REDIRECT_DEPTH};
pub use url_reconstructor::{count_params, removed_param_names, QueryParam, SplitUrl};
pub use url_validator::{extract_host, validate_url, MAX_URL_LENGTH};
