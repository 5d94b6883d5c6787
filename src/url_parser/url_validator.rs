use tracing::{debug, error};
use url::Url;

use crate::error::ErrorKind;

/// Default maximum accepted URL length, in bytes.
pub const MAX_URL_LENGTH: usize = 8192;

/// Parses a URL and checks it can be decomposed into scheme, host and query.
///
/// Inputs without a host (`mailto:`, relative paths, bare words) are
/// rejected rather than passed through.
pub fn validate_url(url: &str, max_length: usize) -> Result<Url, ErrorKind> {
    let url = url.trim();
    if url.is_empty() {
        debug!("Received empty URL");
        return Err(ErrorKind::UnparseableUrl);
    }

    if url.len() > max_length {
        error!("URL exceeds maximum length: {} > {}", url.len(), max_length);
        return Err(ErrorKind::UnparseableUrl);
    }

    let parsed = Url::parse(url).map_err(|e| {
        debug!("Failed to parse URL '{}': {}", url, e);
        ErrorKind::UnparseableUrl
    })?;

    match extract_host(&parsed) {
        Some(_) => Ok(parsed),
        None => {
            debug!("URL has no host component: {}", url);
            Err(ErrorKind::UnparseableUrl)
        }
    }
}

/// Lower-cased host of a parsed URL, if it has a non-empty one.
pub fn extract_host(parsed: &Url) -> Option<String> {
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_ascii_lowercase())
}
