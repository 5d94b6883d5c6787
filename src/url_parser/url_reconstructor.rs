use url::form_urlencoded;

/// A URL split around its query string, borrowing from the original text.
///
/// Everything outside the query (scheme, authority, path, fragment) is kept
/// byte-for-byte so rebuilding never re-encodes or normalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitUrl<'a> {
    pub base: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// One `name=value` segment of a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam<'a> {
    /// Decoded parameter name, used for rule matching.
    pub name: String,
    /// The segment exactly as it appeared in the URL.
    pub raw: &'a str,
}

impl<'a> SplitUrl<'a> {
    pub fn new(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        let (base, query) = match rest.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (rest, None),
        };
        SplitUrl { base, query, fragment }
    }

    /// Non-empty query segments in their original order.
    pub fn params(&self) -> Vec<QueryParam<'a>> {
        self.query
            .map(|query| {
                query
                    .split('&')
                    .filter(|segment| !segment.is_empty())
                    .map(|raw| QueryParam { name: decode_name(raw), raw })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reassembles the URL with the given raw query segments.
    pub fn rebuild<'s, I>(&self, segments: I) -> String
    where
        I: IntoIterator<Item = &'s str>,
    {
        let query = segments.into_iter().collect::<Vec<_>>().join("&");
        let mut url = String::with_capacity(self.base.len() + query.len() + 2);
        url.push_str(self.base);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        if let Some(fragment) = self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

/// Number of query parameters in a URL string.
///
/// Every non-empty segment counts, so a name repeated three times counts
/// three times.
pub fn count_params(url: &str) -> usize {
    SplitUrl::new(url).params().len()
}

/// Names of the parameters in `original` that `sanitized` no longer carries,
/// in original order.
///
/// Occurrences are matched one for one, so a repeated name is reported once
/// per dropped occurrence. When `sanitized` only holds a subset of the
/// original parameters the result has exactly
/// `count_params(original) - count_params(sanitized)` entries.
pub fn removed_param_names(original: &str, sanitized: &str) -> Vec<String> {
    let mut remaining: Vec<String> = SplitUrl::new(sanitized)
        .params()
        .into_iter()
        .map(|param| param.name)
        .collect();

    SplitUrl::new(original)
        .params()
        .into_iter()
        .filter_map(|param| match remaining.iter().position(|name| *name == param.name) {
            Some(index) => {
                remaining.remove(index);
                None
            }
            None => Some(param.name),
        })
        .collect()
}

fn decode_name(raw: &str) -> String {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}
