//! Document addresses
//!
//! Storage keys for pages and resource comparison for image sources.

use url::Url;

/// Key annotations for a page are stored under
///
/// The query string is dropped, the fragment is kept. Strings that do not
/// parse as absolute URLs are cut at `?` textually.
pub fn storage_key(address: &str) -> String {
    match Url::parse(address) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => {
            let (before_fragment, fragment) = match address.split_once('#') {
                Some((head, frag)) => (head, Some(frag)),
                None => (address, None),
            };
            let base = before_fragment.split('?').next().unwrap_or_default();
            match fragment {
                Some(frag) => format!("{base}#{frag}"),
                None => base.to_string(),
            }
        }
    }
}

/// Resolve `reference` against `base`
pub fn absolutize(reference: &str, base: &str) -> Option<Url> {
    match Url::parse(reference) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base).ok()?.join(reference).ok(),
        Err(_) => None,
    }
}

/// Same origin and path, ignoring query and fragment
///
/// Both sides are resolved against `base` first. When either side fails to
/// resolve the raw strings are compared.
pub fn same_resource(a: &str, b: &str, base: &str) -> bool {
    match (absolutize(a, base), absolutize(b, base)) {
        (Some(ua), Some(ub)) => {
            ua.scheme() == ub.scheme()
                && ua.host_str() == ub.host_str()
                && ua.port_or_known_default() == ub.port_or_known_default()
                && ua.path() == ub.path()
        }
        _ => a == b,
    }
}
