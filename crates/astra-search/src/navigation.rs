//! Address fragment codec (`#q=<percent-encoded query>`)

const QUERY_PREFIX: &str = "q=";

/// Fragment (without the leading `#`) that reopens `query`.
pub fn fragment_for_query(query: &str) -> String {
    format!("{}{}", QUERY_PREFIX, urlencoding::encode(query))
}

/// Query carried by a fragment, if any.
///
/// Malformed percent-encoding is logged and treated as "no query present".
pub fn query_from_fragment(fragment: &str) -> Option<String> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let encoded = fragment.strip_prefix(QUERY_PREFIX)?;

    match urlencoding::decode(encoded) {
        Ok(decoded) if !decoded.trim().is_empty() => Some(decoded.into_owned()),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(fragment = %fragment, error = %e, "Failed to decode query fragment");
            None
        }
    }
}
