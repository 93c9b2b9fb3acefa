use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};
use std::collections::HashMap;

/// Lowercased header names mapped to their values. Non-UTF-8 values are
/// decoded lossily so a bearer token is never silently dropped.
pub fn header_strings(header_map: &HeaderMap) -> HashMap<String, String> {
    let mut headers = HashMap::with_capacity(header_map.len());
    for (name, value) in header_map {
        headers
            .entry(name.as_str().to_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    headers
}

/// Copy stub response headers onto a hyper response, skipping any that
/// are not valid HTTP.
pub fn apply_headers(header_map: &mut HeaderMap<HeaderValue>, headers: &HashMap<String, String>) {
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                header_map.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "stub skipped unencodable response header"),
        }
    }
}
