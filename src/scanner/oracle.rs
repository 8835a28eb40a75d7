//! Decides whether a response carries the injected marker header

use crate::http::ProbeResponse;
use crate::models::Marker;
use reqwest::header::{HeaderMap, HeaderName};

/// Returns true when any value of the marker header contains the marker value.
///
/// `HeaderMap` stores names in canonical lowercase form, so the marker
/// name is matched case-insensitively.
pub fn is_vulnerable(headers: &HeaderMap, marker: &Marker) -> bool {
    let Ok(name) = HeaderName::from_bytes(marker.header.as_bytes()) else {
        return false;
    };
    let needle = marker.value.as_bytes();

    headers
        .get_all(&name)
        .iter()
        .any(|value| contains(value.as_bytes(), needle))
}

/// Convenience wrapper over [`is_vulnerable`] for a full response
pub fn response_is_vulnerable(response: &ProbeResponse, marker: &Marker) -> bool {
    is_vulnerable(&response.headers, marker)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
