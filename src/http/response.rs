//! Transport-independent view of a completed HTTP response

use reqwest::header::HeaderMap;

/// Status and header fields of a response; the body is never read.
///
/// Header names are stored in canonical (lowercase) form by `HeaderMap`,
/// so lookups are case-insensitive on both request paths.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HeaderMap,
}

impl ProbeResponse {
    pub fn new(status: u16, headers: HeaderMap) -> Self {
        Self { status, headers }
    }
}

impl From<&reqwest::Response> for ProbeResponse {
    fn from(response: &reqwest::Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
        }
    }
}
