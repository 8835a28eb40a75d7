//! Request senders for candidate URLs.
//!
//! Two strategies share one [`Sender`] interface: a conformant reqwest
//! client for ordinary URLs and a raw-socket client for URLs whose
//! payload a conformant client would reject or normalize away.
//! [`route`] decides per candidate which one is used.

pub mod client;
pub mod headers;
pub mod raw;
pub mod response;

pub use client::HttpClient;
pub use raw::RawClient;
pub use response::ProbeResponse;

use crate::error::Result;
use crate::models::ScanConfig;
use async_trait::async_trait;
use url::Url;

/// User-Agent sent by both strategies
pub const USER_AGENT: &str = concat!("crlfscan/", env!("CARGO_PKG_VERSION"));

/// Substrings that force the raw-socket path.
///
/// `%oa` is matched literally with a lowercase letter o, not the digit.
const RAW_ONLY_MARKERS: &[&str] = &["\r", "\n", "%oa", "%u0"];

/// Issues one request for one candidate URL
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, url: &str) -> Result<ProbeResponse>;
}

/// Which strategy a candidate is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Standard,
    Raw,
}

/// True for C0 control bytes and DEL.
///
/// `Url::parse` strips tabs and percent-encodes the other controls
/// instead of rejecting them, so they are checked before parsing.
fn has_control_byte(candidate: &str) -> bool {
    candidate.bytes().any(|b| b < 0x20 || b == 0x7f)
}

/// Picks the strategy for a candidate URL
pub fn route(candidate: &str) -> Route {
    if has_control_byte(candidate)
        || RAW_ONLY_MARKERS.iter().any(|m| candidate.contains(m))
        || Url::parse(candidate).is_err()
    {
        Route::Raw
    } else {
        Route::Standard
    }
}

/// Sender that routes each candidate to the standard or raw strategy
pub struct RequestSender {
    standard: HttpClient,
    raw: RawClient,
}

impl RequestSender {
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            standard: HttpClient::from_config(config)?,
            raw: RawClient::from_config(config)?,
        })
    }
}

#[async_trait]
impl Sender for RequestSender {
    async fn send(&self, url: &str) -> Result<ProbeResponse> {
        match route(url) {
            Route::Standard => self.standard.send(url).await,
            Route::Raw => self.raw.send(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_characters_route_raw() {
        assert_eq!(route("http://a.test/\r\nX-Injected: 1"), Route::Raw);
        assert_eq!(route("http://a.test/\nX-Injected: 1"), Route::Raw);
        assert_eq!(route("http://a.test/\rX-Injected: 1"), Route::Raw);
        assert_eq!(route("http://a.test/x\ty%0d%0aX-Injected:crlfscan"), Route::Raw);
        assert_eq!(route("http://a.test/\x00X-Injected:1"), Route::Raw);
        assert_eq!(route("http://a.test/\x0bX-Injected:1"), Route::Raw);
        assert_eq!(route("http://a.test/\x7fX-Injected:1"), Route::Raw);
    }

    #[test]
    fn test_escape_markers_route_raw() {
        assert_eq!(route("http://a.test/%u000aX-Injected:1"), Route::Raw);
        assert_eq!(route("http://a.test/%oaX-Injected:1"), Route::Raw);
    }

    #[test]
    fn test_oa_marker_is_case_and_shape_sensitive() {
        assert_eq!(route("http://a.test/%0aX-Injected:1"), Route::Standard);
        assert_eq!(route("http://a.test/%0AX-Injected:1"), Route::Standard);
        assert_eq!(route("http://a.test/%OaX-Injected:1"), Route::Standard);
    }

    #[test]
    fn test_unparsable_routes_raw() {
        assert_eq!(route("ftp//missing-colon"), Route::Raw);
        assert_eq!(route("http://[bad/"), Route::Raw);
    }

    #[test]
    fn test_plain_urls_route_standard() {
        assert_eq!(route("http://safe.test/"), Route::Standard);
        assert_eq!(route("https://safe.test/?q=%0d%0a"), Route::Standard);
        assert_eq!(route("ftp://host/path"), Route::Standard);
    }
}
