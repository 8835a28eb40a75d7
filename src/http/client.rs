//! Standard HTTP client path for well-formed candidate URLs

use crate::error::{CrlfError, Result};
use crate::http::headers::{parse_headers, to_header_map};
use crate::http::response::ProbeResponse;
use crate::http::{Sender, USER_AGENT};
use crate::models::ScanConfig;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

/// reqwest-backed sender with certificate checks disabled
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    method: String,
    body: String,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| CrlfError::ConfigError(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            method: config.method.clone(),
            body: config.data.clone(),
            headers: to_header_map(&parse_headers(&config.headers)),
        })
    }
}

#[async_trait]
impl Sender for HttpClient {
    async fn send(&self, url: &str) -> Result<ProbeResponse> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| CrlfError::InvalidMethod(self.method.clone()))?;

        let mut req = self
            .client
            .request(method, url)
            .headers(self.headers.clone());
        if !self.body.is_empty() {
            req = req.body(self.body.clone());
        }

        let response = req.send().await?;
        debug!("Response: {} for {}", response.status(), response.url());

        // The body is dropped unread, which releases the connection
        Ok(ProbeResponse::from(&response))
    }
}
