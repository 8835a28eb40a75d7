//! Raw-socket request path.
//!
//! Candidates carrying literal CR/LF or escapes a URL parser would reject
//! or re-encode are sent byte-for-byte over a plain TCP or TLS stream, so
//! the payload reaches the server exactly as generated.

use crate::error::{CrlfError, Result};
use crate::http::headers::{parse_headers, RawHeader};
use crate::http::response::ProbeResponse;
use crate::http::{Sender, USER_AGENT};
use crate::models::ScanConfig;
use async_trait::async_trait;
use native_tls::TlsConnector;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound on the status line plus header section of a response
const MAX_HEAD_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// Connection target split out of a candidate URL by literal prefix matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTarget {
    pub scheme: Scheme,
    /// Host used for DNS and SNI (IPv6 brackets removed)
    pub host: String,
    /// Host as written in the URL, sent in the `Host` header
    pub host_header: String,
    pub port: u16,
    /// Everything from the first `/` after the authority, untouched
    pub path: String,
}

impl RawTarget {
    /// Splits `http(s)://host[:port]/path` without decoding anything.
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else {
            return Err(CrlfError::InvalidScheme);
        };

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, format!("/{path}")),
            None => (rest, "/".to_string()),
        };

        let (host, host_header, port_str) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (inner, after) = bracketed
                .split_once(']')
                .ok_or(CrlfError::MissingHost)?;
            let port = match after.strip_prefix(':') {
                Some(p) => Some(p),
                None if after.is_empty() => None,
                None => return Err(CrlfError::InvalidPort(after.to_string())),
            };
            (inner, &authority[..inner.len() + 2], port)
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, host, Some(port)),
                None => (authority, authority, None),
            }
        };

        if host.is_empty() {
            return Err(CrlfError::MissingHost);
        }

        let port = match port_str {
            None | Some("") => scheme.default_port(),
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| CrlfError::InvalidPort(p.to_string()))?,
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            host_header: host_header.to_string(),
            port,
            path,
        })
    }
}

/// Serializes a request by plain concatenation.
///
/// CRLF terminates each framing line; CR/LF already inside `method`,
/// `path`, headers or `body` are written as-is.
pub fn build_raw_request(
    method: &str,
    path: &str,
    host: &str,
    headers: &[RawHeader],
    body: &str,
) -> Vec<u8> {
    let mut request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {host}\r\nUser-Agent: {USER_AGENT}\r\nAccept: */*\r\n"
    );

    for header in headers {
        request.push_str(&format!("{}:{}\r\n", header.name, header.value));
    }

    if !body.is_empty() {
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
        request.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
    }

    request.push_str("Connection: close\r\n\r\n");
    request.push_str(body);
    request.into_bytes()
}

/// Reads one line (including its terminator) without exceeding `budget`
async fn read_head_line<R>(reader: &mut R, line: &mut Vec<u8>, budget: &mut u64) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    let n = (&mut *reader).take(*budget).read_until(b'\n', line).await?;
    *budget -= n as u64;
    if *budget == 0 && !line.ends_with(b"\n") {
        return Err(CrlfError::MalformedResponse(
            "response header section too large".to_string(),
        ));
    }
    Ok(n)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| *b != b' ' && *b != b'\t')
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| *b != b' ' && *b != b'\t')
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn parse_status_line(line: &[u8]) -> Result<u16> {
    let text = std::str::from_utf8(line)
        .map_err(|_| CrlfError::MalformedResponse("status line is not UTF-8".to_string()))?;
    let mut parts = text.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();

    if !version.starts_with("HTTP/") {
        return Err(CrlfError::MalformedResponse(format!(
            "malformed status line {text:?}"
        )));
    }
    if code.len() != 3 {
        return Err(CrlfError::MalformedResponse(format!(
            "malformed status code {code:?}"
        )));
    }
    code.parse::<u16>()
        .map_err(|_| CrlfError::MalformedResponse(format!("malformed status code {code:?}")))
}

/// Parses a status line and header section from a buffered stream.
///
/// Stops at the blank line ending the header section; the body is left
/// unread. Folded (obs-fold) header lines are joined onto the previous
/// field with a single space.
pub async fn read_response_head<R>(reader: &mut R) -> Result<ProbeResponse>
where
    R: AsyncBufRead + Unpin,
{
    let mut budget = MAX_HEAD_BYTES;
    let mut line = Vec::new();

    if read_head_line(reader, &mut line, &mut budget).await? == 0 {
        return Err(CrlfError::MalformedResponse("empty response".to_string()));
    }
    let status = parse_status_line(trim_line_end(&line))?;

    let mut fields: Vec<(HeaderName, Vec<u8>)> = Vec::new();
    loop {
        if read_head_line(reader, &mut line, &mut budget).await? == 0 {
            return Err(CrlfError::MalformedResponse(
                "unexpected end of header section".to_string(),
            ));
        }
        let content = trim_line_end(&line);
        if content.is_empty() {
            break;
        }

        if content[0] == b' ' || content[0] == b'\t' {
            let (_, value) = fields.last_mut().ok_or_else(|| {
                CrlfError::MalformedResponse("continuation line before first header".to_string())
            })?;
            value.push(b' ');
            value.extend_from_slice(trim_ows(content));
            continue;
        }

        let colon = content.iter().position(|b| *b == b':').ok_or_else(|| {
            CrlfError::MalformedResponse(format!(
                "malformed header line {:?}",
                String::from_utf8_lossy(content)
            ))
        })?;
        let name = HeaderName::from_bytes(&content[..colon]).map_err(|_| {
            CrlfError::MalformedResponse(format!(
                "invalid header name {:?}",
                String::from_utf8_lossy(&content[..colon])
            ))
        })?;
        fields.push((name, trim_ows(&content[colon + 1..]).to_vec()));
    }

    let mut headers = HeaderMap::with_capacity(fields.len());
    for (name, value) in fields {
        let value = HeaderValue::from_bytes(&value).map_err(|_| {
            CrlfError::MalformedResponse(format!("invalid value for header {name}"))
        })?;
        headers.append(name, value);
    }

    Ok(ProbeResponse::new(status, headers))
}

/// Sender that writes hand-built requests to a TCP or TLS stream
pub struct RawClient {
    method: String,
    body: String,
    headers: Vec<RawHeader>,
    timeout: Duration,
    connector: tokio_native_tls::TlsConnector,
}

impl RawClient {
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        // Targets are scanned without trusted certificates
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;

        Ok(Self {
            method: config.method.clone(),
            body: config.data.clone(),
            headers: parse_headers(&config.headers),
            timeout: Duration::from_secs(config.timeout_secs),
            connector: tokio_native_tls::TlsConnector::from(connector),
        })
    }

    /// Request bytes this client would write for `target`
    pub fn request_bytes(&self, target: &RawTarget) -> Vec<u8> {
        build_raw_request(
            &self.method,
            &target.path,
            &target.host_header,
            &self.headers,
            &self.body,
        )
    }

    /// Writes the request in one call and reads back the response head.
    ///
    /// The stream is consumed, so it is closed whichever way this returns.
    async fn exchange<S>(&self, stream: S, request: &[u8]) -> Result<ProbeResponse>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let exchange = async move {
            let mut stream = stream;
            stream.write_all(request).await?;
            stream.flush().await?;
            let mut reader = BufReader::new(stream);
            read_response_head(&mut reader).await
        };

        timeout(self.timeout, exchange)
            .await
            .map_err(|_| CrlfError::Timeout("request", self.timeout.as_secs()))?
    }
}

#[async_trait]
impl Sender for RawClient {
    async fn send(&self, url: &str) -> Result<ProbeResponse> {
        let target = RawTarget::parse(url)?;
        let request = self.request_bytes(&target);
        let addr = (target.host.as_str(), target.port);
        debug!("Raw request to {}:{} ({} bytes)", target.host, target.port, request.len());

        match target.scheme {
            Scheme::Http => {
                let stream = timeout(self.timeout, TcpStream::connect(addr))
                    .await
                    .map_err(|_| CrlfError::Timeout("connect", self.timeout.as_secs()))??;
                self.exchange(stream, &request).await
            }
            Scheme::Https => {
                let connect = async {
                    let tcp = TcpStream::connect(addr).await?;
                    Ok::<_, CrlfError>(self.connector.connect(&target.host, tcp).await?)
                };
                let stream = timeout(self.timeout, connect)
                    .await
                    .map_err(|_| CrlfError::Timeout("connect", self.timeout.as_secs()))??;
                self.exchange(stream, &request).await
            }
        }
    }
}
