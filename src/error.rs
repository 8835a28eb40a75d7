//! Error types for crlfscan

use thiserror::Error;

/// Main error type for crlfscan operations
#[derive(Debug, Error)]
pub enum CrlfError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid URL scheme")]
    InvalidScheme,

    #[error("missing host")]
    MissingHost,

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("{0} timed out after {1} seconds")]
    Timeout(&'static str, u64),

    #[error("malformed HTTP response: {0}")]
    MalformedResponse(String),

    #[error("failed to write result: {0}")]
    SinkWrite(#[source] std::io::Error),

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification of a [`CrlfError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The candidate could not be split into scheme, host and path
    UrlSyntax,
    /// Dial, TLS, write, read or timeout failures
    Network,
    /// The server answered with something that is not an HTTP response
    ProtocolParse,
    /// Appending to the results file failed
    SinkWrite,
    /// Invalid configuration file or CLI value
    Config,
}

impl CrlfError {
    /// Returns the kind of failure this error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrlfError::UrlError(_)
            | CrlfError::InvalidScheme
            | CrlfError::MissingHost
            | CrlfError::InvalidPort(_) => {
                ErrorKind::UrlSyntax
            }
            CrlfError::HttpError(e) if e.is_builder() => ErrorKind::UrlSyntax,
            CrlfError::HttpError(_)
            | CrlfError::TlsError(_)
            | CrlfError::IoError(_)
            | CrlfError::Timeout(..) => ErrorKind::Network,
            CrlfError::MalformedResponse(_) => ErrorKind::ProtocolParse,
            CrlfError::SinkWrite(_) => ErrorKind::SinkWrite,
            CrlfError::TomlError(_) | CrlfError::ConfigError(_) | CrlfError::InvalidMethod(_) => {
                ErrorKind::Config
            }
        }
    }
}

/// Result type alias for crlfscan operations
pub type Result<T> = std::result::Result<T, CrlfError>;
