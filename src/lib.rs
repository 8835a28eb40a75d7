//! crlfscan - concurrent CRLF injection scanner
//!
//! Expands target URLs into payload-bearing candidates, sends each one
//! through either a conformant HTTP client or a raw socket, and reports
//! the candidates whose response carries the injected marker header.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;
