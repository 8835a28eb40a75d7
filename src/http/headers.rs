//! Validation of caller-supplied `Name:Value` header strings

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use tracing::debug;

/// A header string split at its first colon, both halves kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    pub name: String,
    pub value: String,
}

/// Why a header string was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRejection {
    /// No `:` anywhere in the string
    MissingSeparator,
    /// Name is not a valid HTTP token once trimmed
    InvalidName,
    /// Value contains bytes an HTTP client refuses to send
    InvalidValue,
}

impl fmt::Display for HeaderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderRejection::MissingSeparator => write!(f, "missing ':' separator"),
            HeaderRejection::InvalidName => write!(f, "invalid header name"),
            HeaderRejection::InvalidValue => write!(f, "invalid header value"),
        }
    }
}

/// Splits a raw header string at the first `:`.
///
/// Nothing is trimmed or escaped: the raw-socket path writes the two
/// halves back exactly as given.
pub fn parse_header(raw: &str) -> Result<RawHeader, HeaderRejection> {
    let (name, value) = raw
        .split_once(':')
        .ok_or(HeaderRejection::MissingSeparator)?;
    Ok(RawHeader {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parses every raw header, dropping the rejected ones
pub fn parse_headers(raw: &[String]) -> Vec<RawHeader> {
    raw.iter()
        .filter_map(|h| match parse_header(h) {
            Ok(header) => Some(header),
            Err(reason) => {
                debug!("Dropping header {h:?}: {reason}");
                None
            }
        })
        .collect()
}

impl RawHeader {
    /// Converts to a typed header pair for a conformant client
    pub fn to_typed(&self) -> Result<(HeaderName, HeaderValue), HeaderRejection> {
        let name = HeaderName::from_bytes(self.name.trim().as_bytes())
            .map_err(|_| HeaderRejection::InvalidName)?;
        let value = HeaderValue::from_str(self.value.trim())
            .map_err(|_| HeaderRejection::InvalidValue)?;
        Ok((name, value))
    }
}

/// Builds the header map for the standard client.
///
/// Later headers with the same name replace earlier ones.
pub fn to_header_map(headers: &[RawHeader]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for header in headers {
        match header.to_typed() {
            Ok((name, value)) => {
                map.insert(name, value);
            }
            Err(reason) => debug!("Dropping header {:?}: {reason}", header.name),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_first_colon() {
        let header = parse_header("Referer: http://a.test:8080/").expect("accepted");
        assert_eq!(header.name, "Referer");
        assert_eq!(header.value, " http://a.test:8080/");
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert_eq!(
            parse_header("NoColonHere"),
            Err(HeaderRejection::MissingSeparator)
        );
    }

    #[test]
    fn test_parse_headers_keeps_order_and_drops_malformed() {
        let raw = vec![
            "B:2".to_string(),
            "garbage".to_string(),
            "A:1".to_string(),
        ];
        let headers = parse_headers(&raw);
        let names: Vec<&str> = headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_typed_conversion_trims_and_validates() {
        let ok = parse_header("X-Test:  value ").expect("accepted");
        let (name, value) = ok.to_typed().expect("valid");
        assert_eq!(name.as_str(), "x-test");
        assert_eq!(value, "value");

        let bad_name = parse_header("Bad Name:x").expect("accepted");
        assert_eq!(bad_name.to_typed(), Err(HeaderRejection::InvalidName));
    }

    #[test]
    fn test_header_map_last_wins() {
        let headers = parse_headers(&["Cookie:a=1".to_string(), "Cookie:b=2".to_string()]);
        let map = to_header_map(&headers);
        assert_eq!(map.get_all("cookie").iter().count(), 1);
        assert_eq!(map["cookie"], "b=2");
    }
}
