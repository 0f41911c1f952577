// ABOUTME: Minimal Set-Cookie parsing for the password exchange.
// ABOUTME: Extracts name/value pairs and ignores cookie attributes.

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Name and value of one cookie from a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
}

/// Parse a single `Set-Cookie` header value.
///
/// Returns `None` when the leading pair has no `=` or an empty name.
/// Values are percent-decoded when they decode cleanly and unquoted.
pub fn parse_set_cookie(header: &str) -> Option<SetCookie> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    let value = urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string());

    Some(SetCookie {
        name: name.to_string(),
        value,
    })
}

/// Whether the response carried any `Set-Cookie` header.
pub fn has_set_cookie(headers: &HeaderMap) -> bool {
    headers.contains_key(SET_COOKIE)
}

/// All cookies set by a response, in header order.
pub fn set_cookies(headers: &HeaderMap) -> Vec<SetCookie> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect()
}
