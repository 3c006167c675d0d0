//! Data models for the short-link service
//!
//! This module defines the short code newtype, the persisted record and the
//! request/response shapes exchanged with the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length of a short code
pub const MAX_CODE_LEN: usize = 32;

/// A short, URL-safe identifier for a mapping
///
/// Only `[0-9A-Za-z_-]` characters are allowed, so a code never needs
/// percent-encoding when embedded in a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Validates and wraps a code. Returns `None` for empty, oversized or
    /// non URL-safe input.
    pub fn parse(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        let valid = !code.is_empty()
            && code.len() <= MAX_CODE_LEN
            && code
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then_some(Self(code))
    }

    /// Wraps a code known to be URL-safe, e.g. one built from the base62
    /// alphabet.
    pub(crate) fn new_unchecked(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the full short URL under the given base
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mapping persisted in the store
///
/// Records are immutable once inserted: there is no update path, and
/// `created_at` is stamped by the store at insertion time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShortLinkRecord {
    /// Unique short code
    pub code: ShortCode,

    /// User supplied label
    pub title: String,

    /// Destination URL, validated as absolute http(s) at creation
    pub original_url: String,

    /// Timestamp assigned by the store on insert
    pub created_at: DateTime<Utc>,
}

/// A validated mapping that has not been inserted yet
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: ShortCode,
    pub title: String,
    pub original_url: String,
}

impl NewShortLink {
    pub(crate) fn stamp(self, created_at: DateTime<Utc>) -> ShortLinkRecord {
        ShortLinkRecord {
            code: self.code,
            title: self.title,
            original_url: self.original_url,
            created_at,
        }
    }
}

/// Request payload for creating a short URL
///
/// # Example
/// ```json
/// {
///   "title": "Rust homepage",
///   "originalUrl": "https://www.rust-lang.org/"
/// }
/// ```
///
/// Missing fields deserialize as empty strings so that validation can name
/// the offending field.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub original_url: String,
}

/// Wire representation of a record
///
/// # Example
/// ```json
/// {
///   "code": "aZ3k9Q",
///   "title": "Rust homepage",
///   "shortUrl": "http://localhost:8080/s/aZ3k9Q",
///   "originalUrl": "https://www.rust-lang.org/",
///   "createdAt": "2026-01-17T13:40:00Z"
/// }
/// ```
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlResponse {
    pub code: String,
    pub title: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl ShortUrlResponse {
    pub fn from_record(record: ShortLinkRecord, base_url: &str) -> Self {
        Self {
            short_url: record.code.url(base_url),
            code: record.code.0,
            title: record.title,
            original_url: record.original_url,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_url_safe_codes() {
        assert!(ShortCode::parse("abc123").is_some());
        assert!(ShortCode::parse("my-link_2").is_some());
    }

    #[test]
    fn parse_rejects_empty_and_unsafe_codes() {
        assert!(ShortCode::parse("").is_none());
        assert!(ShortCode::parse("has space").is_none());
        assert!(ShortCode::parse("a/b").is_none());
        assert!(ShortCode::parse("ünï").is_none());
        assert!(ShortCode::parse("x".repeat(MAX_CODE_LEN + 1)).is_none());
    }

    #[test]
    fn url_joins_base_without_double_slash() {
        let code = ShortCode::parse("abc123").unwrap();
        assert_eq!(code.url("http://localhost:8080/s/"), "http://localhost:8080/s/abc123");
        assert_eq!(code.url("http://localhost:8080/s"), "http://localhost:8080/s/abc123");
    }

    #[test]
    fn create_request_uses_camel_case_and_defaults() {
        let req: CreateRequest =
            serde_json::from_str(r#"{"originalUrl":"https://example.com"}"#).unwrap();
        assert_eq!(req.original_url, "https://example.com");
        assert!(req.title.is_empty());
    }
}
