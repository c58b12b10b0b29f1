//! Data models for linkshelf
//!
//! Defines the bookmark record and the validation that guards its creation.
//! A `LinkRecord` only comes into existence through [`LinkRecord::validate`];
//! once created it is never edited.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted URL shape: optional scheme, dotted host with a 2-6 character
/// final segment, then optional path, query and fragment.
///
/// Must keep matching the historical rule exactly, gaps included:
/// upper-case hosts and internationalized domains are rejected, and some
/// hosts that cannot exist (`example.toolongtld`) are accepted.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([0-9a-z.-]+)\.([a-z.]{2,6})[/0-9A-Za-z_ .-]*/?(\?\S*)?(#\S*)?$")
        .expect("URL pattern is a valid regex")
});

/// A required input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Url,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "Title"),
            Field::Url => write!(f, "Link"),
        }
    }
}

/// Reasons raw input cannot become a bookmark
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title or URL was empty after trimming
    #[error("{field} is required! Title and Link must both be filled in.")]
    MissingField { field: Field },

    /// URL does not look like a web address
    #[error("Please enter a valid URL (e.g., http://example.com or example.com), got '{url}'")]
    MalformedUrl { url: String },
}

/// A saved bookmark
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Creation time in milliseconds since the epoch, unique per collection
    pub id: i64,
    /// Display title (trimmed, never empty)
    pub title: String,
    /// Optional description, empty when not given
    #[serde(default)]
    pub description: String,
    /// The URL, always with an explicit http(s) scheme
    pub url: String,
    /// When this link was created
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Validate raw input and build a record stamped with the current time
    pub fn validate(
        title: &str,
        description: &str,
        url: &str,
    ) -> Result<Self, ValidationError> {
        Self::validate_at(title, description, url, Utc::now())
    }

    /// Validate raw input and build a record stamped with `now`
    ///
    /// The timestamp is truncated to millisecond precision so that the
    /// record survives a trip through storage unchanged.
    pub fn validate_at(
        title: &str,
        description: &str,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        let description = description.trim();
        let url = url.trim();

        if title.is_empty() {
            return Err(ValidationError::MissingField { field: Field::Title });
        }
        if url.is_empty() {
            return Err(ValidationError::MissingField { field: Field::Url });
        }
        if !URL_PATTERN.is_match(url) {
            return Err(ValidationError::MalformedUrl {
                url: url.to_string(),
            });
        }

        let created_at = now.trunc_subsecs(3);
        Ok(Self {
            id: created_at.timestamp_millis(),
            title: title.to_string(),
            description: description.to_string(),
            url: normalize_url(url),
            created_at,
        })
    }

    /// Case-insensitive title match against an already lower-cased needle
    pub(crate) fn title_contains(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

/// Check a URL against the accepted shape without building a record
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url.trim())
}

/// Prefix `https://` unless the URL already names http or https
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// `createdAt` as ISO-8601 with milliseconds and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_validate_normalizes_url() {
        let link = LinkRecord::validate("Example", "", "example.com").unwrap();
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.title, "Example");
        assert!(link.description.is_empty());
    }

    #[test]
    fn test_validate_keeps_explicit_scheme() {
        let link = LinkRecord::validate("Plain", "", "http://example.com/a").unwrap();
        assert_eq!(link.url, "http://example.com/a");

        let link = LinkRecord::validate("Secure", "", "https://example.com").unwrap();
        assert_eq!(link.url, "https://example.com");
    }

    #[test]
    fn test_validate_trims_input() {
        let link =
            LinkRecord::validate("  Rust  ", "  systems language ", "  rust-lang.org  ").unwrap();
        assert_eq!(link.title, "Rust");
        assert_eq!(link.description, "systems language");
        assert_eq!(link.url, "https://rust-lang.org");
    }

    #[test]
    fn test_validate_missing_title() {
        let err = LinkRecord::validate("", "desc", "example.com").unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: Field::Title });

        let err = LinkRecord::validate("   ", "", "example.com").unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: Field::Title });
    }

    #[test]
    fn test_validate_missing_url() {
        let err = LinkRecord::validate("Title", "", "  ").unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: Field::Url });
    }

    #[test]
    fn test_missing_title_reported_before_url() {
        let err = LinkRecord::validate("", "", "").unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: Field::Title });
    }

    #[test]
    fn test_validate_malformed_url() {
        let err = LinkRecord::validate("Title", "", "not a url").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedUrl { .. }));
    }

    #[test]
    fn test_url_shapes_accepted() {
        for url in [
            "example.com",
            "https://sub.example.co.uk/path/to/page",
            "http://example.com/?q=rust&page=2",
            "example.io/docs#section",
            "my-site.dev/",
            "192.168.1.1.ab",
            "example.toolongtld",
        ] {
            assert!(is_valid_url(url), "expected '{}' to be accepted", url);
        }
    }

    #[test]
    fn test_url_shapes_rejected() {
        for url in [
            "localhost",
            "Example.com",
            "ftp://example.com",
            "example.c",
            "bücher.de",
        ] {
            assert!(!is_valid_url(url), "expected '{}' to be rejected", url);
        }
    }

    #[test]
    fn test_id_derived_from_creation_time() {
        let now = fixed_now() + chrono::Duration::nanoseconds(123_456_789);
        let link = LinkRecord::validate_at("Title", "", "example.com", now).unwrap();
        assert_eq!(link.id, now.timestamp_millis());
        assert_eq!(link.created_at.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_created_at_serializes_as_iso_millis() {
        let link = LinkRecord::validate_at("Title", "", "example.com", fixed_now()).unwrap();
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["createdAt"], "2024-03-01T12:30:00.000Z");
        assert_eq!(json["id"], 1_709_296_200_000_i64);
        assert_eq!(json["url"], "https://example.com");
    }

    #[test]
    fn test_deserialize_without_description() {
        let json = r#"{"id":1,"title":"T","url":"https://t.io","createdAt":"2024-03-01T12:30:00.000Z"}"#;
        let link: LinkRecord = serde_json::from_str(json).unwrap();
        assert!(link.description.is_empty());
        assert_eq!(link.created_at, fixed_now());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField { field: Field::Url };
        assert!(err.to_string().contains("Link is required"));

        let err = ValidationError::MalformedUrl {
            url: "nope".to_string(),
        };
        assert!(err.to_string().contains("valid URL"));
        assert!(err.to_string().contains("nope"));
    }
}
