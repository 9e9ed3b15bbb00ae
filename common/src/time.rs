//! Timestamp parsing for quote events.

use chrono::{DateTime, FixedOffset};

use crate::error::{ValidationError, ValidationResult};

/// Observation time of a quote.
///
/// The quoted offset is preserved for display; `Ord` compares the
/// absolute instant, so `09:42+01:00` is older than `09:00+00:00`.
pub type Timestamp = DateTime<FixedOffset>;

/// Compact offset form accepted in addition to RFC 3339 (`+0000`).
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parse an ISO-8601 timestamp carrying a numeric offset or `Z`.
pub fn parse_timestamp(raw: &str) -> ValidationResult<Timestamp> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, COMPACT_OFFSET_FORMAT))
        .map_err(|e| {
            ValidationError::with_field(
                "timestamp",
                format!("'{}' is not an ISO-8601 timestamp with offset: {}", raw, e),
            )
        })
}
