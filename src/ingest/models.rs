//! Data models for inbound payloads and persisted rows
//!
//! Wire types mirror the JSON accepted on the write endpoints. Stored types
//! mirror the SQLite rows handed back to the listing page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// One sample as posted to `/sample/`
///
/// Every field is optional on the wire: a missing or `null` string decodes as
/// empty and a missing or `null` `time` decodes as the Unix epoch. Unknown
/// fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireRecord {
    /// Client-reported sample time, integer seconds since the Unix epoch
    #[serde(deserialize_with = "epoch_seconds_or_null")]
    pub time: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub category_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

impl Default for WireRecord {
    fn default() -> Self {
        Self {
            time: DateTime::UNIX_EPOCH,
            category_name: String::new(),
            source: String::new(),
            value: String::new(),
        }
    }
}

/// Body of `/query_handle_event/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub category_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub values_count: i64,
}

/// `null` leaves the field at its zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Integer epoch seconds, with `null` meaning the epoch itself
///
/// Floats, strings, and out-of-range integers are still decode errors.
fn epoch_seconds_or_null<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    chrono::serde::ts_seconds_option::deserialize(deserializer)
        .map(|time| time.unwrap_or(DateTime::UNIX_EPOCH))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rows awaiting insert
// ─────────────────────────────────────────────────────────────────────────────

/// A normalized sample that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub received_at: DateTime<Utc>,
    pub sample_time: DateTime<Utc>,
    pub category_name: String,
    pub source: String,
    pub value: String,
}

/// An audit event that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub created_at: DateTime<Utc>,
    pub category_name: String,
    pub values_count: i64,
}

impl NewEvent {
    /// Stamp an inbound event payload with the current server time
    pub fn from_payload(payload: EventPayload) -> Self {
        Self {
            created_at: Utc::now(),
            category_name: payload.category_name,
            values_count: payload.values_count,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted rows
// ─────────────────────────────────────────────────────────────────────────────

/// A sample as read back from the `records` table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub received_at: DateTime<Utc>,
    pub sample_time: DateTime<Utc>,
    pub category_name: String,
    pub source: String,
    pub value: String,
}

/// An audit event as read back from the `query_handle_event` table
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHandleEvent {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub category_name: String,
    pub values_count: i64,
}
