//! Wire record normalization
//!
//! Turns a decoded [`WireRecord`] into the canonical [`NewRecord`] that the
//! store persists. String fields pass through untouched: empty, oversized, and
//! arbitrary Unicode values are all accepted.

use chrono::{DateTime, Utc};

use super::models::{NewRecord, WireRecord};

/// Normalize a wire record against an explicit receipt time
pub fn normalize(wire: WireRecord, received_at: DateTime<Utc>) -> NewRecord {
    NewRecord {
        received_at,
        sample_time: wire.time,
        category_name: wire.category_name,
        source: wire.source,
        value: wire.value,
    }
}

impl NewRecord {
    /// Normalize a wire record, stamping receipt with the server clock
    pub fn from_wire(wire: WireRecord) -> Self {
        normalize(wire, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wire(time: i64, category: &str, source: &str, value: &str) -> WireRecord {
        WireRecord {
            time: Utc.timestamp_opt(time, 0).unwrap(),
            category_name: category.to_string(),
            source: source.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_normalize_copies_fields() {
        let received = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = normalize(wire(1_600_000_000, "steps", "phone", "1200"), received);

        assert_eq!(record.received_at, received);
        assert_eq!(record.sample_time.timestamp(), 1_600_000_000);
        assert_eq!(record.category_name, "steps");
        assert_eq!(record.source, "phone");
        assert_eq!(record.value, "1200");
    }

    #[test]
    fn test_normalize_keeps_future_sample_time() {
        // Sample time is never checked against receipt time
        let received = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
        let record = normalize(wire(future.timestamp(), "", "", ""), received);

        assert_eq!(record.sample_time, future);
        assert!(record.sample_time > record.received_at);
    }

    #[test]
    fn test_normalize_accepts_any_strings() {
        let long = "x".repeat(10_000);
        let record = normalize(wire(0, "", "日本語 ✓", &long), Utc::now());

        assert_eq!(record.category_name, "");
        assert_eq!(record.source, "日本語 ✓");
        assert_eq!(record.value.len(), 10_000);
    }

    #[test]
    fn test_from_wire_stamps_current_time() {
        let before = Utc::now();
        let record = NewRecord::from_wire(wire(0, "a", "b", "c"));
        let after = Utc::now();

        assert!(record.received_at >= before && record.received_at <= after);
    }
}
