//! HTML listing of stored samples and audit events
//!
//! The page template is compiled into the binary, so rendering cannot fail
//! at runtime. Every interpolated value goes through [`escape_html`].

use crate::ingest::models::{QueryHandleEvent, StoredRecord};
use crate::util::escape_html;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const LISTING_TEMPLATE: &str = include_str!("listing.html");

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn format_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Render the full listing page
///
/// Both slices are rendered in the order given; callers pass them most
/// recent first.
pub fn render(records: &[StoredRecord], events: &[QueryHandleEvent]) -> String {
    let mut record_rows = String::new();
    for record in records {
        // Writing into a String cannot fail
        let _ = writeln!(
            record_rows,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            record.id,
            format_time(&record.received_at),
            format_time(&record.sample_time),
            escape_html(&record.category_name),
            escape_html(&record.source),
            escape_html(&record.value),
        );
    }

    let mut event_rows = String::new();
    for event in events {
        let _ = writeln!(
            event_rows,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            event.id,
            format_time(&event.created_at),
            escape_html(&event.category_name),
            event.values_count,
        );
    }

    let record_count = records.len().to_string();
    let event_count = events.len().to_string();

    fill(
        LISTING_TEMPLATE,
        &[
            ("record_count", record_count.as_str()),
            ("event_count", event_count.as_str()),
            ("record_rows", record_rows.as_str()),
            ("event_rows", event_rows.as_str()),
        ],
    )
}

/// Substitute `{{name}}` slots in a single pass
///
/// Inserted text is never rescanned, so stored values that happen to look
/// like slots come out verbatim.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match slots.iter().find(|(slot, _)| *slot == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + end + 4]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, value: &str) -> StoredRecord {
        StoredRecord {
            id,
            received_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            sample_time: Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 5).unwrap(),
            category_name: "steps".to_string(),
            source: "watch".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_empty_listing_has_no_rows() {
        let html = render(&[], &[]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Records (0)"));
        assert!(html.contains("Query handle events (0)"));
        assert!(!html.contains("<td>"));
        assert!(!html.contains("{{"), "unreplaced placeholder in:\n{html}");
    }

    #[test]
    fn test_records_rendered_in_given_order() {
        let html = render(&[record(2, "newer"), record(1, "older")], &[]);

        assert!(html.contains("Records (2)"));
        let newer = html.find("newer").unwrap();
        let older = html.find("older").unwrap();
        assert!(newer < older);
        assert!(html.contains("<td>2024-03-01 07:00:05 UTC</td>"));
        assert!(html.contains("<td>2024-03-01 08:30:00 UTC</td>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(&[record(1, "<b>bold</b> & more")], &[]);

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; more"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_slot_lookalike_values_are_not_expanded() {
        let html = render(&[record(1, "{{event_rows}}")], &[]);
        assert!(html.contains("<td>{{event_rows}}</td>"));
    }

    #[test]
    fn test_fill_leaves_unknown_slots() {
        assert_eq!(fill("a {{x}} {{y}} {{", &[("x", "1")]), "a 1 {{y}} {{");
    }

    #[test]
    fn test_events_rendered() {
        let event = QueryHandleEvent {
            id: 7,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            category_name: "heart_rate".to_string(),
            values_count: 31,
        };
        let html = render(&[], &[event]);

        assert!(html.contains("Query handle events (1)"));
        assert!(html.contains(
            "<tr><td>7</td><td>2024-01-02 03:04:05 UTC</td><td>heart_rate</td><td>31</td></tr>"
        ));
    }
}
