//! Multi-value JSON body decoding
//!
//! A `/sample/` body is not one JSON document but a concatenation of JSON
//! arrays, optionally separated by whitespace:
//!
//! ```text
//! [{"time": 1, ...}, {"time": 2, ...}]
//! [{"time": 3, ...}]
//! ```
//!
//! [`SampleStream`] yields one decoded array per top-level value. A top-level
//! `null` counts as an empty array and a `null` element as an all-default
//! record, the same zero values a missing field gets. A clean end
//! of input ends the iteration; the first decode failure is yielded once and
//! the stream is finished after it, so nothing past a malformed value is ever
//! looked at.

use serde_json::de::{SliceRead, StreamDeserializer};

use super::models::WireRecord;

/// One top-level value as it may appear on the wire
type RawBatch = Option<Vec<Option<WireRecord>>>;

/// Iterator over the top-level record arrays of a request body
pub struct SampleStream<'a> {
    inner: StreamDeserializer<'a, SliceRead<'a>, RawBatch>,
    failed: bool,
}

impl<'a> SampleStream<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            inner: serde_json::Deserializer::from_slice(body).into_iter(),
            failed: false,
        }
    }

    /// Byte offset just past the last successfully decoded array
    pub fn byte_offset(&self) -> usize {
        self.inner.byte_offset()
    }
}

impl Iterator for SampleStream<'_> {
    type Item = Result<Vec<WireRecord>, serde_json::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let item = self.inner.next()?;
        if item.is_err() {
            self.failed = true;
        }
        Some(item.map(|batch| {
            batch
                .unwrap_or_default()
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect()
        }))
    }
}
