//! Ingestion pipeline for sample batches and audit events
//!
//! # Architecture
//!
//! ```text
//! request body bytes
//!     │
//!     └──→ SampleStream (one JSON array per step)
//!             │
//!             └──→ normalize (stamp receipt time)
//!                     │
//!                     └──→ SampleStore::insert_record (one row, own commit)
//! ```
//!
//! Each record commits independently. A decode error or a failed insert stops
//! the request where it is; rows written before the failure stay written.

pub mod models;
pub mod normalize;
pub mod stream;

use crate::storage::{SampleStore, StorageError};
use models::{EventPayload, NewEvent, NewRecord};
use stream::SampleStream;

/// Why a sample request stopped early
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The body was not a sequence of record arrays
    #[error("{source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Records committed before the bad value was reached
        committed: usize,
    },

    /// The body held no JSON value at all (event endpoint only)
    #[error("request body is empty")]
    EmptyBody,

    /// A record could not be written
    #[error("failed to store record: {source}")]
    Storage {
        #[source]
        source: StorageError,
        /// Records committed before the failing insert
        committed: usize,
    },
}

impl IngestError {
    /// Number of rows already written when the request stopped
    pub fn committed(&self) -> usize {
        match self {
            Self::Decode { committed, .. } | Self::Storage { committed, .. } => *committed,
            Self::EmptyBody => 0,
        }
    }
}

/// Outcome of a fully consumed sample body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Top-level arrays decoded
    pub arrays: usize,
    /// Records written
    pub records: usize,
}

/// Decode a multi-array body and persist every record in order
///
/// Stops at the first decode failure or failed insert.
pub fn ingest_samples(store: &dyn SampleStore, body: &[u8]) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();

    let mut stream = SampleStream::new(body);
    while let Some(batch) = stream.next() {
        let batch = batch.map_err(|source| {
            tracing::warn!(
                "Failed to decode sample body after byte {}: {}",
                stream.byte_offset(),
                source
            );
            IngestError::Decode {
                source,
                committed: summary.records,
            }
        })?;
        summary.arrays += 1;

        for wire in batch {
            let record = NewRecord::from_wire(wire);
            tracing::debug!(
                category = %record.category_name,
                source = %record.source,
                sample_time = %record.sample_time,
                "Saving record"
            );

            store.insert_record(&record).map_err(|source| {
                tracing::error!("Failed to save new record: {}", source);
                IngestError::Storage {
                    source,
                    committed: summary.records,
                }
            })?;
            summary.records += 1;
        }
    }

    Ok(summary)
}

/// Decode an event body
///
/// Only the first JSON value is read; anything after it is ignored. A bare
/// `null` is an all-default event.
pub fn decode_event(body: &[u8]) -> Result<EventPayload, IngestError> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<EventPayload>>()
        .next()
    {
        Some(Ok(payload)) => Ok(payload.unwrap_or_default()),
        Some(Err(source)) => Err(IngestError::Decode {
            source,
            committed: 0,
        }),
        None => Err(IngestError::EmptyBody),
    }
}

/// Persist one audit event
///
/// A failed write is logged and reported as `false`; it never fails the
/// request that carried the event.
pub fn record_event(store: &dyn SampleStore, payload: EventPayload) -> bool {
    let event = NewEvent::from_payload(payload);
    tracing::debug!(
        category = %event.category_name,
        values_count = event.values_count,
        "Saving query handle event"
    );

    match store.insert_event(&event) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Failed to save query handle event: {}", e);
            false
        }
    }
}
