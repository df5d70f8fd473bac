//! Handler error types and response mapping

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};

use crate::ingest::IngestError;

/// Errors a write handler can end with
#[derive(Debug)]
pub(crate) enum ServerError {
    Ingest(IngestError),
    /// The blocking storage task panicked or was cancelled
    Task(String),
}

impl From<IngestError> for ServerError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response<Body> {
        let (status, message) = match self {
            ServerError::Ingest(err @ (IngestError::Decode { .. } | IngestError::EmptyBody)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ServerError::Ingest(err @ IngestError::Storage { .. }) => {
                tracing::error!(
                    "Sample request aborted after {} stored record(s)",
                    err.committed()
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to store record".to_string(),
                )
            }
            ServerError::Task(msg) => {
                tracing::error!("Storage task failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        Response::builder()
            .status(status)
            .body(Body::from(message))
            .unwrap_or_else(|_| Response::new(Body::from("Internal error building error response")))
    }
}
