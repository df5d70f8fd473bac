//! Shared handler state

use std::sync::Arc;

use crate::storage::SampleStore;

/// State handed to every request handler
///
/// Built once by the process root; cloning only bumps the store's refcount.
#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<dyn SampleStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        Self { store }
    }
}
