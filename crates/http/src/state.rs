//! Application state management

use crate::forwarding::Forwarder;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Relay to the backend API
    pub forwarder: Arc<Forwarder>,
}

impl AppState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder: Arc::new(forwarder),
        }
    }
}
