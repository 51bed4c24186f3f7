//! HTTP API for the intake agent

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::relay::Relay;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    #[must_use]
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}
