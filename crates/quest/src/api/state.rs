//! Application state shared across handlers.

use std::sync::Arc;

use crate::bridge::BridgeService;
use crate::player::PlayerKeys;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bridge to the running quiz programs.
    pub bridge: Arc<BridgeService>,
    /// Player session signing keys.
    pub players: Arc<PlayerKeys>,
    /// Allowed CORS origins. Empty disables cross-origin access.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Create new application state.
    pub fn new(bridge: BridgeService, players: PlayerKeys) -> Self {
        Self {
            bridge: Arc::new(bridge),
            players: Arc::new(players),
            allowed_origins: Vec::new(),
        }
    }

    /// Set the allowed CORS origins.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
