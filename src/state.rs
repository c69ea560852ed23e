use std::sync::Arc;

use crate::config::AppConfig;
use crate::signaling::PeerRegistry;

/// Application-wide state shared across handlers
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,
    /// Username to connection table for the signaling relay
    pub registry: Arc<PeerRegistry>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            registry: Arc::new(PeerRegistry::new()),
        })
    }
}
