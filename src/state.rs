//! Application state shared by all handlers.

use std::sync::Arc;

use crate::domain::Settings;
use crate::store::{self, MemoryStore, StorePool};

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Card collection and its study stats (single writer)
    pub store: StorePool,

    /// Effective scheduler settings, immutable for the process lifetime
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: MemoryStore, settings: Settings) -> Self {
        Self {
            store: store::new_pool(store),
            settings: Arc::new(settings),
        }
    }
}
