//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Datastore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the configuration and the datastore handle. The handle is created
/// once at startup and passed in here; handlers never reach for a global pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<dyn Datastore>,
}

impl AppState {
    /// Creates a new application state from the given configuration and datastore.
    pub fn new(config: AppConfig, db: Arc<dyn Datastore>) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}
