//! Data storage layer
//!
//! - `mongo` - MongoDB habit store (default)
//! - `memory` - In-memory habit store for local runs and tests
//! - `traits` - `HabitRepository`, implemented by every backend
//! - `types` - Habit document and query types shared by backends
//! - `error` - Unified error type for all backends

pub mod error;
pub mod memory;
pub mod mongo;
pub mod traits;
pub mod types;

use std::sync::Arc;

pub use error::DataError;
pub use memory::InMemoryHabitStore;
pub use mongo::MongoHabitStore;
pub use traits::HabitRepository;

use crate::core::config::{DatabaseConfig, StoreBackend};

/// Habit store service
///
/// Wraps the configured backend behind `HabitRepository` so the rest of the
/// application never depends on a concrete store.
#[derive(Clone)]
pub struct HabitStore {
    backend: Arc<dyn HabitRepository>,
}

impl std::fmt::Debug for HabitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HabitStore")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl HabitStore {
    /// Initialize the store from configuration
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let backend: Arc<dyn HabitRepository> = match config.backend {
            StoreBackend::Mongo => {
                let mongo = config.mongo.as_ref().ok_or_else(|| {
                    DataError::Config("MongoDB configuration required".to_string())
                })?;
                Arc::new(MongoHabitStore::connect(mongo).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory habit store; data is lost on restart");
                Arc::new(InMemoryHabitStore::new())
            }
        };

        tracing::debug!(backend = backend.backend_name(), "Habit store initialized");
        Ok(Self { backend })
    }

    /// Wrap an existing repository
    pub fn from_repository(backend: Arc<dyn HabitRepository>) -> Self {
        Self { backend }
    }

    /// Empty in-memory store
    pub fn in_memory() -> Self {
        Self::from_repository(Arc::new(InMemoryHabitStore::new()))
    }

    /// Get the repository for habit operations
    pub fn repository(&self) -> &dyn HabitRepository {
        self.backend.as_ref()
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Close the underlying backend
    pub async fn close(&self) {
        self.backend.close().await;
    }
}
