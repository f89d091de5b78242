//! HTTP handler definitions for the Bookshelf server.
//!
//! Defines `AppState`, the shared state carried through axum extractors, and
//! re-exports every handler for router assembly.

pub mod books;
pub mod health;
pub mod index;

pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use index::index_handler;

use std::sync::Arc;
use std::time::Instant;

use bookshelf_core::BookRepository;

use super::{NetworkConfig, ShutdownController};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Every field is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The book collection. Handlers never touch the container directly.
    pub store: Arc<dyn BookRepository>,
    /// Lifecycle state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Process start time, used for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn BookRepository>, config: NetworkConfig) -> Self {
        Self {
            store,
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use bookshelf_core::{IdAssignment, InMemoryBookStore};

    use super::AppState;
    use crate::network::NetworkConfig;

    /// State over a freshly seeded store.
    pub fn seeded_state() -> AppState {
        AppState::new(
            Arc::new(InMemoryBookStore::seeded(IdAssignment::LastPlusOne)),
            NetworkConfig::default(),
        )
    }
}
