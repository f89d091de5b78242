//! Bookshelf Server: HTTP API exposing the in-memory book collection.

pub mod error;
pub mod network;

pub use error::ApiError;
pub use network::{AppState, NetworkConfig, NetworkModule};
