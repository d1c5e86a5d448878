//! Persistence layer.

/// League document persistence backends.
pub mod league_store;
/// Persisted document definitions.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
