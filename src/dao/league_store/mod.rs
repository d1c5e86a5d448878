//! Backends able to hold the league document.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::dao::models::LeagueDocument;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the durable home of the league document.
///
/// Implementations rewrite the whole document on every `save`; partial writes must never
/// become visible to a later `load`.
pub trait LeagueStore: Send + Sync {
    /// Read the persisted document, yielding an empty one when nothing was stored yet.
    fn load(&self) -> BoxFuture<'_, StorageResult<LeagueDocument>>;
    /// Replace the persisted document.
    fn save(&self, document: LeagueDocument) -> BoxFuture<'_, StorageResult<()>>;
}
