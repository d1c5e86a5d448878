//! Volatile league store.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use futures::future::BoxFuture;

use crate::dao::{
    league_store::LeagueStore,
    models::LeagueDocument,
    storage::{StorageError, StorageResult},
};

/// Volatile store keeping the last saved document in memory.
///
/// Used for ephemeral runs and tests; `fail_saves` makes every subsequent save fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<LeagueDocument>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `document`.
    pub fn with_document(document: LeagueDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    /// Toggle failure injection for `save`.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last saved document.
    pub fn document(&self) -> LeagueDocument {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl LeagueStore for MemoryStore {
    fn load(&self) -> BoxFuture<'_, StorageResult<LeagueDocument>> {
        let document = self.document();
        Box::pin(async move { Ok(document) })
    }

    fn save(&self, document: LeagueDocument) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable(
                    "memory store configured to fail".into(),
                    std::io::Error::other("injected failure"),
                ));
            }

            let mut guard = self
                .document
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = document;
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
