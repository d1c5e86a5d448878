//! Shared application state.

pub mod cooldown;
pub mod leaderboard;
pub mod league;
pub mod member;

use std::sync::Arc;

use time::Duration;

use crate::dao::{league_store::LeagueStore, storage::StorageResult};

use self::league::League;

/// Handle cloned into every handler.
pub type SharedState = Arc<AppState>;

/// Central application state handed to every route and service.
pub struct AppState {
    league: League,
}

impl AppState {
    /// Wrap an already loaded league.
    pub fn new(league: League) -> SharedState {
        Arc::new(Self { league })
    }

    /// Load the league from `store` and wrap it.
    pub async fn load(
        store: Arc<dyn LeagueStore>,
        cooldown: Duration,
    ) -> StorageResult<SharedState> {
        let league = League::load(store, cooldown).await?;
        Ok(Self::new(league))
    }

    /// The league engine.
    pub fn league(&self) -> &League {
        &self.league
    }

    /// True while the in-memory league is ahead of the store after a failed save.
    pub fn is_degraded(&self) -> bool {
        !self.league.is_healthy()
    }
}
