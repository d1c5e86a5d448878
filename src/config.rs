//! Application-level configuration loading: where the league document lives and how long
//! members cool down between workouts.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::Duration;
use tracing::{info, warn};

use crate::state::cooldown::DEFAULT_COOLDOWN;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WORKOUT_TALLY_CONFIG_PATH";
/// Default location of the persisted league document.
const DEFAULT_STORE_PATH: &str = "data/league.json";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    store_path: PathBuf,
    cooldown: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        store = %app_config.store_path.display(),
                        cooldown_minutes = app_config.cooldown.whole_minutes(),
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Path of the JSON league document.
    pub fn store_path(&self) -> &PathBuf {
        &self.store_path
    }

    /// Wait enforced between two scoring events of the same member.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    store_path: Option<PathBuf>,
    #[serde(default)]
    cooldown_minutes: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            store_path: value.store_path.unwrap_or(defaults.store_path),
            cooldown: value
                .cooldown_minutes
                .map(|minutes| Duration::minutes(i64::from(minutes)))
                .unwrap_or(defaults.cooldown),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
