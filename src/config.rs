use crate::{client::DEFAULT_BASE_URL, error::Result};
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Prefix of every environment variable the suite reads, e.g. `TEST_USERNAME`.
pub const ENV_PREFIX: &str = "TEST_";

/// Run-wide settings. Each field can be overridden by `TEST_<FIELD>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub base_url: String,
    /// Fixed wait around token generation, in milliseconds.
    pub settle_delay_ms: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::from("testuser"),
            password: String::from("Test@123"),
            base_url: String::from(DEFAULT_BASE_URL),
            settle_delay_ms: 2000,
            log_file: PathBuf::from("test.log"),
        }
    }
}

impl Config {
    /// Load `.env` from the working directory (without overriding variables
    /// already set), then layer `TEST_*` variables over the defaults.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => (),
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
        }

        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
