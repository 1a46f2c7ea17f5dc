//! Configuration for building SCTs from specification files.
//!
//! ```json
//! {
//!     "logging_level": "debug",
//!     "default_key": "secp256r1",
//!     "default_timestamp": "20200101",
//!     "key_dir": "keys"
//! }
//! ```
//!
//! Every field is optional. A relative `key_dir` is resolved against the
//! directory of the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SctError};
use crate::keyring::KeyRing;
use crate::sct::request::parse_yyyymmdd;
use crate::specification::Defaults;

/// The key used when a specification does not name one.
pub const DEFAULT_KEY: &str = "default";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub logging_level: Option<String>,
    #[serde(default = "default_key")]
    pub default_key: String,
    /// `YYYYMMDD`
    pub default_timestamp: Option<String>,
    pub key_dir: Option<PathBuf>,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging_level: None,
            default_key: default_key(),
            default_timestamp: None,
            key_dir: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SctError::ConfigError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| SctError::ConfigError(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_json(&json)?;
        if let (Some(key_dir), Some(parent)) = (&config.key_dir, path.parent()) {
            if key_dir.is_relative() {
                config.key_dir = Some(parent.join(key_dir));
            }
        }
        Ok(config)
    }

    /// The keys of `key_dir`, or an empty ring if there is none.
    pub fn key_ring(&self) -> Result<KeyRing> {
        match &self.key_dir {
            Some(dir) => KeyRing::load_dir(dir),
            None => Ok(KeyRing::new()),
        }
    }

    pub fn defaults(&self) -> Result<Defaults> {
        let timestamp = self
            .default_timestamp
            .as_deref()
            .map(parse_yyyymmdd)
            .transpose()
            .map_err(|e| SctError::ConfigError(format!("default_timestamp: {e}")))?;
        Ok(Defaults {
            key: self.default_key.clone(),
            timestamp,
        })
    }

    /// The level for the log filter, `warn` unless configured.
    pub fn logging_level(&self) -> &str {
        self.logging_level.as_deref().unwrap_or("warn")
    }
}
