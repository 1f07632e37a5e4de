//! ### Config
//! Explicit run configuration handed to the collaborators that need it,
//! instead of process-wide credential or working-directory lookups.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Market-data API token. Only a remote [`MarketData`](crate::market::MarketData)
    /// client consumes it; the local archive does not.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Relative input and output paths are resolved against this directory.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_dir: default_base_dir(),
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Values given on the command line or in the environment win over the file.
    pub fn with_overrides(mut self, api_key: Option<String>, base_dir: Option<PathBuf>) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if let Some(base_dir) = base_dir {
            self.base_dir = base_dir;
        }
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
