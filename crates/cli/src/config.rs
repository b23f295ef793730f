//! CLI configuration file.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use fluency_core::LevelCurve;
use serde::{Deserialize, Serialize};

/// Name of the config file looked up inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".fluency";

/// Settings read from `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where stats are stored
    pub data_dir: Option<PathBuf>,

    /// Experience needed to clear level 1
    pub base_xp: u64,

    /// Per-level growth of the requirement
    pub growth: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            base_xp: LevelCurve::DEFAULT_BASE_XP,
            growth: LevelCurve::DEFAULT_GROWTH,
        }
    }
}

impl AppConfig {
    /// Read a config file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Read a config file if present, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the config from an explicit path or the data directory.
    ///
    /// An explicit `--config` must exist; the implicit `<data-dir>/config.json`
    /// is optional. A `--data-dir` flag wins over the file's `data_dir`.
    pub fn resolve(config: Option<&Path>, data_dir: Option<&Path>) -> Result<(Self, PathBuf)> {
        let lookup_dir = data_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let app = match config {
            Some(path) => Self::load(path)?,
            None => Self::load_or_default(&lookup_dir.join(CONFIG_FILE))?,
        };

        let data_dir = data_dir
            .map(Path::to_path_buf)
            .or_else(|| app.data_dir.clone())
            .unwrap_or(lookup_dir);
        Ok((app, data_dir))
    }

    /// Level curve described by this config.
    pub fn curve(&self) -> Result<LevelCurve> {
        LevelCurve::new(self.base_xp, self.growth).context("invalid level curve in config")
    }
}
