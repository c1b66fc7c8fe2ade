use anyhow::{Context as _, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, read_to_string, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Duelterm";
const CONFIG_FILE: &str = "Config.toml";
const LOG_FILE: &str = "duelterm.log";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Endpoint id of the last host joined.
    pub last_host: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl DuelConfig {
    pub fn load() -> Result<DuelConfig> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(DuelConfig::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<DuelConfig> {
        if !path.exists() {
            return Ok(DuelConfig::default());
        }
        let string = read_to_string(path)?;
        toml::from_str(&string).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        match config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let string = toml::to_string_pretty(&self)?;
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                create_dir_all(dir)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(string.as_bytes())?;
        Ok(())
    }

    /// Explicit path first, then the platform data dir.
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        match BaseDirs::new() {
            Some(base) => base.data_local_dir().join(APP_DIR).join(LOG_FILE),
            None => PathBuf::from(LOG_FILE),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join(APP_DIR).join(CONFIG_FILE))
}
