use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "sacco.db";

/// Where members are told to send money; no payment API is ever called.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct PaymentConfig {
    pub(crate) provider: String,
    pub(crate) paybill: String,
    pub(crate) currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: "M-PESA".into(),
            paybill: "123456".into(),
            currency: "KES".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) log_level: String,
    pub(crate) payment: PaymentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: "info".into(),
            payment: PaymentConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.json` from the platform config directory when present,
    /// then apply `SACCO_DB`, `SACCO_PAYBILL` and `SACCO_LOG` overrides.
    pub(crate) fn load() -> Result<Self> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::from_file(&dirs.config_dir().join(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults.
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub(crate) fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("SACCO_DB").filter(|v| !v.is_empty()) {
            self.db_path = Some(PathBuf::from(db));
        }
        if let Some(paybill) = lookup("SACCO_PAYBILL").filter(|v| !v.is_empty()) {
            self.payment.paybill = paybill;
        }
        if let Some(level) = lookup("SACCO_LOG").filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }

    /// The configured database path, or `sacco.db` in the platform data directory.
    pub(crate) fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        Ok(data_dir()?.join(DB_FILE))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "sacco", "Sacco")
}

/// Platform data directory, created on first use.
pub(crate) fn data_dir() -> Result<PathBuf> {
    let proj_dirs =
        project_dirs().ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}
