use crate::model::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const STORE_URI_VAR: &str = "STORE_URI";

pub const RFM_FILE: &str = "rfm_analysis.csv";
pub const COHORT_FILE: &str = "cohort_retention.csv";
pub const CONFUSION_PLOT_FILE: &str = "confusion_matrix.svg";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite path of the document store, optionally prefixed with `sqlite://`.
    #[serde(default)]
    pub store_uri: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_uri: String::new(),
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    pub fn rfm_path(&self) -> PathBuf {
        self.data_dir.join(RFM_FILE)
    }

    pub fn cohort_path(&self) -> PathBuf {
        self.data_dir.join(COHORT_FILE)
    }

    pub fn confusion_plot_path(&self) -> PathBuf {
        self.data_dir.join(CONFUSION_PLOT_FILE)
    }

    /// The store location with any `sqlite://` scheme stripped.
    pub fn store_path(&self) -> &str {
        self.store_uri
            .strip_prefix("sqlite://")
            .unwrap_or(&self.store_uri)
    }
}

/// Loads `path` when it exists, then lets `STORE_URI` override the store location.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let file_config = if Path::new(path).exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        AppConfig::default()
    };
    resolve(file_config, env::var(STORE_URI_VAR).ok())
}

fn resolve(mut config: AppConfig, store_uri: Option<String>) -> Result<AppConfig, ConfigError> {
    if let Some(uri) = store_uri.filter(|u| !u.trim().is_empty()) {
        config.store_uri = uri.trim().to_string();
    }
    if config.store_uri.is_empty() {
        return Err(ConfigError::MissingStoreUri);
    }
    Ok(config)
}
