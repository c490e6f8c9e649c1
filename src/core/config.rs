use crate::core::resolver::FallbackRate;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency aggregations normalize into unless a caller overrides it.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Static rate matrix used when no persisted rate resolves. Overriding
    /// this in the config file replaces the embedded defaults entirely.
    #[serde(default = "default_fallback_rates")]
    pub fallback_rates: Vec<FallbackRate>,
    pub data_path: Option<String>,
}

fn default_base_currency() -> String {
    "IQD".to_string()
}

/// Embedded approximate rates for the supported currency set. Both
/// directions of a pair are listed; the resolver does not invert these.
pub fn default_fallback_rates() -> Vec<FallbackRate> {
    [
        ("USD", "IQD", 1315.0),
        ("IQD", "USD", 0.00076),
        ("EUR", "IQD", 1425.0),
        ("IQD", "EUR", 0.0007),
        ("GBP", "IQD", 1660.0),
        ("IQD", "GBP", 0.0006),
        ("TRY", "IQD", 38.5),
        ("IQD", "TRY", 0.026),
        ("SAR", "IQD", 350.5),
        ("IQD", "SAR", 0.00285),
        ("AED", "IQD", 358.0),
        ("IQD", "AED", 0.0028),
        ("KWD", "IQD", 4280.0),
        ("IQD", "KWD", 0.00023),
        ("USD", "EUR", 0.92),
        ("EUR", "USD", 1.09),
        ("USD", "GBP", 0.79),
        ("GBP", "USD", 1.27),
        ("USD", "TRY", 34.2),
        ("TRY", "USD", 0.029),
        ("USD", "SAR", 3.75),
        ("SAR", "USD", 0.2667),
        ("USD", "AED", 3.67),
        ("AED", "USD", 0.2725),
        ("USD", "KWD", 0.307),
        ("KWD", "USD", 3.26),
        ("EUR", "GBP", 0.86),
        ("GBP", "EUR", 1.16),
    ]
    .into_iter()
    .map(|(from, to, rate)| FallbackRate {
        from: from.to_string(),
        to: to.to_string(),
        rate,
    })
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            fallback_rates: default_fallback_rates(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "masarif", "masarif")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "masarif", "masarif")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
