use std::{
    env,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    allocation::{income_to_cents, AllocationPolicy},
    errors::FlowError,
    utils::persistence::{ensure_dir, read_json, write_json_atomic},
};

/// Overrides the base directory for configuration and data.
pub const HOME_ENV: &str = "FLOW_CORE_HOME";
const APP_DIR: &str = "flow";

/// User preferences for the Flow CLI and service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    /// Monthly income used by the impact preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    /// Slider granularity in percentage points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_step: Option<f64>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Custom directory for `flow.json`. Defaults to `<base>/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_retention: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            monthly_income: None,
            slider_step: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_dir: None,
            history_retention: None,
        }
    }
}

impl Config {
    fn default_locale() -> String {
        "en-US".into()
    }

    fn default_currency() -> String {
        "USD".into()
    }

    fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn policy(&self) -> AllocationPolicy {
        match self.slider_step {
            Some(step) if step.is_finite() && step > 0.0 => AllocationPolicy::with_step(step),
            _ => AllocationPolicy::default(),
        }
    }

    pub fn income_cents(&self) -> Result<Option<i64>, FlowError> {
        self.monthly_income.map(income_to_cents).transpose()
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| base.join("data"))
    }
}

/// `$FLOW_CORE_HOME`, else the platform data directory (or home) plus `flow`.
pub fn resolve_base_dir() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Loads and saves [`Config`] under `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, FlowError> {
        Self::with_base_dir(resolve_base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, FlowError> {
        let config_dir = base.join("config");
        ensure_dir(&config_dir)?;
        Ok(Self {
            path: config_dir.join("config.json"),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, FlowError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, config: &Config) -> Result<(), FlowError> {
        write_json_atomic(&self.path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.ui_color_enabled);
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();

        let config = Config {
            monthly_income: Some(4200.0),
            slider_step: Some(1.0),
            ..Config::default()
        };
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.income_cents().unwrap(), Some(420_000));
        assert_eq!(loaded.policy().step, Some(1.0));
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let config: Config = serde_json::from_str(r#"{"monthly_income": 1000}"#).unwrap();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.monthly_income, Some(1000.0));
        assert!(config.ui_color_enabled);
    }

    #[test]
    fn non_positive_step_disables_snapping() {
        let config = Config {
            slider_step: Some(0.0),
            ..Config::default()
        };
        assert_eq!(config.policy(), AllocationPolicy::default());
    }

    #[test]
    fn data_dir_defaults_under_base() {
        let config = Config::default();
        let base = PathBuf::from("/tmp/flow-home");
        assert_eq!(config.resolve_data_dir(&base), base.join("data"));
    }
}
