//! Configuration: config directory management and the TOML application
//! config (data-loading options and KPI card fields).

use crate::dataset::NumericField;
use crate::dispatch::DEFAULT_KPI_FIELDS;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub data: DataConfig,
    pub kpi: KpiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            data: DataConfig::default(),
            kpi: KpiConfig::default(),
        }
    }
}

/// Data-loading options (overridable from the command line).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Excel worksheet selector: name or 0-based index.
    pub excel_sheet: Option<String>,
    /// CSV field separator, a single character.
    pub delimiter: Option<String>,
}

/// Which numeric fields appear as KPI cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    pub fields: Vec<String>,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            fields: DEFAULT_KPI_FIELDS
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` in the manager's directory,
    /// falling back to defaults when the file does not exist. Validation
    /// fails fast on bad field names, never at query time.
    pub fn load(manager: &ConfigManager) -> Result<Self> {
        let config_path = manager.config_path("config.toml");
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                eyre!(
                    "Failed to read config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            toml::from_str(&content).map_err(|e| {
                eyre!(
                    "Failed to parse config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?
        } else {
            AppConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(d) = &self.data.delimiter {
            if d.chars().count() != 1 {
                return Err(eyre!(
                    "data.delimiter must be a single character, got '{}'",
                    d
                ));
            }
        }
        if self.kpi.fields.is_empty() {
            return Err(eyre!("kpi.fields must list at least one field"));
        }
        for name in &self.kpi.fields {
            if NumericField::from_name(name).is_none() {
                return Err(eyre!("unknown KPI field '{}' in config", name));
            }
        }
        Ok(())
    }

    /// KPI fields resolved to their typed form. Call after `load` (which
    /// validated the names).
    pub fn kpi_fields(&self) -> Vec<NumericField> {
        self.kpi
            .fields
            .iter()
            .filter_map(|name| NumericField::from_name(name))
            .collect()
    }

    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.data
            .delimiter
            .as_ref()
            .and_then(|d| d.bytes().next())
    }
}
