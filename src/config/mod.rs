use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::api::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::controller::{ControllerOptions, DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE};
use crate::error::{CitizensError, Result};

const CONFIG_DIR_NAME: &str = ".citizens";
const CONFIG_FILE_NAME: &str = "config.yaml";
const ENV_PREFIX: &str = "CITIZENS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub table: TableSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout; unset waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Rows per page when the table opens
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page sizes offered by the pager
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,

    /// Quiet period before a text filter is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page_size_options() -> Vec<u32> {
    vec![10, 20, 50, 100]
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Config {
    /// Get the configuration directory path
    pub fn config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| CitizensError::Config("Could not determine home directory".to_string()))?;

        Ok(home_dir.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file full path
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_path()?.join(CONFIG_FILE_NAME))
    }

    /// Initialize configuration directory and file
    pub fn initialize() -> Result<()> {
        Self::initialize_at(&Self::config_file_path()?)
    }

    /// Create `config_file` (and its directory) with defaults if missing
    pub fn initialize_at(config_file: &Path) -> Result<()> {
        if let Some(config_dir) = config_file.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)
                    .map_err(|e| CitizensError::Config(format!("Failed to create config directory: {}", e)))?;

                // Set directory permissions to 0700 on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let permissions = fs::Permissions::from_mode(0o700);
                    fs::set_permissions(config_dir, permissions)
                        .map_err(|e| CitizensError::Config(format!("Failed to set directory permissions: {}", e)))?;
                }
            }
        }

        if !config_file.exists() {
            Self::default().save_to(config_file)?;
        }

        Ok(())
    }

    /// Load configuration from the default file, with environment overrides
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file_path()?;
        Self::initialize_at(&config_file)?;
        Self::load_from(&config_file)
    }

    /// Load `config_file` (optional) layered under `CITIZENS_*` environment variables.
    ///
    /// Nested keys use a double underscore: `CITIZENS_API__BASE_URL`.
    pub fn load_from(config_file: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(config_file)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CitizensError::Config(format!("Failed to read configuration: {}", e)))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| CitizensError::Config(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        let config_file = Self::config_file_path()?;
        Self::initialize_at(&config_file)?;
        self.save_to(&config_file)
    }

    pub fn save_to(&self, config_file: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;

        fs::write(config_file, yaml)
            .map_err(|e| CitizensError::Config(format!("Failed to write config file: {}", e)))?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(config_file, permissions)
                .map_err(|e| CitizensError::Config(format!("Failed to set file permissions: {}", e)))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            CitizensError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CitizensError::Config(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.table.page_size == 0 {
            return Err(CitizensError::Config("table.page_size must be 1 or greater".to_string()));
        }
        if !self.table.page_size_options.is_empty()
            && !self.table.page_size_options.contains(&self.table.page_size)
        {
            return Err(CitizensError::Config(format!(
                "table.page_size {} is not one of {:?}",
                self.table.page_size, self.table.page_size_options
            )));
        }
        Ok(())
    }

    /// Set a configuration value by key path. Call [`Config::save`] to persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "api.base_url" => {
                updated.api.base_url = value.trim().to_string();
            }
            "api.timeout_secs" => {
                updated.api.timeout_secs = match value.trim() {
                    "" | "none" => None,
                    secs => Some(parse_number(key, secs)?),
                };
            }
            "table.page_size" => {
                updated.table.page_size = parse_number(key, value)?;
            }
            "table.debounce_ms" => {
                updated.table.debounce_ms = parse_number(key, value)?;
            }
            _ => {
                return Err(CitizensError::Config(format!("Unknown configuration key: {}", key)));
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Get a configuration value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.timeout_secs" => self.api.timeout_secs.map(|s| s.to_string()),
            "table.page_size" => Some(self.table.page_size.to_string()),
            "table.page_size_options" => Some(
                self.table
                    .page_size_options
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            "table.debounce_ms" => Some(self.table.debounce_ms.to_string()),
            _ => None,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: self.api.timeout_secs,
            ..Default::default()
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            page_size: self.table.page_size,
            debounce: Duration::from_millis(self.table.debounce_ms),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CitizensError::Config(format!("{} expects a number, got '{}'", key, value)))
}
