use nutriplan_core::{CategoryTable, LayoutOptions, ValidationRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Slots that may be saved without dishes
    pub flexible_slots: ConfigValue<Vec<String>>,
    /// Optional parts of rendered documents
    pub layout: ConfigValue<LayoutOptions>,
    /// Keywords appended to the default dish categories, by category name
    pub extra_keywords: ConfigValue<BTreeMap<String, Vec<String>>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    flexible_slots: Option<Vec<String>>,
    layout: Option<LayoutOptions>,
    extra_keywords: Option<BTreeMap<String, Vec<String>>>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut flexible_slots = ConfigValue::new(
            ValidationRules::default().flexible_slots,
            ConfigSource::Default,
        );
        let mut layout = ConfigValue::new(LayoutOptions::default(), ConfigSource::Default);
        let mut extra_keywords = ConfigValue::new(BTreeMap::new(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(slots) = file_config.flexible_slots {
                flexible_slots = ConfigValue::new(slots, ConfigSource::File);
            }
            if let Some(options) = file_config.layout {
                layout = ConfigValue::new(options, ConfigSource::File);
            }
            if let Some(keywords) = file_config.extra_keywords {
                extra_keywords = ConfigValue::new(keywords, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(slots) = std::env::var("NUTRIPLAN_FLEXIBLE_SLOTS") {
            flexible_slots = ConfigValue::new(parse_list(&slots), ConfigSource::Environment);
        }
        if let Ok(flag) = std::env::var("NUTRIPLAN_INCLUDE_MACROS") {
            let include = parse_flag(&flag).ok_or_else(|| {
                ConfigError::InvalidValue("NUTRIPLAN_INCLUDE_MACROS".to_string(), flag.clone())
            })?;
            layout = ConfigValue::new(
                layout.value.with_macros(include),
                ConfigSource::Environment,
            );
        }

        Ok(Self {
            flexible_slots,
            layout,
            extra_keywords,
            config_file,
        })
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules::default().with_flexible_slots(self.flexible_slots.value.clone())
    }

    pub fn category_table(&self) -> CategoryTable {
        CategoryTable::default().with_extra_keywords(&self.extra_keywords.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutriplan/
    /// - macOS: ~/Library/Application Support/nutriplan/
    /// - Windows: %APPDATA%/nutriplan/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutriplan")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Comma separated list, blanks dropped.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
