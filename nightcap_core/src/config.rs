//! Configuration file support for Nightcap.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nightcap/config.toml`.

use crate::{Error, PatternContext, Profile, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub pattern: PatternConfig,

    #[serde(default)]
    pub plan: PlanConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Nursing parent profile configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub weight_kg: Option<f64>,

    #[serde(default = "default_conservative_factor")]
    pub conservative_factor: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            weight_kg: None,
            conservative_factor: default_conservative_factor(),
        }
    }
}

/// Observed feeding pattern configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_typical_ml_per_feed")]
    pub typical_ml_per_feed: f64,

    #[serde(default)]
    pub evening_cluster: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            typical_ml_per_feed: default_typical_ml_per_feed(),
            evening_cluster: false,
        }
    }
}

/// Plan parameter defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_safety_buffer_min")]
    pub safety_buffer_min: u32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            safety_buffer_min: default_safety_buffer_min(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("nightcap")
}

fn default_conservative_factor() -> f64 {
    1.0
}

fn default_typical_ml_per_feed() -> f64 {
    120.0
}

fn default_safety_buffer_min() -> u32 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("nightcap").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Engine profile derived from this configuration
    pub fn engine_profile(&self) -> Profile {
        Profile {
            weight_kg: self.profile.weight_kg,
            conservative_factor: self.profile.conservative_factor,
        }
    }

    /// Engine pattern context derived from this configuration
    pub fn engine_pattern(&self) -> PatternContext {
        PatternContext {
            typical_ml_per_feed: self.pattern.typical_ml_per_feed,
            evening_cluster: self.pattern.evening_cluster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.profile.weight_kg, None);
        assert_eq!(config.profile.conservative_factor, 1.0);
        assert_eq!(config.pattern.typical_ml_per_feed, 120.0);
        assert_eq!(config.plan.safety_buffer_min, 30);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.profile.weight_kg = Some(63.5);
        config.pattern.evening_cluster = true;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.profile.weight_kg, Some(63.5));
        assert!(parsed.pattern.evening_cluster);
        assert_eq!(
            parsed.plan.safety_buffer_min,
            config.plan.safety_buffer_min
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[profile]
weight_kg = 58.0
conservative_factor = 1.15
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.profile.weight_kg, Some(58.0));
        assert_eq!(config.profile.conservative_factor, 1.15);
        assert_eq!(config.pattern.typical_ml_per_feed, 120.0); // default
    }

    #[test]
    fn test_engine_views_match_config() {
        let mut config = Config::default();
        config.profile.weight_kg = Some(70.0);
        config.pattern.typical_ml_per_feed = 140.0;

        let profile = config.engine_profile();
        assert_eq!(profile.weight_kg, Some(70.0));
        assert!(profile.validate().is_ok());

        let pattern = config.engine_pattern();
        assert_eq!(pattern.typical_ml_per_feed, 140.0);
    }
}
