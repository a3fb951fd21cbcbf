use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsSettings,
    pub sweep: SweepSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSettings {
    pub region: String,
    /// Named credential profile (applied before any client is constructed)
    pub profile: Option<String>,
    /// Shared credentials file, tilde-expanded and exported as
    /// AWS_SHARED_CREDENTIALS_FILE before the SDK config is loaded
    pub shared_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Tag filter: each entry becomes one `tag:<key>` clause with one value
    pub tags: BTreeMap<String, String>,
    /// Instances whose root volume is at least this old are stopped
    pub max_root_volume_age_hours: i64,
    /// Report what would be stopped without issuing stop calls
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), "dev".to_string());
        tags.insert("lifecycle".to_string(), "temporary".to_string());

        Self {
            aws: AwsSettings {
                region: "us-east-1".to_string(),
                profile: Some("ec2_lifecycle".to_string()),
                shared_credentials_file: Some(PathBuf::from("~/.aws/credentials")),
            },
            sweep: SweepSettings {
                tags,
                max_root_volume_age_hours: 24,
                dry_run: false,
            },
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .lifecyclectl.toml in current dir, then ~/.config/lifecyclectl/config.toml
            let local = PathBuf::from(".lifecyclectl.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("lifecyclectl").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".lifecyclectl.toml"))
            }
        };

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
            config
        } else {
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'lifecyclectl init' to create a config file.");
            }
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Check config invariants that TOML parsing alone cannot enforce
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.sweep.tags.is_empty() {
            return Err(ConfigError::MissingField("sweep.tags".to_string()));
        }

        if self.sweep.max_root_volume_age_hours < 1 {
            return Err(ConfigError::InvalidValue {
                field: "sweep.max_root_volume_age_hours".to_string(),
                reason: format!(
                    "must be at least 1 hour, got {}",
                    self.sweep.max_root_volume_age_hours
                ),
            });
        }

        if self.aws.region.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "aws.region".to_string(),
                reason: "region cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
