// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE: &str = "config.yaml";

/// One section of `config.yaml`. Every field is optional; environment
/// variables and built-in defaults fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub port: Option<u16>,
    pub gemini_model: Option<String>,
    pub gemini_api_url: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub max_cv_chars: Option<usize>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load the section for the current environment from `config.yaml` in
    /// the working directory. A missing file yields an empty section.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        Self::load_from_file(Path::new(CONFIG_FILE), &environment)
    }

    pub fn get_environment() -> String {
        std::env::var("MUSECAREER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "{} not found, using environment variables and defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_yaml_str(&config_content, environment)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }
}
