// src/core/config_manager.rs
//! Server configuration: `config.yaml` section overridden by environment variables

use crate::cv_analysis::gemini::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::cv_analysis::prompt::DEFAULT_MAX_CV_CHARS;
use crate::environment::EnvironmentConfig;
use crate::utils::BYTES_PER_MB;
use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 200;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://boikanyomz23.appsmith.com",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub server: ServerSettings,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_cv_chars: usize,
    pub max_upload_mb: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

// Keeps the API key out of logs
impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key_configured", &self.api_key_configured())
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            max_cv_chars: DEFAULT_MAX_CV_CHARS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl GeminiSettings {
    pub fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The key, or an error explaining how to provide it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("GEMINI_API_KEY not found in environment variables")
    }
}

impl ConfigManager {
    /// Load `config.yaml` and apply environment variable overrides
    pub fn load() -> Result<Self> {
        let environment = EnvironmentConfig::get_environment();
        let file = EnvironmentConfig::load()?;
        let config = Self::from_sources(environment, file, |key| std::env::var(key).ok())?;

        info!(
            "Configuration loaded: port={}, model={}, origins={}",
            config.server.port,
            config.gemini.model,
            config.server.allowed_origins.join(",")
        );
        Ok(config)
    }

    /// Merge a config file section with variables read through `var`.
    /// Variables win over the file, the file wins over defaults.
    pub fn from_sources<F>(environment: String, file: EnvironmentConfig, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        let defaults = ServerSettings::default();

        let server = ServerSettings {
            port: parse_var(&var, "PORT")?
                .or(file.port)
                .unwrap_or(defaults.port),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|list| split_origins(&list))
                .or(file.allowed_origins)
                .unwrap_or(defaults.allowed_origins),
            max_cv_chars: parse_var(&var, "MAX_CV_CHARS")?
                .or(file.max_cv_chars)
                .unwrap_or(defaults.max_cv_chars),
            max_upload_mb: parse_var(&var, "MAX_UPLOAD_MB")?
                .or(file.max_upload_mb)
                .unwrap_or(defaults.max_upload_mb),
        };

        let gemini = GeminiSettings {
            api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL")
                .or(file.gemini_model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url: var("GEMINI_API_URL")
                .or(file.gemini_api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        Ok(Self {
            environment,
            server,
            gemini,
        })
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} must be a valid number, got {:?}", key, raw))
        })
        .transpose()
}

fn split_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}
