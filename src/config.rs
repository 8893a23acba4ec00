use crate::error::{ProxyError, Result};
use crate::models::ModelMap;
use crate::providers::{BackendPreset, DEFAULT_BACKEND};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub models: ModelMap,
    #[serde(default)]
    pub defaults: RequestDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_name")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

/// Values applied to inbound fields the caller left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default)]
    pub stream: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_backend_name() -> String {
    DEFAULT_BACKEND.to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u64 {
    1024
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            backend: BackendConfig::default(),
            models: ModelMap::default(),
            defaults: RequestDefaults::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            base_url: None,
            api_key_env: None,
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stream: false,
        }
    }
}

impl ProxyConfig {
    /// Load config from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir > built-in defaults
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in &config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        tracing::info!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    fn preset(&self) -> Option<&'static BackendPreset> {
        BackendPreset::from_name(&self.backend.name)
    }

    /// Resolve the effective base URL (config override or preset default)
    pub fn effective_base_url(&self) -> Result<String> {
        if let Some(ref url) = self.backend.base_url {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let preset = self.preset().ok_or_else(|| {
            ProxyError::config(format!(
                "Unknown backend '{}' and no base_url configured. Known backends: {}",
                self.backend.name,
                BackendPreset::all()
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        Ok(preset.base_url.to_string())
    }

    /// Name of the environment variable holding the backend credential.
    pub fn api_key_env(&self) -> String {
        if let Some(ref env) = self.backend.api_key_env {
            return env.clone();
        }
        self.preset()
            .map_or("API_KEY", |p| p.default_api_key_env)
            .to_string()
    }

    /// Resolve the API key from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        let env = self.api_key_env();
        match std::env::var(&env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ProxyError::config(format!(
                "Environment variable '{env}' not set. Set it with your backend API key."
            ))),
        }
    }

    /// Label used in caller-facing error envelopes, e.g. "NVIDIA".
    pub fn backend_label(&self) -> String {
        self.preset()
            .map_or_else(|| self.backend.name.clone(), |p| p.label.to_string())
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // CWD
    paths.push(PathBuf::from("nim-proxy.toml"));

    // XDG / platform config dir
    if cfg!(target_os = "macos") {
        if let Some(home) = home_dir() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join("nim-proxy")
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("nim-proxy").join("config.toml"));
        }
        if let Some(home) = home_dir() {
            paths.push(home.join(".config").join("nim-proxy").join("config.toml"));
        }
    }

    // Home directory fallback
    if let Some(home) = home_dir() {
        paths.push(home.join(".nim-proxy.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
