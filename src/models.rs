//! Model alias table and backend model discovery.
//!
//! Callers speak in OpenAI model names; the backend expects its own
//! identifiers. [`ModelMap`] is the static lookup between the two, with a
//! fixed fallback so that every requested name maps to some backend model.

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend model used for any caller model not present in the alias table.
pub const DEFAULT_BACKEND_MODEL: &str = "deepseek-ai/deepseek-v3.1-terminus";

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("gpt-3.5-turbo", "meta/llama-3.1-8b-instruct"),
    ("gpt-4", "meta/llama-3.1-70b-instruct"),
    ("gpt-4-turbo", "meta/llama-3.1-405b-instruct"),
    ("gpt-4o", "deepseek-ai/deepseek-v3.1-terminus"),
];

/// Caller-facing model name → backend model id, plus the fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMap {
    #[serde(default = "default_backend_model")]
    pub default: String,
    #[serde(default = "builtin_aliases")]
    pub aliases: HashMap<String, String>,
}

fn default_backend_model() -> String {
    DEFAULT_BACKEND_MODEL.to_string()
}

fn builtin_aliases() -> HashMap<String, String> {
    BUILTIN_ALIASES
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
        .collect()
}

impl Default for ModelMap {
    fn default() -> Self {
        Self {
            default: default_backend_model(),
            aliases: builtin_aliases(),
        }
    }
}

impl ModelMap {
    /// Resolve a requested model to the backend id. Never fails: unknown or
    /// absent names fall back to [`ModelMap::default`].
    #[must_use]
    pub fn resolve(&self, requested: Option<&str>) -> &str {
        requested
            .and_then(|name| self.aliases.get(name))
            .map_or(self.default.as_str(), String::as_str)
    }

    /// Caller-facing names, sorted for stable listings.
    #[must_use]
    pub fn aliases_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// A model entry from an OpenAI-compatible `/models` endpoint.
#[derive(Debug, Deserialize)]
pub struct BackendModel {
    pub id: String,
    pub owned_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BackendModelsResponse {
    pub data: Vec<BackendModel>,
}

/// Fetch the model ids the backend advertises, for picking alias targets.
///
/// # Errors
/// Returns `ProxyError::Backend` if the request fails or the response cannot be parsed.
pub async fn fetch_backend_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<String>> {
    let url = format!("{}/models", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .send()
        .await
        .map_err(|e| ProxyError::backend(format!("Failed to fetch models: {e}")))?;

    let status = response.status().as_u16();
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProxyError::backend(format!(
            "Backend returned status {status} when fetching models: {body}"
        )));
    }

    let parsed: BackendModelsResponse = response
        .json()
        .await
        .map_err(|e| ProxyError::backend(format!("Failed to parse models response: {e}")))?;

    let mut ids: Vec<String> = parsed.data.into_iter().map(|m| m.id).collect();
    ids.sort();
    Ok(ids)
}
