//! Built-in backend presets for OpenAI-compatible chat-completion providers.
//!
//! Each preset defines the base URL, a human-readable label used in error
//! envelopes, and the environment variable the API key is read from. Users
//! name a backend in their config and the preset fills in the details.

/// A known OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct BackendPreset {
    pub name: &'static str,
    pub label: &'static str,
    pub base_url: &'static str,
    pub default_api_key_env: &'static str,
}

/// The backend used when no config file names one.
pub const DEFAULT_BACKEND: &str = "nvidia";

const PRESETS: &[BackendPreset] = &[
    BackendPreset {
        name: "nvidia",
        label: "NVIDIA",
        base_url: "https://integrate.api.nvidia.com/v1",
        default_api_key_env: "NVIDIA_API_KEY",
    },
    BackendPreset {
        name: "openrouter",
        label: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        default_api_key_env: "OPENROUTER_API_KEY",
    },
    BackendPreset {
        name: "fireworks",
        label: "Fireworks",
        base_url: "https://api.fireworks.ai/inference/v1",
        default_api_key_env: "FIREWORKS_API_KEY",
    },
    BackendPreset {
        name: "together",
        label: "Together",
        base_url: "https://api.together.xyz/v1",
        default_api_key_env: "TOGETHER_API_KEY",
    },
    BackendPreset {
        name: "groq",
        label: "Groq",
        base_url: "https://api.groq.com/openai/v1",
        default_api_key_env: "GROQ_API_KEY",
    },
    BackendPreset {
        name: "deepseek",
        label: "DeepSeek",
        base_url: "https://api.deepseek.com/v1",
        default_api_key_env: "DEEPSEEK_API_KEY",
    },
];

impl BackendPreset {
    #[must_use]
    pub fn from_name(name: &str) -> Option<&'static BackendPreset> {
        let name = name.to_lowercase();
        PRESETS.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn all() -> &'static [BackendPreset] {
        PRESETS
    }
}
