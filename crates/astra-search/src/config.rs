use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for the completion API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstraConfig {
    pub data_dir: PathBuf,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    /// Base URL of the Generative Language API, without the `/models/...` suffix
    pub endpoint: String,
    /// Left empty to read the key from the environment
    pub api_key: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: usize,
    pub max_output_tokens: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            connect_timeout_secs: 15,
            request_timeout_secs: 120,
        }
    }
}

impl CompletionConfig {
    /// API key from the config file, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|var| std::env::var(var).ok())
    }

    /// Same as [`resolve_api_key`](Self::resolve_api_key) with `lookup` standing
    /// in for the process environment.
    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

impl AstraConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        let completion = &self.completion;
        if completion.model.trim().is_empty() {
            return Err("completion.model must not be empty".into());
        }
        if completion.endpoint.trim().is_empty() {
            return Err("completion.endpoint must not be empty".into());
        }
        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err("completion.temperature must be in [0.0, 2.0]".into());
        }
        if !(completion.top_p > 0.0 && completion.top_p <= 1.0) {
            return Err("completion.top_p must be in (0.0, 1.0]".into());
        }
        if completion.max_output_tokens == 0 {
            return Err("completion.max_output_tokens must be > 0".into());
        }
        if completion.connect_timeout_secs == 0 || completion.request_timeout_secs == 0 {
            return Err("completion timeouts must be > 0".into());
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        #[derive(Deserialize)]
        struct PartialConfig {
            data_dir: Option<PathBuf>,
            #[serde(default)]
            completion: CompletionConfig,
        }

        let partial: PartialConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;

        let config = Self {
            data_dir: partial.data_dir.unwrap_or_else(default_data_dir),
            completion: partial.completion,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("astra-search")
}

impl Default for AstraConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            completion: CompletionConfig::default(),
        }
    }
}
