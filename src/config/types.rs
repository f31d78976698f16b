use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BenchConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub local: LocalRuntimeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub on_failure: PersistencePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/promptbench.db".to_string(),
            on_failure: PersistencePolicy::default(),
        }
    }
}

/// What to do when a completion succeeded but its record could not be saved.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePolicy {
    /// Fail the request and hand the unsaved record back with the error.
    #[default]
    Fail,
    /// Log and return the record as a normal success.
    Warn,
}

impl PersistencePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Warn => "warn",
        }
    }
}

impl std::fmt::Display for PersistencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: HostedProviderConfig,
    pub anthropic: HostedProviderConfig,
    pub gemini: HostedProviderConfig,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: HostedProviderConfig::default(),
            anthropic: HostedProviderConfig::default(),
            gemini: HostedProviderConfig::default(),
            request_timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Overrides for one hosted provider. Unset fields fall back to the catalog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HostedProviderConfig {
    pub prefix: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalRuntimeConfig {
    pub prefixes: Vec<String>,
    pub endpoint: String,
    pub binary: String,
    pub poll_interval_ms: u64,
    pub startup_timeout_secs: u64,
    pub pull_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for LocalRuntimeConfig {
    fn default() -> Self {
        Self {
            prefixes: ["llama", "mistral", "gemma", "qwen", "phi", "deepseek", "codellama"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            endpoint: "http://localhost:11434".to_string(),
            binary: "ollama".to_string(),
            poll_interval_ms: 100,
            startup_timeout_secs: 10,
            pull_timeout_secs: 1800,
            request_timeout_secs: 600,
        }
    }
}
