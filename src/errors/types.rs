use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Validation(String),

    #[error("Model not found {0}")]
    ModelNotFound(String),

    #[error("Key not found in env: {0}")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Local runtime error: {0}")]
    LocalRuntime(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchError {
    /// Map a reqwest transport failure onto the matching variant.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BenchError::Timeout(format!("{} request timed out: {}", provider, err))
        } else {
            BenchError::Network(format!("{} request failed: {}", provider, err))
        }
    }
}
