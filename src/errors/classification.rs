use super::types::BenchError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl BenchError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transient provider failures
            BenchError::RateLimit(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            BenchError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            BenchError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            BenchError::LLMApi(_) => ErrorClassification {
                error_type: "LLMApiError",
                retryable: true,
            },

            // Caller or operator has to fix something first
            BenchError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            BenchError::ModelNotFound(_) => ErrorClassification {
                error_type: "ModelNotFoundError",
                retryable: false,
            },
            BenchError::MissingCredential(_) => ErrorClassification {
                error_type: "MissingCredentialError",
                retryable: false,
            },
            BenchError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            BenchError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                retryable: false,
            },
            BenchError::LocalRuntime(_) => ErrorClassification {
                error_type: "LocalRuntimeError",
                retryable: false,
            },
            BenchError::Persistence(_) => ErrorClassification {
                error_type: "PersistenceError",
                retryable: false,
            },
            BenchError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            BenchError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            BenchError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            BenchError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
