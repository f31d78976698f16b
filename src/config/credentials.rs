use std::collections::HashMap;
use tracing::debug;

/// Lookup of provider secrets by variable name.
pub trait CredentialSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment. Empty values count as unset.
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(var = %name, "Resolved credential from environment");
                Some(value)
            }
            _ => {
                debug!(var = %name, "Credential not set");
                None
            }
        }
    }
}

/// Fixed set of credentials, for tests and embedding.
#[derive(Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// Redact sensitive values in a string. Replaces known credential patterns
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}
