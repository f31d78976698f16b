use std::path::Path;
use crate::errors::BenchError;
use crate::llm::catalog::ModelClassifier;
use super::types::BenchConfig;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<BenchConfig, BenchError> {
    if !path.exists() {
        return Err(BenchError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(BenchError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: BenchConfig = if content.trim().is_empty() {
        BenchConfig::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_conflicts(&config)?;

    Ok(config)
}

/// Detect semantic conflicts in the parsed configuration.
pub fn validate_conflicts(config: &BenchConfig) -> Result<(), BenchError> {
    let classifier = ModelClassifier::from_config(config);

    if let Some(rule) = classifier.rules().iter().find(|r| r.prefix.is_empty()) {
        return Err(BenchError::Config(format!(
            "Empty model prefix configured for provider {}",
            rule.kind
        )));
    }

    // A later rule whose prefix starts with an earlier one can never match.
    if let Some((earlier, later)) = classifier.shadowed_rules().first() {
        return Err(BenchError::Config(format!(
            "Model prefix '{}' ({}) is shadowed by earlier prefix '{}' ({})",
            later.prefix, later.kind, earlier.prefix, earlier.kind
        )));
    }

    if config.local.poll_interval_ms == 0 {
        return Err(BenchError::Config("local.poll_interval_ms must be greater than 0".into()));
    }
    if config.local.startup_timeout_secs == 0 {
        return Err(BenchError::Config("local.startup_timeout_secs must be greater than 0".into()));
    }
    if config.providers.request_timeout_secs == 0 {
        return Err(BenchError::Config("providers.request_timeout_secs must be greater than 0".into()));
    }

    if config.local.prefixes.is_empty() {
        warn!("No local model prefixes configured; local models are unreachable");
    }
    if config.providers.max_retries > 5 {
        warn!(max_retries = config.providers.max_retries, "High retry count for provider calls");
    }

    Ok(())
}
