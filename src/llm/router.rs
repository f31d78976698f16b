use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use crate::config::{BenchConfig, CredentialSource};
use crate::config::credentials::redact_credentials;
use crate::errors::{with_retry, BenchError, RetryConfig};
use crate::runtime::LocalRuntimeManager;
use super::anthropic::AnthropicProvider;
use super::catalog::{ModelClassifier, ProviderKind};
use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;
use super::provider::LLMProvider;
use super::types::{Prompt, ResponseRecord};

struct Route {
    provider: Arc<dyn LLMProvider>,
    api_key_env: Option<String>,
}

/// Classifies a model identifier into one provider kind and runs the
/// matching adapter.
pub struct ModelRouter {
    classifier: ModelClassifier,
    credentials: Arc<dyn CredentialSource>,
    routes: HashMap<ProviderKind, Route>,
    runtime: Arc<LocalRuntimeManager>,
    retry: RetryConfig,
}

impl ModelRouter {
    pub fn new(
        classifier: ModelClassifier,
        credentials: Arc<dyn CredentialSource>,
        runtime: Arc<LocalRuntimeManager>,
    ) -> Self {
        Self {
            classifier,
            credentials,
            routes: HashMap::new(),
            runtime,
            retry: RetryConfig::default(),
        }
    }

    /// Register the adapter for `kind`. Hosted kinds name the variable their
    /// credential is read from; the local kind passes `None`.
    pub fn route(mut self, kind: ProviderKind, provider: Arc<dyn LLMProvider>, api_key_env: Option<&str>) -> Self {
        self.routes.insert(kind, Route {
            provider,
            api_key_env: api_key_env.map(|s| s.to_string()),
        });
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_config(config: &BenchConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self, BenchError> {
        let timeout = Duration::from_secs(config.providers.request_timeout_secs);
        let providers = &config.providers;

        let base_url = |kind: ProviderKind, configured: &Option<String>| {
            configured.clone().unwrap_or_else(|| kind.info().base_url.to_string())
        };
        let key_env = |kind: ProviderKind, configured: &Option<String>| {
            configured.clone().unwrap_or_else(|| kind.info().env_var.to_string())
        };

        let openai = OpenAIProvider::with_base_url(
            "openai",
            &base_url(ProviderKind::OpenAI, &providers.openai.base_url),
            timeout,
        )?;
        let anthropic = AnthropicProvider::with_base_url(
            &base_url(ProviderKind::Anthropic, &providers.anthropic.base_url),
            timeout,
        )?;
        let gemini = OpenAIProvider::with_base_url(
            "gemini",
            &base_url(ProviderKind::Gemini, &providers.gemini.base_url),
            timeout,
        )?;
        let local = OllamaProvider::new(
            &config.local.endpoint,
            Duration::from_secs(config.local.request_timeout_secs),
        )?;
        let runtime = Arc::new(LocalRuntimeManager::from_config(&config.local)?);

        Ok(Self::new(ModelClassifier::from_config(config), credentials, runtime)
            .route(ProviderKind::OpenAI, Arc::new(openai), Some(key_env(ProviderKind::OpenAI, &providers.openai.api_key_env).as_str()))
            .route(ProviderKind::Anthropic, Arc::new(anthropic), Some(key_env(ProviderKind::Anthropic, &providers.anthropic.api_key_env).as_str()))
            .route(ProviderKind::Gemini, Arc::new(gemini), Some(key_env(ProviderKind::Gemini, &providers.gemini.api_key_env).as_str()))
            .route(ProviderKind::Local, Arc::new(local), None)
            .with_retry(RetryConfig { max_retries: providers.max_retries }))
    }

    pub fn classify(&self, model: &str) -> Option<ProviderKind> {
        self.classifier.classify(model)
    }

    /// Classify, resolve the credential, then call the adapter. Unknown models
    /// and missing credentials fail before any network or process call.
    pub async fn dispatch(&self, model: &str, prompt: &Prompt) -> Result<ResponseRecord, BenchError> {
        if model.is_empty() {
            return Err(BenchError::Validation("No model provided".into()));
        }
        if prompt.is_empty() {
            return Err(BenchError::Validation("No prompt provided".into()));
        }

        let kind = self.classifier
            .classify(model)
            .ok_or_else(|| BenchError::ModelNotFound(model.to_string()))?;

        let route = self.routes
            .get(&kind)
            .ok_or_else(|| BenchError::Config(format!("No adapter registered for provider {}", kind)))?;

        let api_key = match &route.api_key_env {
            Some(var) => Some(
                self.credentials
                    .get(var)
                    .ok_or_else(|| BenchError::MissingCredential(var.clone()))?,
            ),
            None => None,
        };

        let span = info_span!("dispatch", model, provider = %kind);
        let result = async {
            if kind == ProviderKind::Local {
                self.runtime.ensure_ready(model).await?;
                route.provider.complete(model, prompt, None).await
            } else {
                let operation = format!("{} completion", route.provider.provider_name());
                with_retry(&operation, &self.retry, || {
                    route.provider.complete(model, prompt, api_key.as_deref())
                })
                .await
            }
        }
        .instrument(span)
        .await;

        match &result {
            Ok(record) => info!(
                model,
                provider = %kind,
                time_elapsed = record.time_elapsed,
                "Completion succeeded"
            ),
            Err(e) => {
                let secrets: Vec<&str> = api_key.iter().map(|k| k.as_str()).collect();
                warn!(
                    model,
                    provider = %kind,
                    error_type = e.classify().error_type,
                    error = %redact_credentials(&e.to_string(), &secrets),
                    "Completion failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticCredentials;
    use crate::llm::types::Turn;
    use crate::runtime::manager::tests::fake_runtime;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call it receives and echoes a canned answer.
    struct StubProvider {
        name: &'static str,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StubProvider {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, calls: Mutex::new(Vec::new()) })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LLMProvider for StubProvider {
        async fn complete(&self, model: &str, prompt: &Prompt, api_key: Option<&str>) -> Result<ResponseRecord, BenchError> {
            self.calls.lock().unwrap().push((model.to_string(), api_key.map(|k| k.to_string())));
            Ok(ResponseRecord::new(model, prompt, format!("from {}", self.name), Duration::from_millis(3)))
        }

        fn provider_name(&self) -> &str { self.name }
    }

    struct Harness {
        router: ModelRouter,
        openai: Arc<StubProvider>,
        anthropic: Arc<StubProvider>,
        gemini: Arc<StubProvider>,
        local: Arc<StubProvider>,
        events: crate::runtime::manager::tests::EventLog,
    }

    fn harness(credentials: StaticCredentials, local_running: bool) -> Harness {
        let mut config = BenchConfig::default();
        config.local.prefixes = vec!["local-family".into(), "llama".into()];

        let (runtime, _, events) = fake_runtime(local_running, &[], false);
        let openai = StubProvider::new("openai");
        let anthropic = StubProvider::new("anthropic");
        let gemini = StubProvider::new("gemini");
        let local = StubProvider::new("local");

        let router = ModelRouter::new(ModelClassifier::from_config(&config), Arc::new(credentials), Arc::new(runtime))
            .route(ProviderKind::OpenAI, openai.clone(), Some("OPENAI_API_KEY"))
            .route(ProviderKind::Anthropic, anthropic.clone(), Some("ANTHROPIC_API_KEY"))
            .route(ProviderKind::Gemini, gemini.clone(), Some("GEMINI_API_KEY"))
            .route(ProviderKind::Local, local.clone(), None);

        Harness { router, openai, anthropic, gemini, local, events }
    }

    fn all_keys() -> StaticCredentials {
        StaticCredentials::new()
            .with("OPENAI_API_KEY", "sk-openai")
            .with("ANTHROPIC_API_KEY", "sk-anthropic")
            .with("GEMINI_API_KEY", "sk-gemini")
    }

    fn hi() -> Prompt {
        Prompt::Turns(vec![Turn::user("hi")])
    }

    #[tokio::test]
    async fn test_each_hosted_prefix_invokes_exactly_one_adapter() {
        for (model, expected) in [("gpt-4o", "openai"), ("claude-3-5-haiku", "anthropic"), ("gemini-2.5-flash", "gemini")] {
            let h = harness(all_keys(), true);
            let record = h.router.dispatch(model, &hi()).await.unwrap();
            assert_eq!(record.response, format!("from {}", expected));

            let counts = [h.openai.call_count(), h.anthropic.call_count(), h.gemini.call_count(), h.local.call_count()];
            assert_eq!(counts.iter().sum::<usize>(), 1, "model {}", model);
            assert!(h.events.lock().unwrap().is_empty(), "hosted model touched the local runtime");
        }
    }

    #[tokio::test]
    async fn test_hosted_adapter_receives_resolved_key() {
        let h = harness(all_keys(), true);
        h.router.dispatch("claude-3-opus", &hi()).await.unwrap();
        let calls = h.anthropic.calls.lock().unwrap();
        assert_eq!(calls[0], ("claude-3-opus".to_string(), Some("sk-anthropic".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_model_has_no_side_effects() {
        let h = harness(all_keys(), false);
        let err = h.router.dispatch("unknown-model-x", &hi()).await.unwrap_err();
        assert_eq!(err.to_string(), "Model not found unknown-model-x");
        assert_eq!(h.openai.call_count() + h.anthropic.call_count() + h.gemini.call_count() + h.local.call_count(), 0);
        assert!(h.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let h = harness(StaticCredentials::new(), true);
        let err = h.router.dispatch("gpt-4o", &hi()).await.unwrap_err();
        assert!(matches!(err, BenchError::MissingCredential(ref var) if var == "OPENAI_API_KEY"));
        assert_eq!(h.openai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_local_model_needs_no_credential_and_runs_lifecycle_first() {
        let h = harness(StaticCredentials::new(), false);
        let record = h.router.dispatch("local-family-7b", &hi()).await.unwrap();
        assert_eq!(record.response, "from local");

        let events = h.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("probe"));
        assert!(events.contains(&"spawn".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("pull:local-family-7b"));
        assert_eq!(h.local.calls.lock().unwrap()[0].1, None);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let h = harness(all_keys(), true);
        let err = h.router.dispatch("", &hi()).await.unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
        let err = h.router.dispatch("gpt-4o", &Prompt::Turns(vec![])).await.unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
        assert_eq!(h.openai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_config_error() {
        let (runtime, _, _) = fake_runtime(true, &[], false);
        let router = ModelRouter::new(
            ModelClassifier::from_config(&BenchConfig::default()),
            Arc::new(all_keys()),
            Arc::new(runtime),
        );
        let err = router.dispatch("gpt-4o", &hi()).await.unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_from_config_builds_all_routes() {
        let router = ModelRouter::from_config(&BenchConfig::default(), Arc::new(StaticCredentials::new())).unwrap();
        assert_eq!(router.routes.len(), 4);
        assert!(router.routes[&ProviderKind::Local].api_key_env.is_none());
        assert_eq!(router.routes[&ProviderKind::Gemini].api_key_env.as_deref(), Some("GEMINI_API_KEY"));
        assert_eq!(router.classify("gemini-pro"), Some(ProviderKind::Gemini));
    }
}
