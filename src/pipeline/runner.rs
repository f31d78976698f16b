use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{BenchConfig, CredentialSource, PersistencePolicy};
use crate::db::{Database, RecordStore};
use crate::errors::BenchError;
use crate::llm::router::ModelRouter;
use crate::llm::types::{Prompt, ResponseRecord};

#[derive(Debug, Error)]
pub enum RunError {
    /// Nothing was produced, so nothing was recorded.
    #[error(transparent)]
    Dispatch(#[from] BenchError),

    /// The completion succeeded but its row could not be written.
    #[error("{source}")]
    Unsaved {
        record: ResponseRecord,
        source: BenchError,
    },
}

/// Dispatch a prompt, then append the resulting record.
pub struct PromptPipeline {
    router: ModelRouter,
    store: Arc<dyn RecordStore>,
    policy: PersistencePolicy,
}

impl PromptPipeline {
    pub fn new(router: ModelRouter, store: Arc<dyn RecordStore>, policy: PersistencePolicy) -> Self {
        Self { router, store, policy }
    }

    pub fn from_config(config: &BenchConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self, BenchError> {
        let router = ModelRouter::from_config(config, credentials)?;
        let store = Arc::new(Database::new(&config.storage.path)?);
        Ok(Self::new(router, store, config.storage.on_failure))
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    pub async fn run(&self, model: &str, prompt: &Prompt) -> Result<ResponseRecord, RunError> {
        self.run_with(model, prompt, |text| text).await
    }

    /// Like `run`, with `post` applied to the response text before it is stored.
    pub async fn run_with<F>(&self, model: &str, prompt: &Prompt, post: F) -> Result<ResponseRecord, RunError>
    where
        F: FnOnce(String) -> String,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("prompt", request_id = %request_id, model);

        async move {
            let mut record = self.router.dispatch(model, prompt).await?;
            record.response = post(record.response);

            let store = self.store.clone();
            let row = record.clone();
            let appended = tokio::task::spawn_blocking(move || store.append(&row))
                .await
                .map_err(|e| BenchError::Internal(format!("Record task failed: {}", e)))
                .and_then(|result| result);

            match appended {
                Ok(id) => {
                    debug!(row_id = id, "Record appended");
                    info!(time_elapsed = record.time_elapsed, "Prompt completed");
                    Ok(record)
                }
                Err(e) => match self.policy {
                    PersistencePolicy::Fail => Err(RunError::Unsaved { record, source: e }),
                    PersistencePolicy::Warn => {
                        warn!(error = %e, "Failed to record response, returning it anyway");
                        Ok(record)
                    }
                },
            }
        }
        .instrument(span)
        .await
    }
}
