use async_trait::async_trait;
use crate::errors::BenchError;
use super::types::{Prompt, ResponseRecord};

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one completion and normalize it into a record.
    ///
    /// `time_elapsed` on the returned record covers the provider call only.
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> Result<ResponseRecord, BenchError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
