use std::sync::Arc;
use crate::cli::commands::PromptArgs;
use crate::config::{BenchConfig, EnvCredentials};
use crate::errors::BenchError;
use crate::llm::types::{Prompt, Turn};
use crate::pipeline::{PromptPipeline, RunError};
use tracing::warn;

pub async fn handle_prompt(args: PromptArgs, mut config: BenchConfig) -> Result<(), BenchError> {
    if let Some(db) = args.db {
        config.storage.path = db;
    }

    let prompt = match args.system {
        Some(system) => Prompt::Turns(vec![Turn::system(&system), Turn::user(&args.text)]),
        None => Prompt::Text(args.text),
    };

    let pipeline = PromptPipeline::from_config(&config, Arc::new(EnvCredentials))?;
    match pipeline.run(&args.model, &prompt).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(RunError::Dispatch(e)) => Err(e),
        Err(RunError::Unsaved { record, source }) => {
            // Still show what the model said before reporting the failure.
            warn!("Response was not recorded");
            println!("{}", serde_json::to_string_pretty(&record)?);
            Err(source)
        }
    }
}
