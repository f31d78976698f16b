pub mod runner;

pub use runner::{PromptPipeline, RunError};
