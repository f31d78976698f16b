pub mod provider;
pub mod anthropic;
pub mod openai;
pub mod ollama;
pub mod router;
pub mod types;
pub mod catalog;

pub use catalog::ProviderKind;
pub use provider::LLMProvider;
pub use router::ModelRouter;
pub use types::{Prompt, ResponseRecord, Role, Turn};
