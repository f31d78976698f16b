pub mod manager;
pub mod process;
pub mod server;

pub use manager::{LocalRuntimeManager, RuntimeStatus};
pub use process::{ServerProcess, SystemProcess};
pub use server::{LocalServerApi, OllamaServer};
