pub mod commands;
pub mod prompt;
pub mod records;
pub mod serve;

pub use commands::{Cli, Commands};
