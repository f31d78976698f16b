pub mod health;
pub mod interface;
pub mod prompts;
pub mod records;
