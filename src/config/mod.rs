pub mod credentials;
pub mod parser;
pub mod types;

pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use parser::parse_config;
pub use types::*;
