pub mod connection;
pub mod records;
pub mod schema;

pub use connection::Database;
pub use records::{RecordStore, StoredRecord};
