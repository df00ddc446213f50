//! Live schema lookups and statement execution.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::{Database, KeyScan, KeyStream};
pub use options::DbOptions;
pub use postgres::PostgresDatabase;
