//! SQLite archive and configuration for forged experiential records.

pub mod config;
pub mod error;
pub mod schema;
pub mod store;

pub use config::{RemConfig, StoreConfig, load_config, resolve_config};
pub use error::{Result, StoreError};
pub use store::{RecordStore, RecordSummary, StoreStats};
