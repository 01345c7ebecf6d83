//! Data models.

pub mod config;
pub mod record;

pub use config::PoLedgerConfig;
pub use record::{Column, Record, Supplement};
