//! Infrastructure layer: persistence and configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, BootstrapAccount, ConfigError};
pub use store::{ClubStore, InMemoryClubStore, PostgresClubStore, StoreError, StoreResult};
