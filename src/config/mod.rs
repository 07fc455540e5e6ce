//! Configuration module

pub mod loader;
pub mod types;

pub use loader::{load_config, load_keys};
pub use types::{AccountKey, AppConfig, AppSettings, LockedBalances};
