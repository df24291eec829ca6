//! momo-config
//!
//! Persistent user preferences for MoMo Budget.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{default_home, Config, MAX_HISTORY_MONTHS};
