#![doc(test(attr(deny(warnings))))]

//! MoMo Budget tracks mobile-money spending against per-category budgets and
//! derives the dashboard analytics shown by the command shell.
//!
//! The engine lives in the workspace crates re-exported here; this crate adds
//! the shell, formatting and process setup.

pub mod cli;
pub mod currency;
pub mod errors;
pub mod utils;

pub use momo_config as config;
pub use momo_core as core;
pub use momo_domain as domain;
pub use momo_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("MoMo Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
