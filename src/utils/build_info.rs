//! Version details stamped at compile time.

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("MOMO_BUDGET_COMMIT");
pub const BUILD_DATE: &str = env!("MOMO_BUDGET_BUILD_DATE");
