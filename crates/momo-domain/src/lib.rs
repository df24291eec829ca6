//! momo-domain
//!
//! Pure domain models for mobile-money spending (transactions, budgets,
//! periods, and the report shapes derived from them).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod budget;
pub mod common;
pub mod interval;
pub mod money;
pub mod report;
pub mod transaction;

pub use budget::*;
pub use common::*;
pub use interval::*;
pub use money::*;
pub use report::*;
pub use transaction::*;
