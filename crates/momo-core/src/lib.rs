//! momo-core
//!
//! Budget and analytics logic for MoMo Budget: period resolution, the
//! aggregation engine, alert evaluation, and the services that feed them.
//! Depends on momo-domain. No CLI, no terminal I/O, no file access.

pub mod aggregation;
pub mod alerts;
pub mod budget_service;
pub mod error;
pub mod memory_store;
pub mod period;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;
pub mod validation;

pub use aggregation::TrendBand;
pub use alerts::AlertThresholds;
pub use budget_service::*;
pub use error::CoreError;
pub use memory_store::MemoryRecordStore;
pub use storage::{OwnerSnapshot, RecordStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction_service::*;
pub use validation::{BudgetDraft, BudgetPatch, TransactionDraft, TransactionPatch};
