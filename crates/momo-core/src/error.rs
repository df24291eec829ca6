use thiserror::Error;
use uuid::Uuid;

use momo_domain::{AmountError, IntervalError, ParseValueError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<ParseValueError> for CoreError {
    fn from(err: ParseValueError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<AmountError> for CoreError {
    fn from(err: AmountError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<IntervalError> for CoreError {
    fn from(err: IntervalError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}
