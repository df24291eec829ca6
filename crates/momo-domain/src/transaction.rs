//! Domain model for a recorded mobile-money payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Amount};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub amount: Amount,
    pub category: Category,
    pub service: Service,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Effective timestamp used for every period bucket.
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a record dated at `created_at` unless an explicit `date` is given.
    pub fn new(
        owner_id: OwnerId,
        amount: Amount,
        category: Category,
        service: Service,
        date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            amount,
            category,
            service,
            notes: None,
            date: date.unwrap_or(created_at),
            created_at,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Applies the mutable fields of `patch`; identity and `created_at` never change.
    pub fn apply(&mut self, patch: TransactionChanges) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(service) = patch.service {
            self.service = service;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }
}

/// Validated field updates for a [`Transaction`]. `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub amount: Option<Amount>,
    pub category: Option<Category>,
    pub service: Option<Service>,
    pub notes: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.service.is_none()
            && self.notes.is_none()
            && self.date.is_none()
    }
}

impl Owned for Transaction {
    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}
