//! Validated CRUD over an owner's transactions.

use std::sync::Arc;

use uuid::Uuid;

use momo_domain::{Category, Interval, OwnerId, Service, Transaction};

use crate::{
    storage::RecordStore,
    time::Clock,
    validation::{self, TransactionDraft, TransactionPatch},
    CoreError,
};

/// Narrows a transaction listing. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    pub interval: Interval,
    pub category: Option<Category>,
    pub service: Option<Service>,
    /// Case-insensitive text matched against notes and the category name.
    pub search: Option<String>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            interval: Interval::unbounded(),
            category: None,
            service: None,
            search: None,
        }
    }
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.interval.contains(transaction.date)
            && self.category.map_or(true, |c| transaction.category == c)
            && self.service.map_or(true, |s| transaction.service == s)
            && self.search.as_deref().map_or(true, |term| {
                let term = term.to_lowercase();
                transaction
                    .notes
                    .as_deref()
                    .is_some_and(|notes| notes.to_lowercase().contains(&term))
                    || transaction.category.as_str().to_lowercase().contains(&term)
            })
    }
}

pub struct TransactionService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validates `draft` and records it for `owner`.
    pub fn create(
        &self,
        owner: &OwnerId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, CoreError> {
        let valid = validation::transaction_draft(draft)?;
        let transaction = Transaction::new(
            owner.clone(),
            valid.amount,
            valid.category,
            valid.service,
            valid.date,
            self.clock.now(),
        )
        .with_notes(valid.notes);
        self.store.insert_transaction(&transaction)?;
        tracing::info!(
            owner = %owner,
            id = %transaction.id,
            category = %transaction.category,
            amount = %transaction.amount,
            "transaction recorded"
        );
        Ok(transaction)
    }

    pub fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Transaction, CoreError> {
        self.store
            .transaction(owner, id)?
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// Every transaction for `owner`, newest first.
    pub fn list(&self, owner: &OwnerId) -> Result<Vec<Transaction>, CoreError> {
        tracing::debug!(owner = %owner, "listing transactions");
        self.store.transactions(owner)
    }

    pub fn list_in_range(
        &self,
        owner: &OwnerId,
        interval: Interval,
    ) -> Result<Vec<Transaction>, CoreError> {
        tracing::debug!(owner = %owner, %interval, "listing transactions in range");
        self.store.transactions_in_range(owner, interval)
    }

    pub fn list_by_category(
        &self,
        owner: &OwnerId,
        category: Category,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.store.transactions_by_category(owner, category)
    }

    /// Transactions matching every field of `filter`, newest first.
    pub fn filter(
        &self,
        owner: &OwnerId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, CoreError> {
        tracing::debug!(owner = %owner, interval = %filter.interval, "filtering transactions");
        let mut transactions = self.store.transactions_in_range(owner, filter.interval)?;
        transactions.retain(|txn| filter.matches(txn));
        Ok(transactions)
    }

    /// Applies `patch` to the stored transaction. `id`, `owner_id` and
    /// `created_at` never change.
    pub fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        patch: &TransactionPatch,
    ) -> Result<Transaction, CoreError> {
        let changes = validation::transaction_patch(patch)?;
        let mut transaction = self.get(owner, id)?;
        transaction.apply(changes);
        if !self.store.replace_transaction(&transaction)? {
            return Err(CoreError::TransactionNotFound(id));
        }
        tracing::info!(owner = %owner, id = %id, "transaction updated");
        Ok(transaction)
    }

    pub fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), CoreError> {
        if !self.store.delete_transaction(owner, id)? {
            return Err(CoreError::TransactionNotFound(id));
        }
        tracing::info!(owner = %owner, id = %id, "transaction deleted");
        Ok(())
    }
}
