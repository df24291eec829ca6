use std::collections::HashMap;

use uuid::Uuid;

use momo_domain::{Budget, Category, Interval, OwnerId, Owned, Transaction};

use crate::CoreError;

/// One owner's records read together so aggregates never see a torn view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerSnapshot {
    /// Sorted by `date`, newest first.
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
}

/// Abstraction over persistence backends holding transactions and budgets.
///
/// Every method is scoped to a single owner; no call reads or writes another
/// owner's records.
pub trait RecordStore: Send + Sync {
    /// All transactions for `owner`, newest first.
    fn transactions(&self, owner: &OwnerId) -> Result<Vec<Transaction>, CoreError>;
    fn transaction(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Transaction>, CoreError>;

    fn transactions_in_range(
        &self,
        owner: &OwnerId,
        interval: Interval,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut all = self.transactions(owner)?;
        all.retain(|txn| interval.contains(txn.date));
        Ok(all)
    }

    fn transactions_by_category(
        &self,
        owner: &OwnerId,
        category: Category,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut all = self.transactions(owner)?;
        all.retain(|txn| txn.category == category);
        Ok(all)
    }

    fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError>;
    /// Replaces the stored record with the same id and owner. Returns `false` if none exists.
    fn replace_transaction(&self, transaction: &Transaction) -> Result<bool, CoreError>;
    fn delete_transaction(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError>;

    fn budgets(&self, owner: &OwnerId) -> Result<Vec<Budget>, CoreError>;
    fn budget(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Budget>, CoreError>;

    fn budget_by_category(
        &self,
        owner: &OwnerId,
        category: Category,
    ) -> Result<Option<Budget>, CoreError> {
        Ok(self
            .budgets(owner)?
            .into_iter()
            .find(|budget| budget.category == category))
    }

    /// Fails with [`CoreError::Conflict`] when the owner already has a budget for the category.
    fn insert_budget(&self, budget: &Budget) -> Result<(), CoreError>;
    /// Fails with [`CoreError::Conflict`] when the new category belongs to another budget.
    fn replace_budget(&self, budget: &Budget) -> Result<bool, CoreError>;
    fn delete_budget(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError>;

    /// Transactions and budgets read under a single lock or file read.
    fn snapshot(&self, owner: &OwnerId) -> Result<OwnerSnapshot, CoreError>;
}

/// Orders transactions newest first; ties fall back to creation time.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Error returned when a second budget would share an owner's category.
pub fn duplicate_category_conflict(owner: &OwnerId, category: Category) -> CoreError {
    CoreError::Conflict(format!(
        "owner {owner} already has a budget for {category}"
    ))
}

/// Reports invariant breaches found in loaded data.
pub fn record_warnings(owner: &OwnerId, snapshot: &OwnerSnapshot) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen: HashMap<Category, Uuid> = HashMap::new();

    for budget in &snapshot.budgets {
        if let Some(first) = seen.insert(budget.category, budget.id) {
            warnings.push(format!(
                "budgets {} and {} both cover {}",
                first, budget.id, budget.category
            ));
        }
        if !budget.is_owned_by(owner) {
            warnings.push(format!(
                "budget {} belongs to {} instead of {}",
                budget.id, budget.owner_id, owner
            ));
        }
    }
    for txn in &snapshot.transactions {
        if !txn.is_owned_by(owner) {
            warnings.push(format!(
                "transaction {} belongs to {} instead of {}",
                txn.id, txn.owner_id, owner
            ));
        }
    }
    warnings
}
