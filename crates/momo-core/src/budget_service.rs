//! Budget management, including the one-budget-per-category upsert.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use uuid::Uuid;

use momo_domain::{Budget, BudgetChanges, BudgetPeriod, Category, OwnerId};

use crate::{
    storage::RecordStore,
    time::Clock,
    validation::{self, BudgetDraft, BudgetPatch, ValidBudget},
    CoreError,
};

pub struct BudgetService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    default_period: BudgetPeriod,
    /// Serialises budget writes per owner. Only owners with a write in flight
    /// keep an entry; idle ones are pruned after every write.
    owner_locks: Mutex<HashMap<OwnerId, Arc<Mutex<()>>>>,
}

impl BudgetService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_period: BudgetPeriod::default(),
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Period given to new budgets whose draft names none.
    pub fn with_default_period(mut self, period: BudgetPeriod) -> Self {
        self.default_period = period;
        self
    }

    /// Creates the budget for the draft's category, or updates the existing
    /// one in place. A draft without a period keeps the existing period.
    pub fn set(&self, owner: &OwnerId, draft: &BudgetDraft) -> Result<Budget, CoreError> {
        let valid = validation::budget_draft(draft)?;
        self.with_owner_lock(owner, || {
            if let Some(existing) = self.store.budget_by_category(owner, valid.category)? {
                return self.overwrite(existing, valid);
            }

            let budget = Budget::new(
                owner.clone(),
                valid.category,
                valid.limit,
                valid.period.unwrap_or(self.default_period),
                self.clock.now(),
            );
            match self.store.insert_budget(&budget) {
                Ok(()) => {
                    tracing::info!(
                        owner = %owner,
                        category = %budget.category,
                        limit = %budget.limit,
                        period = %budget.period,
                        "budget created"
                    );
                    Ok(budget)
                }
                Err(CoreError::Conflict(reason)) => {
                    // Another process sharing the store got there first; update its row.
                    tracing::warn!(owner = %owner, %reason, "budget insert raced, updating instead");
                    let existing = self
                        .store
                        .budget_by_category(owner, valid.category)?
                        .ok_or(CoreError::Conflict(reason))?;
                    self.overwrite(existing, valid)
                }
                Err(err) => Err(err),
            }
        })
    }

    fn overwrite(&self, mut budget: Budget, valid: ValidBudget) -> Result<Budget, CoreError> {
        budget.apply(
            BudgetChanges {
                category: None,
                limit: Some(valid.limit),
                period: valid.period,
            },
            self.clock.now(),
        );
        if !self.store.replace_budget(&budget)? {
            return Err(CoreError::BudgetNotFound(budget.id));
        }
        tracing::info!(
            owner = %budget.owner_id,
            category = %budget.category,
            limit = %budget.limit,
            period = %budget.period,
            "budget updated"
        );
        Ok(budget)
    }

    pub fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Budget, CoreError> {
        self.store
            .budget(owner, id)?
            .ok_or(CoreError::BudgetNotFound(id))
    }

    pub fn list(&self, owner: &OwnerId) -> Result<Vec<Budget>, CoreError> {
        self.store.budgets(owner)
    }

    /// Applies `patch`; moving a budget onto a category that already has one
    /// fails with [`CoreError::Conflict`].
    pub fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        patch: &BudgetPatch,
    ) -> Result<Budget, CoreError> {
        let changes = validation::budget_patch(patch)?;
        self.with_owner_lock(owner, || {
            let mut budget = self.get(owner, id)?;
            budget.apply(changes, self.clock.now());
            if !self.store.replace_budget(&budget)? {
                return Err(CoreError::BudgetNotFound(id));
            }
            tracing::info!(owner = %owner, id = %id, "budget updated");
            Ok(budget)
        })
    }

    pub fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), CoreError> {
        self.with_owner_lock(owner, || self.remove(owner, id))
    }

    /// Removes the budget for `category`, returning it if one existed.
    pub fn delete_by_category(
        &self,
        owner: &OwnerId,
        category: Category,
    ) -> Result<Option<Budget>, CoreError> {
        self.with_owner_lock(owner, || {
            let Some(budget) = self.store.budget_by_category(owner, category)? else {
                return Ok(None);
            };
            self.remove(owner, budget.id)?;
            Ok(Some(budget))
        })
    }

    fn remove(&self, owner: &OwnerId, id: Uuid) -> Result<(), CoreError> {
        if !self.store.delete_budget(owner, id)? {
            return Err(CoreError::BudgetNotFound(id));
        }
        tracing::info!(owner = %owner, id = %id, "budget deleted");
        Ok(())
    }

    fn with_owner_lock<T>(
        &self,
        owner: &OwnerId,
        write: impl FnOnce() -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let lock = self.owner_lock(owner)?;
        let result = match lock.lock() {
            Ok(_guard) => write(),
            Err(_) => Err(CoreError::Storage("budget lock poisoned".into())),
        };
        drop(lock);
        self.prune_idle_locks();
        result
    }

    fn owner_lock(&self, owner: &OwnerId) -> Result<Arc<Mutex<()>>, CoreError> {
        let mut locks = self
            .owner_locks
            .lock()
            .map_err(|_| CoreError::Storage("budget lock table poisoned".into()))?;
        Ok(locks.entry(owner.clone()).or_default().clone())
    }

    fn prune_idle_locks(&self) {
        if let Ok(mut locks) = self.owner_locks.lock() {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_owner_locks(&self) -> usize {
        self.owner_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}
