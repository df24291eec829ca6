use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use momo_domain::{Budget, OwnerId, Owned, Transaction};

use crate::{
    storage::{duplicate_category_conflict, sort_newest_first, OwnerSnapshot, RecordStore},
    CoreError,
};

#[derive(Debug, Default, Clone)]
struct OwnerRecords {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
}

/// Keeps every owner's records in process memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    owners: RwLock<HashMap<OwnerId, OwnerRecords>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<OwnerId, OwnerRecords>>, CoreError> {
        self.owners
            .read()
            .map_err(|_| CoreError::Storage("record store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<OwnerId, OwnerRecords>>, CoreError> {
        self.owners
            .write()
            .map_err(|_| CoreError::Storage("record store lock poisoned".into()))
    }

    fn with_owner<T>(
        &self,
        owner: &OwnerId,
        f: impl FnOnce(Option<&OwnerRecords>) -> T,
    ) -> Result<T, CoreError> {
        let guard = self.read()?;
        Ok(f(guard.get(owner)))
    }
}

impl RecordStore for MemoryRecordStore {
    fn transactions(&self, owner: &OwnerId) -> Result<Vec<Transaction>, CoreError> {
        let mut list = self.with_owner(owner, |records| {
            records
                .map(|r| r.transactions.clone())
                .unwrap_or_default()
        })?;
        sort_newest_first(&mut list);
        Ok(list)
    }

    fn transaction(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Transaction>, CoreError> {
        self.with_owner(owner, |records| {
            records.and_then(|r| r.transactions.iter().find(|t| t.id == id).cloned())
        })
    }

    fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        let mut guard = self.write()?;
        let records = guard.entry(transaction.owner_id.clone()).or_default();
        if records.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(CoreError::Conflict(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        records.transactions.push(transaction.clone());
        Ok(())
    }

    fn replace_transaction(&self, transaction: &Transaction) -> Result<bool, CoreError> {
        let mut guard = self.write()?;
        let slot = guard
            .get_mut(transaction.owner_id())
            .and_then(|r| r.transactions.iter_mut().find(|t| t.id == transaction.id));
        match slot {
            Some(existing) => {
                *existing = transaction.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_transaction(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError> {
        let mut guard = self.write()?;
        let Some(records) = guard.get_mut(owner) else {
            return Ok(false);
        };
        let before = records.transactions.len();
        records.transactions.retain(|t| t.id != id);
        Ok(records.transactions.len() != before)
    }

    fn budgets(&self, owner: &OwnerId) -> Result<Vec<Budget>, CoreError> {
        self.with_owner(owner, |records| {
            records.map(|r| r.budgets.clone()).unwrap_or_default()
        })
    }

    fn budget(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Budget>, CoreError> {
        self.with_owner(owner, |records| {
            records.and_then(|r| r.budgets.iter().find(|b| b.id == id).cloned())
        })
    }

    fn insert_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        let mut guard = self.write()?;
        let records = guard.entry(budget.owner_id.clone()).or_default();
        if records.budgets.iter().any(|b| b.category == budget.category) {
            return Err(duplicate_category_conflict(&budget.owner_id, budget.category));
        }
        records.budgets.push(budget.clone());
        Ok(())
    }

    fn replace_budget(&self, budget: &Budget) -> Result<bool, CoreError> {
        let mut guard = self.write()?;
        let Some(records) = guard.get_mut(budget.owner_id()) else {
            return Ok(false);
        };
        if records
            .budgets
            .iter()
            .any(|b| b.category == budget.category && b.id != budget.id)
        {
            return Err(duplicate_category_conflict(&budget.owner_id, budget.category));
        }
        match records.budgets.iter_mut().find(|b| b.id == budget.id) {
            Some(existing) => {
                *existing = budget.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_budget(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError> {
        let mut guard = self.write()?;
        let Some(records) = guard.get_mut(owner) else {
            return Ok(false);
        };
        let before = records.budgets.len();
        records.budgets.retain(|b| b.id != id);
        Ok(records.budgets.len() != before)
    }

    fn snapshot(&self, owner: &OwnerId) -> Result<OwnerSnapshot, CoreError> {
        let mut snapshot = self.with_owner(owner, |records| {
            records
                .map(|r| OwnerSnapshot {
                    transactions: r.transactions.clone(),
                    budgets: r.budgets.clone(),
                })
                .unwrap_or_default()
        })?;
        sort_newest_first(&mut snapshot.transactions);
        Ok(snapshot)
    }
}
