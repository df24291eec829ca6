use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, money::Amount};

/// A spending guardrail for one category. At most one exists per owner and category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub category: Category,
    pub limit: Amount,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        owner_id: OwnerId,
        category: Category,
        limit: Amount,
        period: BudgetPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category,
            limit,
            period,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: BudgetChanges, now: DateTime<Utc>) {
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(limit) = changes.limit {
            self.limit = limit;
        }
        if let Some(period) = changes.period {
            self.period = period;
        }
        self.touch(now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Validated field updates for a [`Budget`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetChanges {
    pub category: Option<Category>,
    pub limit: Option<Amount>,
    pub period: Option<BudgetPeriod>,
}

impl Owned for Budget {
    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}
