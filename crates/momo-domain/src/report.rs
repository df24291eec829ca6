//! Derived, read-only views produced by the aggregation engine.
//!
//! Everything here is computed on demand from transactions and budgets; none
//! of it is persisted.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{budget::Budget, common::*, interval::Interval};

/// Summed spend per category. Categories without spend are absent.
pub type CategoryTotals = BTreeMap<Category, Decimal>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Spend-vs-limit state of one budget within its current period.
pub struct BudgetSummary {
    pub budget: Budget,
    pub interval: Interval,
    pub spent: Decimal,
    /// `limit - spent`; negative once the budget is exceeded.
    pub remaining: Decimal,
    pub is_over_limit: bool,
    /// `spent / limit * 100`, or `None` when the limit is zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<Decimal>,
}

impl BudgetSummary {
    pub fn limit(&self) -> Decimal {
        self.budget.limit.value()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Spend recorded in one calendar month.
pub struct MonthlySpend {
    pub label: String,
    pub interval: Interval,
    pub spent: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Direction of the latest month compared with the one before it.
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
/// Classification of a budget's spend state, ordered from least to most urgent.
pub enum Severity {
    Ok,
    NearLimit,
    OverLimit,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "OK",
            Severity::NearLimit => "Near limit",
            Severity::OverLimit => "Over limit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetAlert {
    pub budget_id: Uuid,
    pub category: Category,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Overall spend compared with the flat sum of every budget limit.
pub struct BudgetOverview {
    pub total_spent: Decimal,
    pub total_budget: Decimal,
    pub remaining: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<Decimal>,
    pub is_over_budget: bool,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// The categories with the most and the least spend.
pub struct CategoryExtremes {
    pub highest: CategoryTotal,
    pub lowest: CategoryTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Dashboard snapshot for the calendar month containing `reference`.
pub struct AnalyticsSummary {
    pub owner_id: OwnerId,
    pub reference: DateTime<Utc>,
    pub interval: Interval,
    pub total_spent: Decimal,
    pub category_totals: CategoryTotals,
    pub budget_summary: Vec<BudgetSummary>,
    pub transaction_count: usize,
    pub total_budget: Decimal,
    pub overview: BudgetOverview,
    pub alerts: Vec<BudgetAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extremes: Option<CategoryExtremes>,
    pub average_daily_spend: Decimal,
    pub days_left: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Per-budget status paired with its alert classification.
pub struct BudgetStatusReport {
    pub reference: DateTime<Utc>,
    pub summaries: Vec<BudgetSummary>,
    pub alerts: Vec<BudgetAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendReport {
    pub reference: DateTime<Utc>,
    /// Most recent month first.
    pub history: Vec<MonthlySpend>,
    pub direction: TrendDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_over_month_change: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// All-time figures shown on the profile page.
pub struct LifetimeStats {
    pub transaction_count: usize,
    pub total_spent: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_transaction_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::Ok < Severity::NearLimit);
        assert!(Severity::NearLimit < Severity::OverLimit);
        assert_eq!(
            serde_json::to_string(&Severity::NearLimit).unwrap(),
            "\"nearLimit\""
        );
    }

    #[test]
    fn category_totals_serialize_with_category_keys() {
        let mut totals = CategoryTotals::new();
        totals.insert(Category::Food, dec!(120.00));
        totals.insert(Category::Airtime, dec!(5.00));
        let json = serde_json::to_string(&totals).unwrap();
        assert_eq!(json, r#"{"Food":"120.00","Airtime":"5.00"}"#);
    }
}
