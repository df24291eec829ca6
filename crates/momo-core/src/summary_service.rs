//! Read-side service that fetches a consistent snapshot and runs the
//! aggregation engine and alert evaluator over it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use momo_domain::{
    AnalyticsSummary, BudgetStatusReport, LifetimeStats, OwnerId, TrendReport,
};

use crate::{
    aggregation::{self, TrendBand},
    alerts::{self, AlertThresholds},
    period,
    storage::RecordStore,
    time::Clock,
    CoreError,
};

pub struct SummaryService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    thresholds: AlertThresholds,
    trend_band: TrendBand,
}

impl SummaryService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            thresholds: AlertThresholds::default(),
            trend_band: TrendBand::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_trend_band(mut self, band: TrendBand) -> Self {
        self.trend_band = band;
        self
    }

    pub fn analytics_summary(&self, owner: &OwnerId) -> Result<AnalyticsSummary, CoreError> {
        self.analytics_summary_at(owner, self.clock.now())
    }

    /// Dashboard figures for the calendar month containing `reference`.
    /// Budgets are each measured over their own period.
    pub fn analytics_summary_at(
        &self,
        owner: &OwnerId,
        reference: DateTime<Utc>,
    ) -> Result<AnalyticsSummary, CoreError> {
        let snapshot = self.store.snapshot(owner)?;
        let interval = period::month_containing(reference);
        let month = aggregation::transactions_in(&snapshot.transactions, interval);

        let total_spent = aggregation::total_spent(&month, interval);
        let category_totals = aggregation::category_totals(&month);
        let budget_summary =
            aggregation::budget_summary(&snapshot.transactions, &snapshot.budgets, reference);
        let total_budget = aggregation::total_budget(&snapshot.budgets);
        let alerts = alerts::evaluate_with(&budget_summary, &self.thresholds);
        tracing::debug!(
            owner = %owner,
            %interval,
            transactions = month.len(),
            budgets = snapshot.budgets.len(),
            "computed analytics summary"
        );

        Ok(AnalyticsSummary {
            owner_id: owner.clone(),
            reference,
            interval,
            total_spent,
            extremes: aggregation::category_extremes(&category_totals),
            category_totals,
            budget_summary,
            transaction_count: month.len(),
            total_budget,
            overview: aggregation::overview(total_spent, total_budget, &self.thresholds),
            alerts,
            average_daily_spend: aggregation::average_daily_spend(&month, interval, reference),
            days_left: aggregation::days_left(interval, reference),
        })
    }

    pub fn budget_status(&self, owner: &OwnerId) -> Result<BudgetStatusReport, CoreError> {
        self.budget_status_at(owner, self.clock.now())
    }

    pub fn budget_status_at(
        &self,
        owner: &OwnerId,
        reference: DateTime<Utc>,
    ) -> Result<BudgetStatusReport, CoreError> {
        let snapshot = self.store.snapshot(owner)?;
        let summaries =
            aggregation::budget_summary(&snapshot.transactions, &snapshot.budgets, reference);
        let alerts = alerts::evaluate_with(&summaries, &self.thresholds);
        Ok(BudgetStatusReport {
            reference,
            summaries,
            alerts,
        })
    }

    pub fn trend_report(
        &self,
        owner: &OwnerId,
        months_back: u32,
    ) -> Result<TrendReport, CoreError> {
        self.trend_report_at(owner, months_back, self.clock.now())
    }

    pub fn trend_report_at(
        &self,
        owner: &OwnerId,
        months_back: u32,
        reference: DateTime<Utc>,
    ) -> Result<TrendReport, CoreError> {
        let transactions = self.store.transactions(owner)?;
        let history = aggregation::monthly_history(&transactions, months_back, reference)?;
        Ok(TrendReport {
            reference,
            direction: aggregation::trend_direction_with(&history, self.trend_band),
            month_over_month_change: aggregation::month_over_month_change(&history),
            history,
        })
    }

    pub fn lifetime_stats(&self, owner: &OwnerId) -> Result<LifetimeStats, CoreError> {
        let transactions = self.store.transactions(owner)?;
        Ok(aggregation::lifetime_stats(&transactions))
    }
}
