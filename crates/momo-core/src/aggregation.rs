//! The aggregation engine.
//!
//! Every function here is a pure computation over one owner's transactions and
//! budgets. Nothing is cached: callers fetch a snapshot, pass it in, and render
//! whatever comes back. Amounts are summed as exact decimals.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use momo_domain::{
    Budget, BudgetOverview, BudgetSummary, Category, CategoryExtremes, CategoryTotal,
    CategoryTotals, Interval, LifetimeStats, MonthlySpend, Transaction, TrendDirection,
};

use crate::{alerts::AlertThresholds, period, CoreError};

const PERCENT_SCALE: u32 = 2;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Relative band around the previous month inside which a trend counts as stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendBand(Decimal);

impl TrendBand {
    pub const DEFAULT: TrendBand = TrendBand(Decimal::from_parts(10, 0, 0, false, 2));

    /// Builds a band from a ratio in `[0, 1)`.
    pub fn new(ratio: Decimal) -> Result<Self, CoreError> {
        if ratio < Decimal::ZERO || ratio >= Decimal::ONE {
            return Err(CoreError::InvalidInput(format!(
                "trend band must be within [0, 1), got {ratio}"
            )));
        }
        Ok(Self(ratio))
    }

    pub fn ratio(&self) -> Decimal {
        self.0
    }
}

impl Default for TrendBand {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Sums amounts per category. Categories without transactions are absent.
pub fn category_totals(transactions: &[Transaction]) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for txn in transactions {
        *totals.entry(txn.category).or_insert(Decimal::ZERO) += txn.amount.value();
    }
    totals
}

/// Like [`category_totals`] but every category is present, zero when unused.
pub fn dense_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    let mut totals: CategoryTotals = Category::ALL
        .iter()
        .map(|category| (*category, Decimal::ZERO))
        .collect();
    totals.extend(category_totals(transactions));
    totals
}

/// Total spend of transactions dated inside `interval`.
pub fn total_spent(transactions: &[Transaction], interval: Interval) -> Decimal {
    in_interval(transactions, interval)
        .map(|txn| txn.amount)
        .sum()
}

/// Number of transactions dated inside `interval`.
pub fn transaction_count(transactions: &[Transaction], interval: Interval) -> usize {
    in_interval(transactions, interval).count()
}

/// Transactions dated inside `interval`, in input order.
pub fn transactions_in(transactions: &[Transaction], interval: Interval) -> Vec<Transaction> {
    in_interval(transactions, interval).cloned().collect()
}

fn in_interval(
    transactions: &[Transaction],
    interval: Interval,
) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(move |txn| interval.contains(txn.date))
}

/// Spend-vs-limit for one budget over the period containing `reference`.
pub fn summarize_budget(
    transactions: &[Transaction],
    budget: &Budget,
    reference: DateTime<Utc>,
) -> BudgetSummary {
    let interval = period::resolve(budget.period, reference);
    let spent: Decimal = in_interval(transactions, interval)
        .filter(|txn| txn.category == budget.category)
        .map(|txn| txn.amount)
        .sum();
    let limit = budget.limit.value();
    BudgetSummary {
        budget: budget.clone(),
        interval,
        spent,
        remaining: limit - spent,
        is_over_limit: spent > limit,
        percent_used: percent_used(spent, limit),
    }
}

/// One summary per budget, preserving input order. Each budget is measured
/// over its own period.
pub fn budget_summary(
    transactions: &[Transaction],
    budgets: &[Budget],
    reference: DateTime<Utc>,
) -> Vec<BudgetSummary> {
    budgets
        .iter()
        .map(|budget| summarize_budget(transactions, budget, reference))
        .collect()
}

/// Flat sum of every budget limit.
///
/// Limits are added regardless of their period, so a daily and a monthly
/// budget contribute their raw limits side by side.
pub fn total_budget(budgets: &[Budget]) -> Decimal {
    budgets.iter().map(|budget| budget.limit).sum()
}

/// `spent / limit * 100` rounded to two places, or `None` for a zero limit.
pub fn percent_used(spent: Decimal, limit: Decimal) -> Option<Decimal> {
    if limit.is_zero() {
        return None;
    }
    Some(round_money(spent / limit * HUNDRED))
}

/// Overall spend against the flat budget total.
pub fn overview(
    total_spent: Decimal,
    total_budget: Decimal,
    thresholds: &AlertThresholds,
) -> BudgetOverview {
    BudgetOverview {
        total_spent,
        total_budget,
        remaining: total_budget - total_spent,
        percent_used: percent_used(total_spent, total_budget),
        is_over_budget: total_spent > total_budget,
        severity: thresholds.classify(total_spent, total_budget),
    }
}

/// Longest history, in months before the current one, that `monthly_history` builds.
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Spend for the month containing `reference` and each of the `months_back`
/// months before it, most recent first. Always `months_back + 1` entries.
pub fn monthly_history(
    transactions: &[Transaction],
    months_back: u32,
    reference: DateTime<Utc>,
) -> Result<Vec<MonthlySpend>, CoreError> {
    if months_back > MAX_HISTORY_MONTHS {
        return Err(CoreError::InvalidInput(format!(
            "history covers at most {MAX_HISTORY_MONTHS} previous months, got {months_back}"
        )));
    }
    (0..=months_back)
        .map(|offset| {
            let anchor = period::shift_months(reference, -(offset as i32)).ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "{offset} months before {reference} is outside the supported calendar"
                ))
            })?;
            let interval = period::month_containing(anchor);
            let (spent, transaction_count) = in_interval(transactions, interval)
                .fold((Decimal::ZERO, 0usize), |(sum, count), txn| {
                    (sum + txn.amount.value(), count + 1)
                });
            Ok(MonthlySpend {
                label: interval.start.format("%B %Y").to_string(),
                interval,
                spent,
                transaction_count,
            })
        })
        .collect()
}

/// Trend of the latest month against the previous one using the default band.
pub fn trend_direction(history: &[MonthlySpend]) -> TrendDirection {
    trend_direction_with(history, TrendBand::default())
}

pub fn trend_direction_with(history: &[MonthlySpend], band: TrendBand) -> TrendDirection {
    let [current, previous, ..] = history else {
        return TrendDirection::Stable;
    };
    if current.spent > previous.spent * (Decimal::ONE + band.ratio()) {
        TrendDirection::Up
    } else if current.spent < previous.spent * (Decimal::ONE - band.ratio()) {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

/// Percent change of the latest month against the previous one.
pub fn month_over_month_change(history: &[MonthlySpend]) -> Option<Decimal> {
    let [current, previous, ..] = history else {
        return None;
    };
    if previous.spent.is_zero() {
        return None;
    }
    Some(round_money(
        (current.spent - previous.spent) / previous.spent * HUNDRED,
    ))
}

/// The categories with the highest and the lowest spend. Ties go to the
/// category listed first.
pub fn category_extremes(totals: &CategoryTotals) -> Option<CategoryExtremes> {
    let mut entries = totals.iter().map(|(category, amount)| CategoryTotal {
        category: *category,
        amount: *amount,
    });
    let first = entries.next()?;
    let (highest, lowest) = entries.fold((first, first), |(high, low), entry| {
        (
            if entry.amount > high.amount { entry } else { high },
            if entry.amount < low.amount { entry } else { low },
        )
    });
    Some(CategoryExtremes { highest, lowest })
}

/// Average spend per elapsed day of `interval`, counting the reference day.
///
/// Spend after the end of the reference day is ignored. Before the interval
/// starts the average is zero.
pub fn average_daily_spend(
    transactions: &[Transaction],
    interval: Interval,
    reference: DateTime<Utc>,
) -> Decimal {
    let day_end = period::start_of_day(reference) + Duration::days(1);
    let cutoff = day_end.min(interval.end);
    let Ok(elapsed) = Interval::new(interval.start, cutoff) else {
        return Decimal::ZERO;
    };
    let days = (elapsed.end - elapsed.start).num_days().max(1);
    round_money(total_spent(transactions, elapsed) / Decimal::from(days))
}

/// Whole days remaining in `interval`, counting the reference day.
pub fn days_left(interval: Interval, reference: DateTime<Utc>) -> u32 {
    if reference >= interval.end {
        return 0;
    }
    let from = period::start_of_day(reference).max(interval.start);
    u32::try_from((interval.end - from).num_days()).unwrap_or(u32::MAX)
}

/// All-time totals for the profile view.
pub fn lifetime_stats(transactions: &[Transaction]) -> LifetimeStats {
    LifetimeStats {
        transaction_count: transactions.len(),
        total_spent: transactions.iter().map(|txn| txn.amount).sum(),
        first_transaction_at: transactions.iter().map(|txn| txn.date).min(),
    }
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use momo_domain::{Amount, BudgetPeriod, OwnerId, Service};
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn owner() -> OwnerId {
        OwnerId::new("agg-owner").unwrap()
    }

    fn txn(amount: &str, category: Category, date: DateTime<Utc>) -> Transaction {
        Transaction::new(
            owner(),
            Amount::parse(amount).unwrap(),
            category,
            Service::Mtn,
            Some(date),
            date,
        )
    }

    fn budget(category: Category, limit: &str, period: BudgetPeriod) -> Budget {
        Budget::new(
            owner(),
            category,
            Amount::parse(limit).unwrap(),
            period,
            at(2025, 1, 1, 0),
        )
    }

    #[test]
    fn category_totals_are_sparse_and_dense_fills_gaps() {
        let txns = vec![
            txn("25.50", Category::Food, at(2025, 3, 3, 9)),
            txn("10", Category::Food, at(2025, 3, 4, 9)),
            txn("5", Category::Airtime, at(2025, 3, 4, 10)),
        ];
        let sparse = category_totals(&txns);
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[&Category::Food], dec!(35.50));
        assert!(!sparse.contains_key(&Category::Transport));

        let dense = dense_category_totals(&txns);
        assert_eq!(dense.len(), Category::ALL.len());
        assert_eq!(dense[&Category::Transport], Decimal::ZERO);
        assert_eq!(dense[&Category::Airtime], dec!(5));
    }

    #[test]
    fn each_budget_uses_its_own_period() {
        let reference = at(2025, 3, 12, 12);
        let txns = vec![
            txn("30", Category::Food, at(2025, 3, 12, 8)),
            txn("40", Category::Food, at(2025, 3, 10, 8)),
            txn("50", Category::Food, at(2025, 3, 2, 8)),
        ];
        let budgets = vec![
            budget(Category::Food, "100", BudgetPeriod::Daily),
            budget(Category::Food, "100", BudgetPeriod::Weekly),
            budget(Category::Food, "200", BudgetPeriod::Monthly),
        ];
        let summaries = budget_summary(&txns, &budgets, reference);
        let spent: Vec<_> = summaries.iter().map(|s| s.spent).collect();
        assert_eq!(spent, vec![dec!(30), dec!(70), dec!(120)]);
        assert_eq!(summaries[2].remaining, dec!(80));
        assert_eq!(summaries[2].percent_used, Some(dec!(60)));
    }

    #[test]
    fn zero_limit_has_no_percentage() {
        let txns = vec![txn("1", Category::Other, at(2025, 3, 12, 8))];
        let budgets = vec![budget(Category::Other, "0", BudgetPeriod::Monthly)];
        let summary = &budget_summary(&txns, &budgets, at(2025, 3, 12, 12))[0];
        assert_eq!(summary.percent_used, None);
        assert!(summary.is_over_limit);
        assert_eq!(summary.remaining, dec!(-1));
    }

    #[test]
    fn percent_used_rounds_half_away_from_zero() {
        assert_eq!(percent_used(dec!(1), dec!(3)), Some(dec!(33.33)));
        assert_eq!(percent_used(dec!(2), dec!(3)), Some(dec!(66.67)));
        assert_eq!(percent_used(dec!(0.00125), dec!(1)), Some(dec!(0.13)));
    }

    #[test]
    fn total_budget_is_a_flat_sum() {
        let budgets = vec![
            budget(Category::Food, "10", BudgetPeriod::Daily),
            budget(Category::Transport, "300", BudgetPeriod::Monthly),
        ];
        assert_eq!(total_budget(&budgets), dec!(310));
        assert_eq!(total_budget(&[]), Decimal::ZERO);
    }

    #[test]
    fn overview_flags_overspend() {
        let thresholds = AlertThresholds::default();
        let view = overview(dec!(245.75), dec!(400), &thresholds);
        assert_eq!(view.remaining, dec!(154.25));
        assert_eq!(view.percent_used, Some(dec!(61.44)));
        assert!(!view.is_over_budget);

        let over = overview(dec!(401), dec!(400), &thresholds);
        assert!(over.is_over_budget);
        assert_eq!(over.remaining, dec!(-1));
    }

    #[test]
    fn trend_uses_a_ten_percent_band() {
        let reference = at(2025, 3, 15, 12);
        let history = |current: &str, previous: &str| {
            let txns = vec![
                txn(current, Category::Food, at(2025, 3, 2, 8)),
                txn(previous, Category::Food, at(2025, 2, 2, 8)),
            ];
            monthly_history(&txns, 1, reference).unwrap()
        };
        assert_eq!(trend_direction(&history("111", "100")), TrendDirection::Up);
        assert_eq!(trend_direction(&history("110", "100")), TrendDirection::Stable);
        assert_eq!(trend_direction(&history("90", "100")), TrendDirection::Stable);
        assert_eq!(trend_direction(&history("89", "100")), TrendDirection::Down);
        assert_eq!(
            month_over_month_change(&history("112.50", "100")),
            Some(dec!(12.50))
        );
    }

    #[test]
    fn trend_is_stable_without_two_months() {
        let history = monthly_history(&[], 0, at(2025, 3, 15, 12)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(trend_direction(&history), TrendDirection::Stable);
        assert_eq!(month_over_month_change(&history), None);
    }

    #[test]
    fn history_length_is_bounded() {
        let reference = at(2025, 3, 15, 12);
        let longest = monthly_history(&[], MAX_HISTORY_MONTHS, reference).unwrap();
        assert_eq!(longest.len(), MAX_HISTORY_MONTHS as usize + 1);
        assert_eq!(longest.last().unwrap().label, "March 2015");
        assert!(matches!(
            monthly_history(&[], MAX_HISTORY_MONTHS + 1, reference),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            monthly_history(&[], u32::MAX, reference),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn change_is_none_when_previous_month_is_empty() {
        let txns = vec![txn("40", Category::Food, at(2025, 3, 2, 8))];
        let history = monthly_history(&txns, 1, at(2025, 3, 15, 12)).unwrap();
        assert_eq!(trend_direction(&history), TrendDirection::Up);
        assert_eq!(month_over_month_change(&history), None);
    }

    #[test]
    fn custom_band_widens_stable_range() {
        let txns = vec![
            txn("120", Category::Food, at(2025, 3, 2, 8)),
            txn("100", Category::Food, at(2025, 2, 2, 8)),
        ];
        let history = monthly_history(&txns, 1, at(2025, 3, 15, 12)).unwrap();
        let band = TrendBand::new(dec!(0.25)).unwrap();
        assert_eq!(trend_direction_with(&history, band), TrendDirection::Stable);
        assert!(TrendBand::new(Decimal::ONE).is_err());
    }

    #[test]
    fn extremes_prefer_first_category_on_ties() {
        let mut totals = CategoryTotals::new();
        totals.insert(Category::Food, dec!(120));
        totals.insert(Category::Transport, dec!(30));
        totals.insert(Category::Airtime, dec!(120));
        totals.insert(Category::Other, dec!(30));
        let extremes = category_extremes(&totals).unwrap();
        assert_eq!(extremes.highest.category, Category::Food);
        assert_eq!(extremes.lowest.category, Category::Transport);
        assert_eq!(category_extremes(&CategoryTotals::new()), None);
    }

    #[test]
    fn average_daily_spend_counts_the_reference_day() {
        let interval = period::month_containing(at(2025, 3, 10, 12));
        let txns = vec![
            txn("30", Category::Food, at(2025, 3, 1, 8)),
            txn("20", Category::Food, at(2025, 3, 10, 20)),
            txn("99", Category::Food, at(2025, 3, 11, 8)),
        ];
        assert_eq!(
            average_daily_spend(&txns, interval, at(2025, 3, 10, 12)),
            dec!(5)
        );
        assert_eq!(
            average_daily_spend(&txns, interval, at(2025, 2, 20, 12)),
            Decimal::ZERO
        );
        // Past the end the whole month is the divisor.
        assert_eq!(
            average_daily_spend(&txns, interval, at(2025, 5, 1, 0)),
            dec!(4.81)
        );
    }

    #[test]
    fn days_left_counts_the_reference_day() {
        let interval = period::month_containing(at(2025, 3, 17, 12));
        assert_eq!(days_left(interval, at(2025, 3, 17, 12)), 15);
        assert_eq!(days_left(interval, at(2025, 3, 31, 23)), 1);
        assert_eq!(days_left(interval, at(2025, 4, 1, 0)), 0);
        assert_eq!(days_left(interval, at(2025, 2, 1, 0)), 31);
    }

    #[test]
    fn lifetime_stats_cover_every_transaction() {
        let txns = vec![
            txn("10", Category::Food, at(2025, 3, 2, 8)),
            txn("2.50", Category::Airtime, at(2024, 11, 2, 8)),
        ];
        let stats = lifetime_stats(&txns);
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.total_spent, dec!(12.50));
        assert_eq!(stats.first_transaction_at, Some(at(2024, 11, 2, 8)));
        assert_eq!(lifetime_stats(&[]).first_transaction_at, None);
    }
}
