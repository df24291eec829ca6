//! Turns engine output into text lines. Nothing here computes figures; every
//! number comes from the aggregation engine as-is.

use rust_decimal::Decimal;

use momo_domain::{
    AnalyticsSummary, Budget, BudgetAlert, BudgetStatusReport, BudgetSummary, LifetimeStats,
    Severity, Transaction, TrendReport,
};

use crate::currency::{
    format_currency_value, format_date, format_percent, format_timestamp, CurrencyCode,
    LocaleConfig,
};

/// Currency and locale used for every rendered amount.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub currency: CurrencyCode,
    pub locale: LocaleConfig,
}

impl Formatter {
    pub fn new(currency: &str, locale: &str) -> Self {
        Self {
            currency: CurrencyCode::new(currency),
            locale: LocaleConfig::from_tag(locale),
        }
    }

    pub fn money(&self, value: Decimal) -> String {
        format_currency_value(value, &self.currency, &self.locale)
    }

    pub fn percent(&self, value: Option<Decimal>) -> String {
        format_percent(&self.locale, value)
    }
}

/// First eight hex digits of an id, enough to address a record in the shell.
pub fn short_id(id: uuid::Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

pub fn summary_lines(summary: &AnalyticsSummary, fmt: &Formatter) -> Vec<String> {
    let month = summary.interval.start.format("%B %Y");
    let mut lines = vec![
        format!(
            "Summary for {month} (as of {})",
            format_timestamp(summary.reference)
        ),
        format!(
            "  Total spent    : {} ({} transactions)",
            fmt.money(summary.total_spent),
            summary.transaction_count
        ),
        format!("  Total budget   : {}", fmt.money(summary.total_budget)),
        format!("  Remaining      : {}", fmt.money(summary.overview.remaining)),
        format!(
            "  Used           : {} [{}]",
            fmt.percent(summary.overview.percent_used),
            summary.overview.severity
        ),
        format!("  Days left      : {}", summary.days_left),
        format!("  Avg daily      : {}", fmt.money(summary.average_daily_spend)),
    ];
    if let Some(extremes) = summary.extremes {
        lines.push(format!(
            "  Highest        : {} ({})",
            extremes.highest.category,
            fmt.money(extremes.highest.amount)
        ));
        lines.push(format!(
            "  Lowest         : {} ({})",
            extremes.lowest.category,
            fmt.money(extremes.lowest.amount)
        ));
    }
    if !summary.category_totals.is_empty() {
        lines.push("By category".into());
        for (category, amount) in &summary.category_totals {
            lines.push(format!("  {:<10} {}", category.as_str(), fmt.money(*amount)));
        }
    }
    if !summary.budget_summary.is_empty() {
        lines.push("Budgets".into());
        lines.extend(budget_summary_rows(
            &summary.budget_summary,
            &summary.alerts,
            fmt,
        ));
    }
    lines
}

pub fn status_lines(report: &BudgetStatusReport, fmt: &Formatter) -> Vec<String> {
    if report.summaries.is_empty() {
        return vec!["No budgets set. Use `budget set <category> <limit> [period]`.".into()];
    }
    let mut lines = vec![format!(
        "Budget status as of {}",
        format_timestamp(report.reference)
    )];
    lines.extend(budget_summary_rows(&report.summaries, &report.alerts, fmt));
    lines
}

fn budget_summary_rows(
    summaries: &[BudgetSummary],
    alerts: &[BudgetAlert],
    fmt: &Formatter,
) -> Vec<String> {
    summaries
        .iter()
        .zip(alerts)
        .map(|(summary, alert)| {
            format!(
                "  {:<10} {:<8} {} / {}  remaining {}  {}  {}",
                summary.budget.category.as_str(),
                summary.budget.period.as_str(),
                fmt.money(summary.spent),
                fmt.money(summary.limit()),
                fmt.money(summary.remaining),
                fmt.percent(summary.percent_used),
                alert.severity
            )
        })
        .collect()
}

/// Only budgets that need attention, most urgent first.
pub fn alert_lines(report: &BudgetStatusReport, fmt: &Formatter) -> Vec<String> {
    let mut flagged: Vec<_> = report
        .summaries
        .iter()
        .zip(&report.alerts)
        .filter(|(_, alert)| alert.severity != Severity::Ok)
        .collect();
    if flagged.is_empty() {
        return vec!["All budgets are within their limits.".into()];
    }
    flagged.sort_by(|a, b| b.1.severity.cmp(&a.1.severity));
    flagged
        .into_iter()
        .map(|(summary, alert)| {
            let detail = if summary.is_over_limit {
                format!("over by {}", fmt.money(-summary.remaining))
            } else {
                format!("{} left", fmt.money(summary.remaining))
            };
            format!(
                "{}: {} {} budget, {} of {} spent, {}",
                alert.severity,
                alert.category,
                summary.budget.period,
                fmt.money(summary.spent),
                fmt.money(summary.limit()),
                detail
            )
        })
        .collect()
}

pub fn history_lines(report: &TrendReport, fmt: &Formatter) -> Vec<String> {
    let mut lines: Vec<String> = report
        .history
        .iter()
        .map(|month| {
            format!(
                "  {:<15} {:>14}  ({} transactions)",
                month.label,
                fmt.money(month.spent),
                month.transaction_count
            )
        })
        .collect();
    let change = report
        .month_over_month_change
        .map(|change| format!(" ({}% vs previous month)", signed(change, fmt)))
        .unwrap_or_default();
    lines.push(format!("Trend: {}{change}", report.direction));
    lines
}

fn signed(value: Decimal, fmt: &Formatter) -> String {
    let body = crate::currency::format_number(&fmt.locale, value, 2);
    if value > Decimal::ZERO {
        format!("+{body}")
    } else {
        body
    }
}

pub fn stats_lines(stats: &LifetimeStats, fmt: &Formatter) -> Vec<String> {
    vec![
        format!("  Transactions : {}", stats.transaction_count),
        format!("  Total spent  : {}", fmt.money(stats.total_spent)),
        format!(
            "  Tracking since: {}",
            stats
                .first_transaction_at
                .map(format_date)
                .unwrap_or_else(|| "no transactions yet".into())
        ),
    ]
}

pub fn transaction_rows(transactions: &[Transaction], fmt: &Formatter) -> Vec<String> {
    if transactions.is_empty() {
        return vec!["No transactions found.".into()];
    }
    transactions
        .iter()
        .map(|txn| {
            let notes = txn
                .notes
                .as_deref()
                .map(|notes| format!("  {notes}"))
                .unwrap_or_default();
            format!(
                "  {}  {}  {:<10} {:<10} {:>14}{notes}",
                short_id(txn.id),
                format_date(txn.date),
                txn.category.as_str(),
                txn.service.as_str(),
                fmt.money(txn.amount.value()),
            )
        })
        .collect()
}

pub fn transaction_detail(txn: &Transaction, fmt: &Formatter) -> Vec<String> {
    vec![
        format!("  Id       : {}", txn.id),
        format!("  Amount   : {}", fmt.money(txn.amount.value())),
        format!("  Category : {}", txn.category),
        format!("  Service  : {}", txn.service),
        format!("  Date     : {}", format_timestamp(txn.date)),
        format!("  Recorded : {}", format_timestamp(txn.created_at)),
        format!("  Notes    : {}", txn.notes.as_deref().unwrap_or("-")),
    ]
}

pub fn budget_rows(budgets: &[Budget], fmt: &Formatter) -> Vec<String> {
    if budgets.is_empty() {
        return vec!["No budgets set.".into()];
    }
    budgets
        .iter()
        .map(|budget| {
            format!(
                "  {}  {:<10} {:<8} {:>14}",
                short_id(budget.id),
                budget.category.as_str(),
                budget.period.as_str(),
                fmt.money(budget.limit.value())
            )
        })
        .collect()
}
