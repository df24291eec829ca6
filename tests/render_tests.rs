use std::sync::{Arc, Once};

use chrono::{TimeZone, Utc};
use insta::assert_snapshot;

use momo_budget::cli::output::{set_preferences, OutputPreferences};
use momo_budget::cli::render::{alert_lines, history_lines, status_lines, Formatter};
use momo_budget::core::{
    BudgetDraft, BudgetService, FixedClock, MemoryRecordStore, SummaryService, TransactionDraft,
    TransactionService,
};
use momo_budget::domain::{BudgetStatusReport, OwnerId};

fn init_style() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        std::env::set_var("NO_COLOR", "1");
        set_preferences(OutputPreferences::default());
    });
}

fn sample_status() -> BudgetStatusReport {
    let store = Arc::new(MemoryRecordStore::new());
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 12, 18, 0, 0).unwrap()));
    let budgets = BudgetService::new(store.clone(), clock.clone());
    let transactions = TransactionService::new(store.clone(), clock.clone());
    let summaries = SummaryService::new(store, clock);
    let owner = OwnerId::new("render").unwrap();

    for (category, limit, period) in [
        ("Food", "200", "weekly"),
        ("Airtime", "50", "monthly"),
        ("Transport", "0", "monthly"),
    ] {
        budgets
            .set(
                &owner,
                &BudgetDraft {
                    category: category.into(),
                    limit: limit.into(),
                    period: Some(period.into()),
                },
            )
            .unwrap();
    }
    for (amount, category, date) in [
        ("120", "Food", "2025-03-11"),
        ("85", "Food", "2025-03-12"),
        ("42", "Airtime", "2025-03-03"),
    ] {
        transactions
            .create(
                &owner,
                &TransactionDraft {
                    amount: amount.into(),
                    category: category.into(),
                    service: "MTN".into(),
                    notes: None,
                    date: Some(date.into()),
                },
            )
            .unwrap();
    }
    summaries.budget_status(&owner).unwrap()
}

#[test]
fn budget_status_layout() {
    init_style();
    let rendered = status_lines(&sample_status(), &Formatter::default()).join("\n");
    assert_snapshot!("budget_status_layout", rendered);
}

#[test]
fn alerts_list_most_urgent_first() {
    init_style();
    let rendered = alert_lines(&sample_status(), &Formatter::default()).join("\n");
    assert_snapshot!("alerts_most_urgent_first", rendered);
}

#[test]
fn history_without_prior_month_has_no_change() {
    init_style();
    let store = Arc::new(MemoryRecordStore::new());
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap()));
    let summaries = SummaryService::new(store, clock);
    let report = summaries
        .trend_report(&OwnerId::new("empty").unwrap(), 0)
        .unwrap();
    let lines = history_lines(&report, &Formatter::default());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("January 2025"));
    assert!(lines[0].contains("GHS 0.00"));
    assert_eq!(lines[1], "Trend: stable");
}

#[test]
fn locale_changes_separators_not_figures() {
    init_style();
    let fmt = Formatter::new("ghs", "fr-CI");
    let lines = status_lines(&sample_status(), &fmt);
    assert!(lines[1].contains("GHS 205,00 / GHS 200,00"));
    assert!(lines[1].contains("102,50%"));
}
