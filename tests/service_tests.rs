mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use momo_budget::cli::core::Services;
use momo_budget::config::Config;
use momo_budget::core::{BudgetDraft, FixedClock, TransactionDraft};
use momo_budget::domain::{BudgetPeriod, OwnerId, Severity, TrendDirection};

fn services(config: &Config) -> Services {
    let home = common::test_home();
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap()));
    Services::build(config, &home, clock).expect("services")
}

fn spend(services: &Services, owner: &OwnerId, amount: &str, category: &str, date: &str) {
    services
        .transactions
        .create(
            owner,
            &TransactionDraft {
                amount: amount.into(),
                category: category.into(),
                service: "Telecel".into(),
                notes: None,
                date: Some(date.into()),
            },
        )
        .expect("create transaction");
}

fn budget(services: &Services, owner: &OwnerId, category: &str, limit: &str) {
    services
        .budgets
        .set(
            owner,
            &BudgetDraft {
                category: category.into(),
                limit: limit.into(),
                period: None,
            },
        )
        .expect("set budget");
}

#[test]
fn configured_ratio_moves_the_near_limit_line() {
    let owner = OwnerId::new(common::OWNER).unwrap();

    let defaults = services(&Config::default());
    budget(&defaults, &owner, "Food", "100");
    spend(&defaults, &owner, "85", "Food", "2025-03-18");
    let status = defaults.summaries.budget_status(&owner).unwrap();
    assert_eq!(status.alerts[0].severity, Severity::NearLimit);

    let mut relaxed = Config::default();
    relaxed.set("near_limit_ratio", "0.9").unwrap();
    let relaxed = services(&relaxed);
    budget(&relaxed, &owner, "Food", "100");
    spend(&relaxed, &owner, "85", "Food", "2025-03-18");
    let status = relaxed.summaries.budget_status(&owner).unwrap();
    assert_eq!(status.alerts[0].severity, Severity::Ok);
}

#[test]
fn configured_default_period_applies_to_new_budgets() {
    let owner = OwnerId::new(common::OWNER).unwrap();
    let mut config = Config::default();
    config.set("default_budget_period", "daily").unwrap();
    let services = services(&config);

    budget(&services, &owner, "Airtime", "10");
    budget(&services, &owner, "Airtime", "15");
    let budgets = services.budgets.list(&owner).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].period, BudgetPeriod::Daily);
    assert_eq!(budgets[0].limit.to_string(), "15.00");
}

#[test]
fn wide_trend_band_keeps_moderate_growth_stable() {
    let owner = OwnerId::new(common::OWNER).unwrap();
    let mut config = Config::default();
    config.set("trend_band", "0.5").unwrap();
    let services = services(&config);

    spend(&services, &owner, "100", "Transport", "2025-02-10");
    spend(&services, &owner, "130", "Transport", "2025-03-10");
    let report = services.summaries.trend_report(&owner, 1).unwrap();
    assert_eq!(report.direction, TrendDirection::Stable);
    assert_eq!(report.month_over_month_change, Some(dec!(30)));
}

#[test]
fn data_root_override_is_honoured() {
    let custom = common::test_home().join("records");
    let mut config = Config::default();
    config.set("data_root", &custom.display().to_string()).unwrap();
    let services = services(&config);

    assert_eq!(services.store.root(), custom.as_path());
    let owner = OwnerId::new("ama").unwrap();
    spend(&services, &owner, "3", "Other", "2025-03-01");
    assert!(services.store.owner_path(&owner).starts_with(&custom));
    assert!(services.store.owner_path(&owner).exists());
}
