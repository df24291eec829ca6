use std::{fs, sync::Arc};

use chrono::{TimeZone, Utc};
use momo_core::{
    storage::RecordStore, BudgetDraft, BudgetService, CoreError, FixedClock, SummaryService,
    TransactionDraft, TransactionService,
};
use momo_domain::{Amount, Budget, BudgetPeriod, Category, OwnerId, Service, Transaction};
use momo_storage_json::JsonRecordStore;
use tempfile::tempdir;

fn owner(raw: &str) -> OwnerId {
    OwnerId::new(raw).expect("owner id")
}

fn sample_transaction(owner_id: &OwnerId, day: u32, amount: &str) -> Transaction {
    let date = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
    Transaction::new(
        owner_id.clone(),
        Amount::parse(amount).expect("amount"),
        Category::Food,
        Service::Mtn,
        Some(date),
        date,
    )
    .with_notes(Some("Lunch at campus cafeteria".into()))
}

#[test]
fn json_store_persists_records_across_instances() {
    let dir = tempdir().expect("tempdir");
    let me = owner("0244123456");
    {
        let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
        store
            .insert_transaction(&sample_transaction(&me, 3, "25.50"))
            .expect("insert");
        store
            .insert_transaction(&sample_transaction(&me, 9, "10"))
            .expect("insert");
        let budget = Budget::new(
            me.clone(),
            Category::Food,
            Amount::parse("200").unwrap(),
            BudgetPeriod::Weekly,
            Utc::now(),
        );
        store.insert_budget(&budget).expect("insert budget");
    }

    let reopened = JsonRecordStore::new(dir.path().to_path_buf()).expect("reopen store");
    let snapshot = reopened.snapshot(&me).expect("snapshot");
    assert_eq!(snapshot.transactions.len(), 2);
    assert_eq!(snapshot.transactions[0].amount, Amount::parse("10").unwrap());
    assert_eq!(
        snapshot.transactions[1].notes.as_deref(),
        Some("Lunch at campus cafeteria")
    );
    assert_eq!(snapshot.budgets[0].period, BudgetPeriod::Weekly);
    assert_eq!(reopened.list_owners().expect("owners"), vec![me]);
}

#[test]
fn json_store_writes_amounts_as_decimal_strings() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    let me = owner("writer");
    store
        .insert_transaction(&sample_transaction(&me, 3, "25.5"))
        .expect("insert");

    let raw = fs::read_to_string(store.owner_path(&me)).expect("read document");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("parse document");
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["owner_id"], "writer");
    assert_eq!(json["transactions"][0]["amount"], "25.50");
    assert_eq!(json["transactions"][0]["category"], "Food");
    assert_eq!(json["transactions"][0]["service"], "MTN");
}

#[test]
fn json_store_rejects_duplicate_budget_categories() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    let me = owner("dupes");
    let first = Budget::new(
        me.clone(),
        Category::Airtime,
        Amount::parse("50").unwrap(),
        BudgetPeriod::Monthly,
        Utc::now(),
    );
    let second = Budget::new(
        me.clone(),
        Category::Airtime,
        Amount::parse("80").unwrap(),
        BudgetPeriod::Daily,
        Utc::now(),
    );
    store.insert_budget(&first).expect("first insert");
    let err = store.insert_budget(&second).expect_err("second insert");
    assert!(matches!(err, CoreError::Conflict(_)));
    assert_eq!(store.budgets(&me).expect("budgets").len(), 1);
}

#[test]
fn json_store_keeps_owners_apart() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    let (a, b) = (owner("a_b"), owner("a-b"));
    let txn = sample_transaction(&a, 3, "12");
    store.insert_transaction(&txn).expect("insert");

    assert_ne!(store.owner_path(&a), store.owner_path(&b));
    assert!(store.transactions(&b).expect("list").is_empty());
    assert_eq!(store.transaction(&b, txn.id).expect("get"), None);
    assert!(!store.delete_transaction(&b, txn.id).expect("delete"));
    assert!(!store.owner_path(&b).exists());
    assert!(store.delete_transaction(&a, txn.id).expect("delete"));
}

#[test]
fn json_store_refuses_documents_of_another_owner() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    let (a, b) = (owner("alpha"), owner("beta"));
    store
        .insert_transaction(&sample_transaction(&a, 3, "12"))
        .expect("insert");
    fs::copy(store.owner_path(&a), store.owner_path(&b)).expect("copy document");

    let err = store.transactions(&b).expect_err("mismatched owner");
    assert!(matches!(err, CoreError::Storage(_)));
}

#[test]
fn json_store_reports_corrupt_documents() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    let me = owner("broken");
    fs::write(store.owner_path(&me), "{ not json").expect("write garbage");
    assert!(matches!(store.snapshot(&me), Err(CoreError::Serde(_))));
}

#[test]
fn services_run_on_the_json_store() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonRecordStore::new(dir.path().to_path_buf()).expect("create store"));
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 12, 18, 0, 0).unwrap()));
    let transactions = TransactionService::new(store.clone(), clock.clone());
    let budgets = BudgetService::new(store.clone(), clock.clone());
    let summaries = SummaryService::new(store.clone(), clock);
    let me = owner("services");

    for limit in ["100", "200"] {
        budgets
            .set(
                &me,
                &BudgetDraft {
                    category: "Food".into(),
                    limit: limit.into(),
                    period: Some("weekly".into()),
                },
            )
            .expect("set budget");
    }
    for amount in ["120", "85"] {
        transactions
            .create(
                &me,
                &TransactionDraft {
                    amount: amount.into(),
                    category: "Food".into(),
                    service: "MTN".into(),
                    notes: None,
                    date: Some("2025-03-11".into()),
                },
            )
            .expect("create transaction");
    }

    let status = summaries.budget_status(&me).expect("status");
    assert_eq!(status.summaries.len(), 1);
    assert_eq!(status.summaries[0].limit().to_string(), "200.00");
    assert_eq!(status.summaries[0].remaining.to_string(), "-5.00");
    assert!(status.summaries[0].is_over_limit);
}
