use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use engine::{
    Backup, CategoryId, EngineError, Intent, Money, NewCategory, OpeningBalance, Tier, Tracker, Transaction,
    TransactionDraft, TransactionKind,
    storage::{FileStore, KeyValueStore, LocalState, keys},
};

fn scratch_file(name: &str) -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_stores");
    std::fs::create_dir_all(&root).unwrap();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = root.join(format!("{name}_{}_{nanos}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn draft(kind: &str, amount: &str, category: &str) -> TransactionDraft {
    TransactionDraft {
        kind: kind.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        description: "entry".to_string(),
        date: String::new(),
    }
}

#[test]
fn file_store_persists_between_opens() {
    let path = scratch_file("persist");

    let mut state = LocalState::open(&path).unwrap();
    let input = draft("expense", "50.000", "food").parse(today()).unwrap();
    state
        .save_transactions(&[Transaction::new(1, input)])
        .unwrap();
    state
        .save_opening_balance(OpeningBalance::new(Money::from_major(1_000)).unwrap())
        .unwrap();

    let reopened = LocalState::open(&path).unwrap();
    assert_eq!(reopened.transactions().len(), 1);
    assert_eq!(reopened.opening_balance().amount(), Money::from_major(1_000));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn corrupted_file_starts_from_defaults() {
    let path = scratch_file("corrupt");
    std::fs::write(&path, "{{{ definitely not json").unwrap();

    let state = LocalState::open(&path).unwrap();
    assert!(state.transactions().is_empty());
    assert_eq!(state.categories().len(), 9);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn clear_removes_every_key() {
    let path = scratch_file("clear");
    let mut store = FileStore::open(&path).unwrap();
    for key in keys::ALL {
        store.set(key, "[]".to_string()).unwrap();
    }
    store.clear().unwrap();

    let reopened = FileStore::open(&path).unwrap();
    for key in keys::ALL {
        assert_eq!(reopened.get(key).unwrap(), None);
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn tracker_session_over_local_state() {
    let path = scratch_file("session");
    let mut state = LocalState::open(&path).unwrap();

    let mut categories = engine::CategoryRegistry::new(state.categories());
    categories
        .insert(NewCategory {
            name: "Kopi".to_string(),
            kind: TransactionKind::Expense,
            color: "#6F4E37".to_string(),
            icon: "☕".to_string(),
        })
        .unwrap();
    state.save_categories(categories.as_slice()).unwrap();

    let mut tracker = Tracker::new(Tier::Local);
    tracker
        .apply(Intent::ReplaceCategories(state.categories()))
        .unwrap();
    tracker
        .apply(Intent::ReplaceTransactions(state.transactions()))
        .unwrap();

    for (i, (kind, amount, category)) in [
        ("income", "500.000", "salary"),
        ("expense", "50.000", "kopi"),
        ("expense", "30.000", "transport"),
    ]
    .into_iter()
    .enumerate()
    {
        let input = draft(kind, amount, category).parse(today()).unwrap();
        let id = tracker.next_local_id(i as i64);
        tracker
            .apply(Intent::AddTransaction(Transaction::new(id, input)))
            .unwrap();
    }
    state.save_transactions(tracker.transactions()).unwrap();

    let view = tracker.view();
    assert_eq!(view.summary.balance, Money::from_major(420_000));
    let labels: Vec<_> = view
        .breakdown
        .entries()
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(labels, ["Kopi", "Transport"]);

    let backup = Backup::parse(&state.export(Utc::now()).to_json().unwrap()).unwrap();
    let mut fresh = LocalState::new(engine::storage::MemoryStore::default());
    fresh.import(&backup).unwrap();
    assert_eq!(fresh.transactions(), tracker.transactions());
    assert!(
        fresh
            .categories()
            .iter()
            .any(|c| c.id == CategoryId::new("kopi"))
    );

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn backup_with_a_zero_amount_never_reaches_the_store() {
    let path = scratch_file("zero_amount");
    let mut state = LocalState::open(&path).unwrap();
    let existing: Vec<_> = [("income", "1.000.000", "salary"), ("expense", "25.000", "food")]
        .into_iter()
        .enumerate()
        .map(|(i, (kind, amount, category))| {
            Transaction::new(i as i64 + 10, draft(kind, amount, category).parse(today()).unwrap())
        })
        .collect();
    state.save_transactions(&existing).unwrap();

    let text = r#"{"transactions": [
        {"id":1,"kind":"EXPENSE","amount":50000,"categoryId":"food",
         "description":"lunch","occurredOn":"2024-01-15"},
        {"id":2,"kind":"EXPENSE","amount":0,"categoryId":"food",
         "description":"free","occurredOn":"2024-01-15"}
    ]}"#;
    assert!(matches!(state.import_str(text), Err(EngineError::Corrupted(_))));

    let mut bypass = Backup::parse(&state.export(Utc::now()).to_json().unwrap()).unwrap();
    if let Some(list) = bypass.transactions.as_mut() {
        list[1].amount = Money::ZERO;
    }
    assert!(matches!(state.import(&bypass), Err(EngineError::Corrupted(_))));

    // A later session loads and extends the untouched history.
    let mut reopened = LocalState::open(&path).unwrap();
    let mut tracker = Tracker::new(Tier::Local);
    tracker
        .apply(Intent::ReplaceTransactions(reopened.try_transactions().unwrap()))
        .unwrap();
    let input = draft("expense", "15.000", "transport").parse(today()).unwrap();
    let id = tracker.next_local_id(99);
    tracker
        .apply(Intent::AddTransaction(Transaction::new(id, input)))
        .unwrap();
    reopened.save_transactions(tracker.transactions()).unwrap();

    assert_eq!(LocalState::open(&path).unwrap().transactions().len(), 3);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn unreadable_transactions_are_reported_not_emptied() {
    let path = scratch_file("unreadable");
    let mut store = FileStore::open(&path).unwrap();
    store
        .set(keys::TRANSACTIONS, r#"[{"id": 1, "amount": "#.to_string())
        .unwrap();

    let state = LocalState::open(&path).unwrap();
    assert!(state.transactions().is_empty());
    assert!(matches!(state.try_transactions(), Err(EngineError::Corrupted(_))));
    assert_eq!(
        state.store().get(keys::TRANSACTIONS).unwrap().as_deref(),
        Some(r#"[{"id": 1, "amount": "#)
    );

    std::fs::remove_file(&path).unwrap();
}
