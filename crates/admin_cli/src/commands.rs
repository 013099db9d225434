//! Admin operations over the local state.
//!
//! Every command reads what it needs from [`LocalState`], writes back the
//! collection it changed and reports on `out`.

use std::{
    error::Error,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use engine::{
    Analytics, CategoryId, CategoryRegistry, CategoryUpdate, NewCategory, NewUser, UserDirectory,
    storage::{KeyValueStore, LocalState},
};

pub type CliResult<T = ()> = Result<T, Box<dyn Error + Send + Sync>>;

pub fn category_list<S: KeyValueStore>(state: &LocalState<S>, out: &mut impl Write) -> CliResult {
    let categories = state.categories();
    if categories.is_empty() {
        writeln!(out, "no categories")?;
        return Ok(());
    }
    for c in &categories {
        writeln!(
            out,
            "{:<20} {:<24} {:<8} {:<8} {}",
            c.id.as_str(),
            c.name,
            c.kind.as_str(),
            c.color,
            c.icon
        )?;
    }
    Ok(())
}

pub fn category_add<S: KeyValueStore>(
    state: &mut LocalState<S>,
    input: NewCategory,
    out: &mut impl Write,
) -> CliResult {
    let mut registry = CategoryRegistry::new(state.categories());
    let id = registry.insert(input)?.id.clone();
    state.save_categories(registry.as_slice())?;
    tracing::info!(%id, "category added");
    writeln!(out, "added category: {id}")?;
    Ok(())
}

pub fn category_edit<S: KeyValueStore>(
    state: &mut LocalState<S>,
    id: &str,
    update: CategoryUpdate,
    out: &mut impl Write,
) -> CliResult {
    let mut registry = CategoryRegistry::new(state.categories());
    registry.update(&CategoryId::new(id), update)?;
    state.save_categories(registry.as_slice())?;
    tracing::info!(id, "category updated");
    writeln!(out, "updated category: {id}")?;
    Ok(())
}

/// Transactions that still point at the category keep their id and render
/// with the unknown-category label.
pub fn category_delete<S: KeyValueStore>(
    state: &mut LocalState<S>,
    id: &str,
    out: &mut impl Write,
) -> CliResult {
    let mut registry = CategoryRegistry::new(state.categories());
    let removed = registry.remove(&CategoryId::new(id))?;
    state.save_categories(registry.as_slice())?;
    tracing::info!(id, "category deleted");
    writeln!(out, "deleted category: {} ({})", removed.id, removed.name)?;
    Ok(())
}

pub fn user_list<S: KeyValueStore>(state: &LocalState<S>, out: &mut impl Write) -> CliResult {
    let users = state.users();
    if users.is_empty() {
        writeln!(out, "no users")?;
        return Ok(());
    }
    for u in &users {
        writeln!(
            out,
            "{:<14} {:<20} {:<32} {:<6} {}",
            u.id,
            u.name,
            u.email,
            u.role.as_str(),
            u.status.as_str()
        )?;
    }
    Ok(())
}

/// `id` is the caller's clock in milliseconds; a taken id moves past the
/// current maximum.
pub fn user_add<S: KeyValueStore>(
    state: &mut LocalState<S>,
    id: i64,
    input: NewUser,
    out: &mut impl Write,
) -> CliResult {
    let mut directory = UserDirectory::new(state.users());
    let user = directory.insert(id, input)?;
    let (id, email) = (user.id, user.email.clone());
    state.save_users(directory.as_slice())?;
    tracing::info!(id, "user added");
    writeln!(out, "added user: {id} <{email}>")?;
    Ok(())
}

pub fn user_delete<S: KeyValueStore>(
    state: &mut LocalState<S>,
    id: i64,
    out: &mut impl Write,
) -> CliResult {
    let mut directory = UserDirectory::new(state.users());
    let removed = directory.remove(id)?;
    state.save_users(directory.as_slice())?;
    tracing::info!(id, "user deleted");
    writeln!(out, "deleted user: {} <{}>", removed.id, removed.email)?;
    Ok(())
}

pub fn settings_show<S: KeyValueStore>(state: &LocalState<S>, out: &mut impl Write) -> CliResult {
    writeln!(out, "{}", serde_json::to_string_pretty(&state.settings())?)?;
    Ok(())
}

pub fn settings_set<S: KeyValueStore>(
    state: &mut LocalState<S>,
    key: &str,
    value: &str,
    out: &mut impl Write,
) -> CliResult {
    let mut settings = state.settings();
    settings.set(key, value)?;
    state.save_settings(&settings)?;
    tracing::info!(key, value, "setting changed");
    writeln!(out, "{key} = {value}")?;
    Ok(())
}

pub fn stats<S: KeyValueStore>(state: &LocalState<S>, out: &mut impl Write) -> CliResult {
    let transactions = state.transactions();
    let registry = CategoryRegistry::new(state.categories());
    let analytics = Analytics::compute(&transactions, &registry, state.users().len());

    writeln!(out, "users:              {}", analytics.total_users)?;
    writeln!(out, "transactions:       {}", analytics.total_transactions)?;
    writeln!(out, "average amount:     {}", analytics.average_amount)?;
    writeln!(out, "top expense categories:")?;
    if analytics.top_expenses.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (rank, entry) in analytics.top_expenses.iter().enumerate() {
        writeln!(out, "  {}. {:<24} {}", rank + 1, entry.label, entry.amount)?;
    }
    Ok(())
}

/// Writes a backup to `output`, or to the dated default name in the working
/// directory. Returns the path written.
pub fn export<S: KeyValueStore>(
    state: &LocalState<S>,
    now: DateTime<Utc>,
    output: Option<&Path>,
    out: &mut impl Write,
) -> CliResult<PathBuf> {
    let path = output.map_or_else(
        || PathBuf::from(engine::Backup::file_name(now.date_naive())),
        Path::to_path_buf,
    );
    let backup = state.export(now);
    fs::write(&path, backup.to_json()?)?;
    tracing::info!(path = %path.display(), "backup exported");
    writeln!(out, "exported to {}", path.display())?;
    Ok(path)
}

pub fn import<S: KeyValueStore>(
    state: &mut LocalState<S>,
    path: &Path,
    out: &mut impl Write,
) -> CliResult {
    let text = fs::read_to_string(path)?;
    let backup = state.import_str(&text)?;

    let mut restored = Vec::new();
    if backup.categories.is_some() {
        restored.push("categories");
    }
    if backup.users.is_some() {
        restored.push("users");
    }
    if backup.settings.is_some() {
        restored.push("settings");
    }
    if backup.transactions.is_some() {
        restored.push("transactions");
    }
    if backup.opening_balance.is_some() {
        restored.push("initialBalance");
    }
    tracing::info!(path = %path.display(), ?restored, "backup imported");

    if restored.is_empty() {
        writeln!(out, "nothing to import")?;
    } else {
        writeln!(out, "imported: {}", restored.join(", "))?;
    }
    Ok(())
}

pub fn clear<S: KeyValueStore>(state: &mut LocalState<S>, out: &mut impl Write) -> CliResult {
    state.clear_all()?;
    tracing::warn!("all local data cleared");
    writeln!(out, "all local data cleared")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use engine::{
        CategoryId, EngineError, Money, OpeningBalance, Role, Transaction, TransactionKind,
        UserStatus, default_categories, default_users, storage::MemoryStore,
    };

    use super::*;

    fn state() -> LocalState<MemoryStore> {
        LocalState::new(MemoryStore::default())
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("celengan-admin-{}-{name}", std::process::id()))
    }

    fn engine_err<'a>(err: &'a (dyn Error + Send + Sync + 'static)) -> &'a EngineError {
        err.downcast_ref::<EngineError>().unwrap()
    }

    fn expense(id: i64, major: i64, category: &str) -> Transaction {
        Transaction {
            id,
            kind: TransactionKind::Expense,
            amount: Money::from_major(major),
            category_id: CategoryId::new(category),
            description: format!("tx {id}"),
            occurred_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn add_category_derives_slug_id() {
        let mut state = state();
        let mut out = Vec::new();

        category_add(
            &mut state,
            NewCategory {
                name: "Pet Care".to_string(),
                kind: TransactionKind::Expense,
                color: "#ff9900".to_string(),
                icon: "paw".to_string(),
            },
            &mut out,
        )
        .unwrap();

        let categories = state.categories();
        assert_eq!(categories.len(), default_categories().len() + 1);
        assert!(categories.iter().any(|c| c.id.as_str() == "pet-care"));
        assert_eq!(output(out), "added category: pet-care\n");
    }

    #[test]
    fn duplicate_category_is_rejected_and_nothing_saved() {
        let mut state = state();
        let input = NewCategory {
            name: "Gym".to_string(),
            kind: TransactionKind::Expense,
            color: String::new(),
            icon: String::new(),
        };
        category_add(&mut state, input.clone(), &mut Vec::new()).unwrap();

        let err = category_add(&mut state, input, &mut Vec::new()).unwrap_err();
        assert!(matches!(engine_err(err.as_ref()), EngineError::ExistingKey(_)));
        assert_eq!(state.categories().len(), default_categories().len() + 1);
    }

    #[test]
    fn edit_and_delete_category() {
        let mut state = state();
        let id = default_categories()[0].id.to_string();

        category_edit(
            &mut state,
            &id,
            CategoryUpdate {
                name: Some("Renamed".to_string()),
                ..CategoryUpdate::default()
            },
            &mut Vec::new(),
        )
        .unwrap();
        let renamed = state.categories();
        assert_eq!(renamed[0].name, "Renamed");
        assert_eq!(renamed[0].id.as_str(), id);

        category_delete(&mut state, &id, &mut Vec::new()).unwrap();
        assert!(state.categories().iter().all(|c| c.id.as_str() != id));

        let err = category_delete(&mut state, &id, &mut Vec::new()).unwrap_err();
        assert!(matches!(engine_err(err.as_ref()), EngineError::KeyNotFound(_)));
    }

    #[test]
    fn add_user_with_taken_id_moves_past_max() {
        let mut state = state();
        let mut out = Vec::new();

        user_add(
            &mut state,
            1,
            NewUser {
                name: "Siti".to_string(),
                email: "siti@example.com".to_string(),
                role: Role::default(),
                status: UserStatus::default(),
            },
            &mut out,
        )
        .unwrap();

        let users = state.users();
        let max = default_users().iter().map(|u| u.id).max().unwrap();
        let added = users.last().unwrap();
        assert_eq!(added.id, max + 1);
        assert_eq!(added.role, Role::User);
        assert_eq!(added.status, UserStatus::Active);
        assert_eq!(output(out), format!("added user: {} <siti@example.com>\n", max + 1));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut state = state();
        let err = user_add(
            &mut state,
            1_700_000_000_000,
            NewUser {
                name: "Other admin".to_string(),
                email: "ADMIN@expensetracker.com".to_string(),
                role: Role::Admin,
                status: UserStatus::Active,
            },
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(engine_err(err.as_ref()), EngineError::ExistingKey(_)));
        assert_eq!(state.users().len(), default_users().len());
    }

    #[test]
    fn delete_unknown_user_fails() {
        let mut state = state();
        user_delete(&mut state, 2, &mut Vec::new()).unwrap();
        assert_eq!(state.users().len(), default_users().len() - 1);

        let err = user_delete(&mut state, 2, &mut Vec::new()).unwrap_err();
        assert!(matches!(engine_err(err.as_ref()), EngineError::KeyNotFound(_)));
    }

    #[test]
    fn settings_set_persists_and_rejects_unknown_keys() {
        let mut state = state();

        settings_set(&mut state, "themeMode", "dark", &mut Vec::new()).unwrap();
        settings_set(&mut state, "dataRetention", "30", &mut Vec::new()).unwrap();
        let mut out = Vec::new();
        settings_show(&state, &mut out).unwrap();
        let shown = output(out);
        assert!(shown.contains(r#""themeMode": "dark""#));
        assert!(shown.contains(r#""dataRetention": 30"#));

        let err = settings_set(&mut state, "fontSize", "12", &mut Vec::new()).unwrap_err();
        assert!(matches!(engine_err(err.as_ref()), EngineError::KeyNotFound(_)));
    }

    #[test]
    fn stats_report_average_and_top_categories() {
        let mut state = state();
        state
            .save_transactions(&[
                expense(1, 100_000, "food"),
                expense(2, 50_000, "transport"),
                expense(3, 30_000, "food"),
            ])
            .unwrap();

        let mut out = Vec::new();
        stats(&state, &mut out).unwrap();
        let report = output(out);

        assert!(report.contains("transactions:       3"));
        assert!(report.contains(&format!("average amount:     {}", Money::from_major(60_000))));
        let food = report.find("1. Makanan").unwrap();
        let transport = report.find("2. Transport").unwrap();
        assert!(food < transport);
    }

    #[test]
    fn export_then_import_restores_state() {
        let mut source = state();
        source.save_transactions(&[expense(7, 25_000, "food")]).unwrap();
        source
            .save_opening_balance(OpeningBalance::new(Money::from_major(500_000)).unwrap())
            .unwrap();

        let path = temp_path("roundtrip.json");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let written = export(&source, now, Some(&path), &mut Vec::new()).unwrap();
        assert_eq!(written, path);

        let mut target = state();
        let mut out = Vec::new();
        import(&mut target, &path, &mut out).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(target.transactions(), source.transactions());
        assert_eq!(target.opening_balance(), source.opening_balance());
        assert!(output(out).starts_with("imported: categories, users, settings"));
    }

    #[test]
    fn malformed_import_writes_nothing() {
        let mut state = state();
        state.save_transactions(&[expense(1, 10_000, "food")]).unwrap();

        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = import(&mut state, &path, &mut Vec::new()).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(matches!(engine_err(err.as_ref()), EngineError::Corrupted(_)));
        assert_eq!(state.transactions().len(), 1);
    }

    #[test]
    fn partial_import_keeps_other_collections() {
        let mut state = state();
        state.save_transactions(&[expense(1, 10_000, "food")]).unwrap();

        let path = temp_path("partial.json");
        fs::write(&path, r#"{"settings": {"themeMode": "dark"}}"#).unwrap();
        let mut out = Vec::new();
        import(&mut state, &path, &mut out).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(output(out), "imported: settings\n");
        assert_eq!(state.transactions().len(), 1);
        assert_eq!(state.settings().theme_mode, engine::ThemeMode::Dark);
    }

    #[test]
    fn clear_resets_to_defaults() {
        let mut state = state();
        state.save_transactions(&[expense(1, 10_000, "food")]).unwrap();
        state.save_users(&[]).unwrap();

        clear(&mut state, &mut Vec::new()).unwrap();

        assert!(state.transactions().is_empty());
        assert_eq!(state.users(), default_users());
        assert_eq!(state.categories(), default_categories());
    }
}
