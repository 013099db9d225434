use std::{error::Error, io, path::PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{
    CategoryUpdate, NewCategory, NewUser, Role, TransactionKind, UserStatus,
    storage::{DEFAULT_DATA_PATH, LocalState},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;

#[derive(Parser, Debug)]
#[command(name = "celengan_admin")]
#[command(about = "Admin utilities for Celengan (categories, users, settings, backups)")]
struct Cli {
    /// Local data file (also read from `CELENGAN_DATA_FILE`).
    #[arg(long, env = "CELENGAN_DATA_FILE", default_value = DEFAULT_DATA_PATH)]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Category),
    User(User),
    Settings(Settings),
    /// Users, transaction count, average amount and top expense categories.
    Stats,
    /// Writes every collection to a JSON backup.
    Export {
        /// Defaults to `expense-tracker-backup-YYYY-MM-DD.json`.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Restores the collections present in a backup file.
    Import { file: PathBuf },
    /// Deletes all local data.
    Clear {
        /// Skip the confirmation prompts.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    List,
    Add(CategoryAddArgs),
    Edit(CategoryEditArgs),
    Delete { id: String },
}

#[derive(Args, Debug)]
struct CategoryAddArgs {
    #[arg(long)]
    name: String,
    /// income | expense
    #[arg(long, value_parser = parse_kind)]
    kind: TransactionKind,
    #[arg(long, default_value = "#667eea")]
    color: String,
    #[arg(long, default_value = "📦")]
    icon: String,
}

#[derive(Args, Debug)]
struct CategoryEditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_parser = parse_kind)]
    kind: Option<TransactionKind>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    icon: Option<String>,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    List,
    Add(UserAddArgs),
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct UserAddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// admin | user
    #[arg(long, default_value = "user", value_parser = parse_role)]
    role: Role,
    /// active | inactive
    #[arg(long, default_value = "active", value_parser = parse_status)]
    status: UserStatus,
}

#[derive(Args, Debug)]
struct Settings {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    /// Sets one preference by its JSON key, e.g. `themeMode dark`.
    Set { key: String, value: String },
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_status(raw: &str) -> Result<UserStatus, String> {
    UserStatus::try_from(raw).map_err(|err| err.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("celengan_admin=info,engine=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logging();
    let cli = Cli::parse();

    let mut state = LocalState::open(&cli.data_file)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Category(Category { command }) => match command {
            CategoryCommand::List => commands::category_list(&state, &mut out)?,
            CategoryCommand::Add(args) => commands::category_add(
                &mut state,
                NewCategory {
                    name: args.name,
                    kind: args.kind,
                    color: args.color,
                    icon: args.icon,
                },
                &mut out,
            )?,
            CategoryCommand::Edit(args) => commands::category_edit(
                &mut state,
                &args.id,
                CategoryUpdate {
                    name: args.name,
                    kind: args.kind,
                    color: args.color,
                    icon: args.icon,
                },
                &mut out,
            )?,
            CategoryCommand::Delete { id } => commands::category_delete(&mut state, &id, &mut out)?,
        },
        Command::User(User { command }) => match command {
            UserCommand::List => commands::user_list(&state, &mut out)?,
            UserCommand::Add(args) => commands::user_add(
                &mut state,
                Utc::now().timestamp_millis(),
                NewUser {
                    name: args.name,
                    email: args.email,
                    role: args.role,
                    status: args.status,
                },
                &mut out,
            )?,
            UserCommand::Delete { id } => commands::user_delete(&mut state, id, &mut out)?,
        },
        Command::Settings(Settings { command }) => match command {
            SettingsCommand::Show => commands::settings_show(&state, &mut out)?,
            SettingsCommand::Set { key, value } => {
                commands::settings_set(&mut state, &key, &value, &mut out)?
            }
        },
        Command::Stats => commands::stats(&state, &mut out)?,
        Command::Export { output } => {
            commands::export(&state, Utc::now(), output.as_deref(), &mut out)?;
        }
        Command::Import { file } => commands::import(&mut state, &file, &mut out)?,
        Command::Clear { yes } => {
            if !yes && !prompt::confirm_clear()? {
                eprintln!("aborted");
                std::process::exit(1);
            }
            commands::clear(&mut state, &mut out)?;
        }
    }

    Ok(())
}
