//! Command-line entry point for the user+books store.
//!
//! # Responsibility
//! - Resolve configuration from the environment, then apply flag overrides.
//! - Map each subcommand onto one `UserBookService` workflow over SQLite.
//!
//! # Invariants
//! - Successful responses go to stdout as JSON; errors go to stderr.
//! - Any failure exits with status 1.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use userbook_core::db::open_db;
use userbook_core::{
    core_version, init_logging, ping, CoreConfig, SqliteStorage, UserBookRequest,
    UserBookResponse, UserBookService, UserId,
};

/// `userbook` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "userbook",
    about = "Create, update, read and delete users together with their books",
    version
)]
struct CliArgs {
    /// SQLite database file. Falls back to `USERBOOK_DB_PATH`.
    #[arg(long = "db", value_name = "path", global = true)]
    db_path: Option<PathBuf>,
    /// Log level (`trace|debug|info|warn|error`). Falls back to `USERBOOK_LOG_LEVEL`.
    #[arg(long = "log-level", value_name = "level", global = true)]
    log_level: Option<String>,
    /// Rolling log file directory. Falls back to `USERBOOK_LOG_DIR`, then stderr.
    #[arg(long = "log-dir", value_name = "dir", global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print a linkage probe and the core version.
    Ping,
    #[command(flatten)]
    Store(StoreCommand),
}

/// Subcommands that open the database and run one workflow.
#[derive(Debug, Clone, Subcommand)]
enum StoreCommand {
    /// Create a user and its books from a JSON request.
    Create {
        /// Request body, e.g. `{"user": {...}, "books": [...]}`.
        #[arg(long = "json", value_name = "request")]
        json: String,
    },
    /// Upsert a user and replace its whole book set.
    Update {
        #[arg(long = "id", value_name = "user_id")]
        id: UserId,
        #[arg(long = "json", value_name = "request")]
        json: String,
    },
    /// Print a user id with the ids of the books it owns.
    Get {
        #[arg(long = "id", value_name = "user_id")]
        id: UserId,
    },
    /// Delete a user and every book it owns.
    Delete {
        #[arg(long = "id", value_name = "user_id")]
        id: UserId,
    },
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), String> {
    let config = resolve_config(CoreConfig::from_env(), &args)?;
    match args.command {
        Command::Ping => {
            println!("userbook_core ping={}", ping());
            println!("userbook_core version={}", core_version());
            Ok(())
        }
        Command::Store(command) => run_store(&config, command),
    }
}

fn run_store(config: &CoreConfig, command: StoreCommand) -> Result<(), String> {
    init_logging(&config.log)?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let mut conn = open_db(&config.db_path)
        .map_err(|err| format!("open database `{}`: {err}", config.db_path.display()))?;
    let storage = SqliteStorage::try_new(&mut conn).map_err(|err| err.to_string())?;
    let mut service = UserBookService::new(storage);

    match command {
        StoreCommand::Create { json } => {
            let request = parse_request(&json)?;
            let response = service
                .create_user_with_books(&request)
                .map_err(|err| err.to_string())?;
            print_response(&response)
        }
        StoreCommand::Update { id, json } => {
            let request = parse_request(&json)?;
            let response = service
                .update_user_with_books(&request, Some(id))
                .map_err(|err| err.to_string())?;
            print_response(&response)
        }
        StoreCommand::Get { id } => {
            let response = service
                .get_user_with_books(Some(id))
                .map_err(|err| err.to_string())?;
            print_response(&response)
        }
        StoreCommand::Delete { id } => service
            .delete_user_with_books(Some(id))
            .map_err(|err| err.to_string()),
    }
}

/// Applies flag overrides on top of environment configuration.
fn resolve_config(mut config: CoreConfig, args: &CliArgs) -> Result<CoreConfig, String> {
    if let Some(db_path) = &args.db_path {
        config.db_path = db_path.clone();
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    if let Some(log_dir) = &args.log_dir {
        // The logger only accepts absolute directories.
        config.log.log_dir = Some(if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()
                .map_err(|err| format!("resolve current directory: {err}"))?
                .join(log_dir)
        });
    }
    Ok(config)
}

fn parse_request(raw: &str) -> Result<UserBookRequest, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid request json: {err}"))
}

fn print_response(response: &UserBookResponse) -> Result<(), String> {
    let body = serde_json::to_string(response).map_err(|err| err.to_string())?;
    println!("{body}");
    Ok(())
}
