//! Operator CLI for schema migrations and reference data.
//!
//! Every subcommand prints its result as JSON on stdout; logs go to stderr.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use qna_backend::domain::full_self_test;
use qna_backend::domain::migrations::MigrationService;
use qna_backend::domain::ports::{SchemaMigrations, TestDataCommand};
use qna_backend::domain::test_data::{TestDataService, TestUserRequest};
use qna_backend::domain::{LoginId, Role};
use qna_backend::outbound::persistence::{
    DbPool, DieselMigrationStore, DieselTestDataRepository, PoolConfig, migration_catalogue,
};
use qna_backend::outbound::security::Argon2PasswordHasher;

/// `qna-migrate` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "qna-migrate",
    about = "Apply schema migrations and manage reference data",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Show executed and pending migrations.
    Status,
    /// Apply every pending migration.
    Run,
    /// Apply pending migrations up to and including NAME.
    RunTo {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Revert the most recently executed migration.
    Revert,
    /// Create the migration log and apply pending migrations.
    Init,
    /// Seed the reference users, questions and answers.
    Seed,
    /// Delete all users, questions and answers.
    Clear,
    /// Check the reference users are present.
    Validate,
    /// Count users by role.
    Stats,
    /// Exercise every registered migration and report per-migration results.
    Test,
    /// Initialise, test migrations, validate users and check the connection.
    FullTest,
    /// Create a single user; unspecified fields are derived from the login id.
    CreateUser {
        #[arg(long = "login-id", value_name = "id", value_parser = parse_login_id)]
        login_id: LoginId,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// USER, ADMIN or RELATIONSHIP_MANAGER.
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> Result<()> {
    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(2))
        .await
        .wrap_err("create database pool")?;

    let registry = migration_catalogue::registry().wrap_err("load migration catalogue")?;
    let migrations = MigrationService::new(Arc::new(DieselMigrationStore::new(pool.clone())), registry);
    let test_data = TestDataService::new(
        Arc::new(DieselTestDataRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::new()),
    );

    execute(args.command, &migrations, &test_data).await
}

async fn execute(
    command: Command,
    migrations: &dyn SchemaMigrations,
    test_data: &dyn TestDataCommand,
) -> Result<()> {
    match command {
        Command::Status => print_json(&migrations.status().await?),
        Command::Run => print_json(&migrations.run_all().await?),
        Command::RunTo { name } => print_json(&migrations.run_to(&name).await?),
        Command::Revert => print_json(&migrations.undo_last().await?),
        Command::Init => print_json(&migrations.initialize().await?),
        Command::Seed => print_json(&test_data.seed().await?),
        Command::Clear => {
            test_data.clear().await?;
            print_json(&serde_json::json!({ "cleared": true }))
        }
        Command::Validate => {
            let report = test_data.validate_users().await;
            print_json(&report)?;
            ensure(report.is_valid, "user data validation failed")
        }
        Command::Stats => print_json(&test_data.stats().await?),
        Command::Test => {
            let report = migrations.test_migrations().await?;
            print_json(&report)?;
            ensure(report.success, "migration test reported failures")
        }
        Command::FullTest => {
            let report = full_self_test(migrations, test_data).await?;
            print_json(&report)?;
            ensure(report.success, "full self-test reported failures")
        }
        Command::CreateUser {
            login_id,
            password,
            name,
            email,
            phone,
            role,
        } => {
            let request = TestUserRequest {
                password,
                name,
                email,
                phone,
                role,
                ..TestUserRequest::new(login_id)
            };
            print_json(&test_data.create_user(request).await?)
        }
    }
}

fn ensure(ok: bool, message: &'static str) -> Result<()> {
    if ok { Ok(()) } else { Err(eyre!(message)) }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("render JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn parse_login_id(raw: &str) -> Result<LoginId, String> {
    LoginId::new(raw).map_err(|error| error.to_string())
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|error: qna_backend::domain::UserValidationError| error.to_string())
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL")
        .map_err(|_| eyre!("database URL missing: set --database-url or DATABASE_URL"))?;
    if from_env.trim().is_empty() {
        return Err(eyre!("DATABASE_URL must not be empty"));
    }
    Ok(from_env)
}
