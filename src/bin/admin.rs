//! Maintenance commands for a TaskKeeper database.
//!
//! ```text
//! taskkeeper-admin [--database-url URL] migrate
//! taskkeeper-admin seed
//! taskkeeper-admin clean --yes
//! taskkeeper-admin delete-user alice@example.com
//! ```

use clap::{Parser, Subcommand};
use std::fmt;
use std::process::ExitCode;

use taskkeeper::auth::hash_password;
use taskkeeper::config::DatabaseConfig;
use taskkeeper::error::AppError;
use taskkeeper::models::{NewTask, TaskStatus};
use taskkeeper::store::{PgStore, Store};

#[derive(Parser)]
#[command(name = "taskkeeper-admin", about = "TaskKeeper database maintenance")]
struct Cli {
    /// Database to operate on.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Insert demo users and tasks into an empty database.
    Seed,
    /// Delete every user and task.
    Clean {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Delete one user together with all of their tasks.
    DeleteUser { email: String },
}

/// Why a maintenance command did not complete.
#[derive(Debug)]
enum AdminError {
    /// The command needs explicit confirmation that was not given.
    Refused(&'static str),
    App(AppError),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AdminError::Refused(reason) => f.write_str(reason),
            AdminError::App(e) => write!(f, "{}", e),
        }
    }
}

impl From<AppError> for AdminError {
    fn from(error: AppError) -> Self {
        AdminError::App(error)
    }
}

struct SeedUser {
    email: &'static str,
    password: &'static str,
    tasks: &'static [(&'static str, &'static str, TaskStatus)],
}

const SEED_USERS: [SeedUser; 2] = [
    SeedUser {
        email: "alice@example.com",
        password: "password123",
        tasks: &[
            ("Buy groceries", "Milk, Bread, Eggs", TaskStatus::Todo),
            ("Walk the dog", "Take the dog to the park", TaskStatus::Done),
        ],
    },
    SeedUser {
        email: "bob@example.com",
        password: "securepass",
        tasks: &[(
            "Complete project report",
            "Finish the annual report analysis",
            TaskStatus::InProgress,
        )],
    },
];

async fn seed(store: &PgStore) -> Result<(), AppError> {
    if store.count_users().await? > 0 {
        log::info!("database already contains data, skipping seed");
        return Ok(());
    }

    for seed_user in &SEED_USERS {
        let user = store
            .create_user(seed_user.email, &hash_password(seed_user.password)?)
            .await?;
        for (title, description, status) in seed_user.tasks {
            store
                .create_task(
                    user.id,
                    NewTask {
                        title: title.to_string(),
                        description: Some(description.to_string()),
                        status: *status,
                    },
                )
                .await?;
        }
        log::info!("seeded {} ({}) with {} tasks", user.email, user.id, seed_user.tasks.len());
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AdminError> {
    if let Command::Clean { yes: false } = cli.command {
        return Err(AdminError::Refused(
            "refusing to delete all data without --yes",
        ));
    }

    let store = PgStore::connect(&DatabaseConfig::new(cli.database_url)).await?;

    match cli.command {
        Command::Migrate => {
            store.migrate().await?;
            log::info!("migrations applied");
        }
        Command::Seed => seed(&store).await?,
        Command::Clean { .. } => {
            store.clear_all().await?;
            log::info!("database cleaned");
        }
        Command::DeleteUser { email } => match store.find_user_by_email(&email).await? {
            Some(user) => {
                store.delete_user(user.id).await?;
                log::info!("deleted user {} and their tasks", email);
            }
            None => {
                return Err(AppError::NotFound(format!("no user with email {}", email)).into())
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
