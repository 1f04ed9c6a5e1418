// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{anyhow, Context, Result};
use avolta_core::models::{SubscriberFilter, UserStatus};
use avolta_core::Principal;
use avolta_db::repositories::{SessionRepository, UserRepository};
use avolta_db::{ensure_admin, ensure_superadmin, BootstrapOutcome};
use avolta_web::services::{
    LogNotificationSender, NewsletterService, PublicationService, UserService,
};
use avolta_web::Config;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_ADMIN_EMAIL: &str = "admin@avolta.be";

#[derive(Parser)]
#[command(name = "avolta")]
#[command(about = "Avolta publications backend administration")]
struct Cli {
    /// Database URL, overrides the configured one
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and make sure the superadmin account exists
    Init {
        /// Superadmin email (defaults to the configured one)
        #[arg(long)]
        superadmin_email: Option<String>,
        /// Superadmin password (configured value, else prompt)
        #[arg(long)]
        superadmin_password: Option<String>,
        /// Also create a demo administrator account
        #[arg(long)]
        with_demo_admin: bool,
    },

    /// Administrator accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Newsletter subscribers
    Newsletter {
        #[command(subcommand)]
        command: NewsletterCommands,
    },

    /// Publications awaiting moderation
    Pending,

    /// Remove expired login sessions
    PurgeSessions,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create an administrator account
    CreateAdmin {
        email: String,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// List every account
    List,

    /// Change an account password
    Password {
        email: String,
        /// New password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Activate or deactivate an administrator
    Status {
        email: String,
        /// active or inactive
        status: UserStatus,
    },
}

#[derive(Subcommand)]
enum NewsletterCommands {
    /// Export subscribers as CSV
    Export {
        /// all, confirmed or unconfirmed
        #[arg(long, default_value = "all")]
        filter: SubscriberFilter,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let database_url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| config.database_url.clone());

    // init_database also runs pending migrations
    let pool = avolta_db::init_database(&database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;

    match cli.command {
        Commands::Init {
            superadmin_email,
            superadmin_password,
            with_demo_admin,
        } => {
            println!("Database ready at: {}", database_url);

            let email = superadmin_email.unwrap_or_else(|| config.superadmin_email.clone());
            let password = match superadmin_password.or_else(|| config.superadmin_password.clone()) {
                Some(password) => password,
                None => prompt_password(&format!("Password for {}: ", email))?,
            };
            init_accounts(&pool, &email, &password, with_demo_admin).await
        }
        Commands::User { command } => handle_user_command(command, &pool).await,
        Commands::Newsletter { command } => match command {
            NewsletterCommands::Export { filter, output } => {
                let csv = export_subscribers(&pool, filter).await?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, csv)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        println!("Subscribers exported to {}", path.display());
                    }
                    None => print!("{}", csv),
                }
                Ok(())
            }
        },
        Commands::Pending => {
            let operator = operator_principal(&pool).await?;
            let pending = PublicationService::new(pool, Arc::new(LogNotificationSender))
                .list_pending(&operator)
                .await?;
            if pending.is_empty() {
                println!("No publications awaiting moderation");
            }
            for publication in pending {
                println!(
                    "#{} {} [{}] by {} <{}>",
                    publication.id.unwrap_or_default(),
                    publication.title,
                    publication.category,
                    publication.author_name,
                    publication.author_email
                );
            }
            Ok(())
        }
        Commands::PurgeSessions => {
            let removed = SessionRepository::new(pool).delete_expired().await?;
            println!("Removed {} expired session(s)", removed);
            Ok(())
        }
    }
}

async fn init_accounts(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    with_demo_admin: bool,
) -> Result<()> {
    match ensure_superadmin(pool, email, password).await? {
        BootstrapOutcome::Created(id) => println!("Superadmin {} created with ID: {}", email, id),
        BootstrapOutcome::AlreadyPresent(id) => println!("Superadmin already present (ID: {})", id),
    }

    if with_demo_admin {
        let password = prompt_password(&format!("Password for {}: ", DEMO_ADMIN_EMAIL))?;
        match ensure_admin(pool, DEMO_ADMIN_EMAIL, &password).await? {
            BootstrapOutcome::Created(id) => println!("Demo admin created with ID: {}", id),
            BootstrapOutcome::AlreadyPresent(_) => println!("Demo admin already present"),
        }
    }

    Ok(())
}

async fn handle_user_command(command: UserCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        UserCommands::CreateAdmin { email, password } => {
            let password = match password {
                Some(pwd) => pwd,
                None => prompt_password("Password: ")?,
            };
            let id = create_admin(pool, &email, &password).await?;
            println!("Admin created successfully with ID: {}", id);
            Ok(())
        }
        UserCommands::List => {
            let operator = operator_principal(pool).await?;
            for user in UserService::new(pool.clone()).list(&operator).await? {
                let last_login = user
                    .last_login
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "#{} {} {} {} (last login: {})",
                    user.id.unwrap_or_default(),
                    user.email,
                    user.role,
                    user.status,
                    last_login
                );
            }
            Ok(())
        }
        UserCommands::Password { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("New password: ")?,
            };
            change_password(pool, &email, &password).await?;
            println!("Password changed successfully!");
            Ok(())
        }
        UserCommands::Status { email, status } => {
            set_status(pool, &email, status).await?;
            println!("{} is now {}", email, status);
            Ok(())
        }
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    rpassword::read_password().context("Failed to read password")
}

/// The CLI acts with the authority of the stored superadmin
async fn operator_principal(pool: &SqlitePool) -> Result<Principal> {
    let root = UserRepository::new(pool.clone())
        .find_superadmin()
        .await?
        .ok_or_else(|| anyhow!("No superadmin account exists, run `avolta init` first"))?;
    Principal::from_user(&root).ok_or_else(|| anyhow!("Stored superadmin has no ID"))
}

async fn create_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<i64> {
    let operator = operator_principal(pool).await?;
    let user = UserService::new(pool.clone())
        .create_admin(&operator, email, password)
        .await?;
    user.id.ok_or_else(|| anyhow!("Created user has no ID"))
}

async fn change_password(pool: &SqlitePool, email: &str, password: &str) -> Result<()> {
    let operator = operator_principal(pool).await?;
    let service = UserService::new(pool.clone());
    let user = service.find_by_email(&operator, email).await?;
    let id = user.id.ok_or_else(|| anyhow!("User has no ID"))?;
    service.reset_password(&operator, id, password).await?;
    Ok(())
}

async fn set_status(pool: &SqlitePool, email: &str, status: UserStatus) -> Result<()> {
    let operator = operator_principal(pool).await?;
    let service = UserService::new(pool.clone());
    let user = service.find_by_email(&operator, email).await?;
    let id = user.id.ok_or_else(|| anyhow!("User has no ID"))?;
    service.set_status(&operator, id, status).await?;
    Ok(())
}

async fn export_subscribers(pool: &SqlitePool, filter: SubscriberFilter) -> Result<String> {
    let csv = NewsletterService::new(pool.clone(), Arc::new(LogNotificationSender))
        .export_csv(filter)
        .await?;
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avolta_core::models::{NewsletterSubscriber, Role};
    use avolta_db::connect_in_memory;
    use avolta_db::repositories::SubscriberRepository;

    async fn initialized_pool() -> Result<SqlitePool> {
        let pool = connect_in_memory().await?;
        init_accounts(&pool, "superadmin@avolta.be", "password123", false).await?;
        Ok(pool)
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["avolta", "user", "status", "jane@avolta.be", "inactive"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::User {
                command: UserCommands::Status {
                    status: UserStatus::Inactive,
                    ..
                }
            }
        ));

        let cli = Cli::try_parse_from([
            "avolta",
            "--database-url",
            "sqlite::memory:",
            "newsletter",
            "export",
            "--filter",
            "confirmed",
        ])
        .unwrap();
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        assert!(matches!(
            cli.command,
            Commands::Newsletter {
                command: NewsletterCommands::Export {
                    filter: SubscriberFilter::Confirmed,
                    output: None
                }
            }
        ));

        assert!(Cli::try_parse_from(["avolta", "user", "status", "jane@avolta.be", "banned"]).is_err());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() -> Result<()> {
        let pool = connect_in_memory().await?;

        init_accounts(&pool, "superadmin@avolta.be", "password123", false).await?;
        init_accounts(&pool, "superadmin@avolta.be", "password123", false).await?;

        let repo = UserRepository::new(pool);
        assert_eq!(repo.count_by_role(Role::SuperAdmin).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_admin_and_change_password() -> Result<()> {
        let pool = initialized_pool().await?;

        create_admin(&pool, "jane@avolta.be", "password123").await?;
        assert!(create_admin(&pool, "jane@avolta.be", "password123").await.is_err());
        assert!(create_admin(&pool, "john@avolta.be", "short").await.is_err());

        change_password(&pool, "jane@avolta.be", "another-password").await?;
        let user = UserRepository::new(pool.clone())
            .find_by_email("jane@avolta.be")
            .await?
            .unwrap();
        assert!(user.verify_password("another-password")?);
        assert!(change_password(&pool, "ghost@avolta.be", "another-password").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_superadmin_cannot_be_deactivated() -> Result<()> {
        let pool = initialized_pool().await?;
        create_admin(&pool, "jane@avolta.be", "password123").await?;

        assert!(set_status(&pool, "superadmin@avolta.be", UserStatus::Inactive).await.is_err());

        let jane = UserRepository::new(pool.clone())
            .find_by_email("jane@avolta.be")
            .await?
            .unwrap();
        let session = avolta_core::models::Session::new(jane.id.unwrap());
        SessionRepository::new(pool.clone()).create(&session).await?;

        set_status(&pool, "jane@avolta.be", UserStatus::Inactive).await?;
        let jane = UserRepository::new(pool.clone())
            .find_by_email("jane@avolta.be")
            .await?
            .unwrap();
        assert_eq!(jane.status, UserStatus::Inactive);
        assert!(SessionRepository::new(pool)
            .find_by_id(&session.id)
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_account_commands_need_initialized_database() -> Result<()> {
        let pool = connect_in_memory().await?;

        let err = create_admin(&pool, "jane@avolta.be", "password123")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("avolta init"));
        Ok(())
    }

    #[tokio::test]
    async fn test_export_writes_csv_file() -> Result<()> {
        let pool = connect_in_memory().await?;
        let repo = SubscriberRepository::new(pool.clone());
        repo.create(&NewsletterSubscriber::new("alice@example.com", Some("Alice"), None)?)
            .await?;

        let csv = export_subscribers(&pool, SubscriberFilter::All).await?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("subscribers.csv");
        std::fs::write(&path, &csv)?;

        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("alice@example.com"));
        assert_eq!(written.lines().count(), 2);

        let none = export_subscribers(&pool, SubscriberFilter::Unconfirmed).await?;
        assert_eq!(none.lines().count(), 1);
        Ok(())
    }
}
