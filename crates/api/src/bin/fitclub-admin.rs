//! Account and schema administration for the club database.
//!
//! ```bash
//! fitclub-admin migrate
//! fitclub-admin create-user --username front-desk --password s3cret --email desk@club.example
//! ```

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use fitclub_auth::NewUserRequest;
use fitclub_infra::{AppConfig, ClubStore, PostgresClubStore};
use fitclub_observability::LogFormat;

#[derive(Parser)]
#[command(name = "fitclub-admin", about = "Fitness club administration")]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Apply the database schema
    Migrate,

    /// Create a user account that can obtain API tokens
    CreateUser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    fitclub_observability::init(LogFormat::Pretty);

    let database_url = args
        .database_url
        .or(config.database_url)
        .ok_or_else(|| anyhow!("DATABASE_URL is required (or pass --database-url)"))?;

    let store = PostgresClubStore::connect(&database_url, 1)
        .await
        .context("failed to connect to postgres")?;
    store.migrate().await.context("failed to apply schema")?;

    match args.command {
        AdminCommand::Migrate => {
            tracing::info!("schema applied");
        }
        AdminCommand::CreateUser {
            username,
            password,
            email,
            first_name,
            last_name,
        } => {
            let new_user = NewUserRequest {
                username,
                password,
                email,
                first_name,
                last_name,
            }
            .into_new_user()?;
            let account = store.create_user(new_user).await?;
            tracing::info!(user_id = %account.id(), username = account.username(), "user created");
        }
    }

    Ok(())
}
