//! Spice Hub CLI - migrations, catalog seeding, and back-office chores.
//!
//! # Usage
//!
//! ```bash
//! # Apply the API database migrations
//! spice-cli migrate
//!
//! # Load categories, products, meals, and health bundles from YAML
//! spice-cli seed --file catalog.yaml
//!
//! # Give an existing account the admin role
//! spice-cli users promote --email grace@example.com
//!
//! # Export pending orders through the REST API
//! spice-cli orders export --format csv --status pending --output pending.csv
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "spice-cli")]
#[command(author, version, about = "Spice Hub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert a catalog from a YAML file
    Seed {
        /// Path to the catalog file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Work with orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Change the role of an existing user
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New role (`admin`, `user`, `guest`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Write an orders export file
    Export {
        /// REST API base URL
        #[arg(long, env = "API_URL", default_value = "http://localhost:8000")]
        api_url: String,

        /// Admin bearer token for the API
        #[arg(long, env = "API_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// `csv` or `excel`
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Order status to keep, or `all`
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Output path. Defaults to a dated file in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::catalog(&file).await?;
        }
        Commands::Users { action } => match action {
            UserAction::Promote { email, role } => {
                commands::users::promote(&email, &role).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::Export {
                api_url,
                token,
                format,
                status,
                output,
            } => {
                commands::orders::export(&api_url, token, &format, &status, output).await?;
            }
        },
    }
    Ok(())
}
