//! imgmux-admin: maintenance commands against the imgmux store.

use std::io::BufRead;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use imgmux_core::cache::UserRecord;
use imgmux_core::{AppConfig, CacheDb, hash_password};

/// Environment variable read before falling back to stdin.
const PASSWORD_ENV: &str = "IMGMUX_ADMIN_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "imgmux-admin")]
#[command(about = "Manage users and cached responses for imgmux", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or replace a user; the password comes from IMGMUX_ADMIN_PASSWORD or stdin
    AddUser {
        username: String,

        /// Stored with the user, not enforced by the server
        #[arg(long, default_value_t = 0)]
        level: i64,
    },

    /// Delete expired cached responses now
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let db = CacheDb::open(&config.db_path).await?;

    match cli.command {
        Commands::AddUser { username, level } => {
            let password = read_password(std::env::var(PASSWORD_ENV).ok(), std::io::stdin().lock())?;
            add_user(&db, &username, &password, level).await?;
            println!("user {} saved", username.trim());
        }
        Commands::Purge => {
            let removed = db.purge_expired_responses().await?;
            println!("removed {removed} expired responses");
        }
    }

    Ok(())
}

/// Take the password from the environment, else the first line of `input`.
fn read_password(from_env: Option<String>, mut input: impl BufRead) -> Result<String> {
    if let Some(password) = from_env.filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn add_user(db: &CacheDb, username: &str, password: &str, level: i64) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        bail!("username must not be empty");
    }
    if password.is_empty() {
        bail!("password must not be empty");
    }

    let password_hash = hash_password(password)?;
    db.upsert_user(&UserRecord { username: username.to_string(), password_hash, level })
        .await?;

    tracing::info!(username, level, "user saved");
    Ok(())
}
