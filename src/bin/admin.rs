//! CLI administration tool for linkcache.
//!
//! Manages API tokens and exercises the shortener directly against the
//! configured stores, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token
//! cargo run --bin admin -- token create --name ci
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke ci
//!
//! # Shorten or look up a URL
//! cargo run --bin admin -- url shorten https://example.com
//! cargo run --bin admin -- url lookup Xk3_9a
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `linkcache::config`). `DATABASE_URL` (or `DB_*`)
//! and `TOKEN_SIGNING_SECRET` are required; the cache settings are honoured
//! by the `url` commands so their writes land in the same cache the server reads.

use linkcache::application::services::hash_token;
use linkcache::config::{self, Config};
use linkcache::domain::repositories::TokenRepository;
use linkcache::infrastructure::persistence::PgTokenRepository;
use linkcache::server::{build_cache, build_shortener, connect_pool};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkcache.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Shorten and resolve URLs
    Url {
        #[command(subcommand)]
        action: UrlAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Production API", "CI")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UrlAction {
    /// Shorten a URL (returns the existing short ID if already known)
    Shorten { url: String },

    /// Resolve a short ID
    Lookup { short_id: String },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &config, &pool).await?,
        Commands::Url { action } => handle_url_action(action, &config, pool.clone()).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    match action {
        TokenAction::Create { name, token, yes } => {
            create_token(&repo, &config.token_signing_secret, name, token, yes).await?;
        }
        TokenAction::List => {
            list_tokens(&repo).await?;
        }
        TokenAction::Revoke { name_or_id, yes } => {
            revoke_token(&repo, name_or_id, yes).await?;
        }
    }

    Ok(())
}

/// Creates a new API token.
///
/// Only the HMAC-SHA256 of the token (keyed by `TOKEN_SIGNING_SECRET`) is
/// stored; the raw value is shown once.
async fn create_token(
    repo: &PgTokenRepository,
    signing_secret: &str,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_token();
            println!("{}", "✨ Generated new token".green());
            generated
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(signing_secret, &token_value)
        .map_err(|e| anyhow::anyhow!("Failed to hash token: {}", e))?;

    repo.create_token(&token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -X POST -H \"Authorization: Bearer {}\" -H \"Content-Type: application/json\" \\",
        token_value.bright_yellow()
    );
    println!("       -d '{{\"url\":\"https://example.com\"}}' http://localhost:3000/api/shorten");
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<30} {:<18} {:<18} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(84).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<5} {:<30} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID. Numeric input is treated as an ID.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Revoke this token?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

async fn handle_url_action(action: UrlAction, config: &Config, pool: PgPool) -> Result<()> {
    let cache = build_cache(config).await;
    let shortener = build_shortener(config, Arc::new(pool), cache);

    let record = match action {
        UrlAction::Shorten { url } => shortener
            .shorten(&url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?,
        UrlAction::Lookup { short_id } => {
            let found = shortener
                .find_by_short_id(&short_id)
                .await
                .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

            match found {
                Some(record) => record,
                None => {
                    println!("{} {}", "❌ Not found:".red(), short_id.bright_white());
                    return Ok(());
                }
            }
        }
    };

    println!("  Short ID: {}", record.short_id.bright_yellow().bold());
    println!("  URL:      {}", record.original_url.cyan());
    println!(
        "  Created:  {}",
        record.created_at.to_rfc3339().bright_black()
    );
    if let Some(base) = &config.base_url {
        println!(
            "  Link:     {}/{}",
            base.trim_end_matches('/'),
            record.short_id
        );
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let urls_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
                .fetch_one(pool)
                .await?;

            let tokens_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!(
                "  URLs:          {}",
                urls_count.to_string().bright_green().bold()
            );
            println!(
                "  Active tokens: {}",
                tokens_count.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}

/// Generates a 48-character alphanumeric token (~286 bits of entropy).
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
