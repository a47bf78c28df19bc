//! CLI administration tool for url-shortener.
//!
//! Creates links, shows click statistics and performs database checks
//! without the server running.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- create https://example.com/some/long/path
//!
//! # Show clicks for a short code
//! cargo run --bin admin -- stats abc123
//!
//! # List all links (optionally as JSON)
//! cargo run --bin admin -- list --json
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same database variables as the server (`DATABASE_URL` or `DB_*`), plus
//! `SHORT_CODE_LENGTH` and `MAX_ALLOCATION_RETRIES` for `create`.

use url_shortener::config::{self, Config};
use url_shortener::domain::click_queue::ClickQueue;
use url_shortener::error::AppError;
use url_shortener::server::{build_state, connect_database};
use url_shortener::state::AppState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Create {
        /// The long URL (http or https)
        url: String,
    },

    /// Show click statistics for a short code
    Stats {
        /// Short code to look up
        code: String,
    },

    /// List all links
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

/// One row of `list --json`.
#[derive(Serialize)]
struct LinkRow {
    code: String,
    long_url: String,
    created_at: String,
    total_clicks: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Invalid configuration")?;

    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Create { url } => create_link(&state(&pool, &config), &url).await?,
        Commands::Stats { code } => show_stats(&state(&pool, &config), &code).await?,
        Commands::List { json } => list_links(&state(&pool, &config), json).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &config).await?,
    }

    Ok(())
}

/// Services over the database. The admin tool never records clicks, so the
/// queue is unused and has no workers.
fn state(pool: &PgPool, config: &Config) -> AppState {
    build_state(
        Arc::new(pool.clone()),
        Arc::new(ClickQueue::new(1)),
        config,
    )
}

async fn create_link(state: &AppState, url: &str) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    match state.link_service.create_unique_link(url).await {
        Ok(link) => {
            println!("{}", "✅ Link created".green().bold());
            println!("  Code: {}", link.code.bright_yellow().bold());
            println!("  URL:  {}", link.long_url.cyan());
            println!();
            Ok(())
        }
        Err(AppError::Validation { message, details }) => {
            println!("{} {}", "❌".red(), message.red());
            println!("  {}", details.to_string().bright_black());
            anyhow::bail!("Invalid URL: {url}")
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create link: {e}")),
    }
}

async fn show_stats(state: &AppState, code: &str) -> Result<()> {
    println!("{}", "📊 Link Statistics".bright_blue().bold());
    println!();

    let stats = match state.stats_service.get_link_stats(code).await {
        Ok(stats) => stats,
        Err(AppError::NotFound { .. }) => {
            println!("  {}", format!("No link with code '{code}'").yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load statistics: {e}")),
    };

    println!("  Code:    {}", stats.link.code.bright_yellow());
    println!("  URL:     {}", stats.link.long_url.cyan());
    println!(
        "  Created: {}",
        stats
            .link
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!(
        "  Clicks:  {}",
        stats.total_clicks.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Lists all links with their click counts.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code       Clicks   Created            URL
///   ──────────────────────────────────────────────────────────
///   abc123     42       2025-01-15 10:30   https://example.com/
/// ```
async fn list_links(state: &AppState, json: bool) -> Result<()> {
    let links = state
        .link_service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {e}"))?;

    let mut rows = Vec::with_capacity(links.len());
    for link in links {
        let total_clicks = state
            .stats_service
            .count_clicks(link.id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to count clicks: {e}"))?;
        rows.push(LinkRow {
            code: link.code,
            long_url: link.long_url,
            created_at: link.created_at.to_rfc3339(),
            total_clicks,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    if rows.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- create <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<10} {:<8} {:<25} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for row in &rows {
        println!(
            "  {:<10} {:<8} {:<25} {}",
            row.code.bright_yellow(),
            row.total_clicks.to_string().bright_green(),
            row.created_at.bright_black(),
            row.long_url.cyan()
        );
    }

    println!();
    println!("  Total: {}", rows.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());
            println!(
                "  {}",
                config::mask_connection_string(&config.database_url).bright_black()
            );

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;
            let clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green().bold());
            println!("  Clicks:     {}", clicks.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
