//! CLI administration tool for linkshort.
//!
//! Provides commands for managing user accounts, viewing statistics,
//! and performing database operations without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (prompts for missing values)
//! cargo run --bin admin -- user create --email alice@example.com
//!
//! # Create a user with a generated password
//! cargo run --bin admin -- user create --email bob@example.com --generate -y
//!
//! # List users
//! cargo run --bin admin -- user list
//!
//! # Show one user by id or email
//! cargo run --bin admin -- user show alice@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Apply pending migrations
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use linkshort::domain::entities::{NewUser, User};
use linkshort::domain::repositories::UserRepository;
use linkshort::infrastructure::persistence::PgUserRepository;
use linkshort::utils::password::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkshort.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a user account
    Create {
        /// Email address (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all users
    List,

    /// Show a single user
    Show {
        /// User id or email
        id_or_email: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

const MIN_PASSWORD_LEN: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));

    match action {
        UserAction::Create {
            email,
            generate,
            yes,
        } => create_user(repo, email, generate, yes).await?,
        UserAction::List => list_users(repo).await?,
        UserAction::Show { id_or_email } => show_user(repo, id_or_email).await?,
    }

    Ok(())
}

/// Creates a user account with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for email (or use provided)
/// 2. Generate a password or prompt for one twice
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Hash with Argon2id and store
///
/// A generated password is printed once and cannot be retrieved later.
async fn create_user(
    repo: Arc<PgUserRepository>,
    email: Option<String>,
    generate: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let email = email.trim().to_string();
    if !email.contains('@') {
        anyhow::bail!("Invalid email address: {}", email);
    }

    let password = if generate {
        let generated = generate_password();
        println!("{}", "✨ Generated password".green());
        println!("  Password: {}", generated.bright_yellow().bold());
        println!(
            "{}",
            "⚠️  Save this password now! It won't be shown again."
                .red()
                .bold()
        );
        generated
    } else {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .validate_with(|input: &String| -> Result<(), String> {
                if input.chars().count() >= MIN_PASSWORD_LEN {
                    Ok(())
                } else {
                    Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"))
                }
            })
            .interact()?
    };

    println!();
    println!("  Email: {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = hash_password(&password)?;

    let user = repo
        .create(NewUser {
            email,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!(
        "{} (id {})",
        "✅ User created successfully!".green().bold(),
        user.id.to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Lists all users.
///
/// # Output Format
///
/// ```text
/// 📋 Users
///
///   ID  Email                                    Created
///   ──────────────────────────────────────────────────────────────
///   1   alice@example.com                        2025-01-15 10:30
/// ```
async fn list_users(repo: Arc<PgUserRepository>) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<40} {:<20}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(66).bright_black());

    for user in &users {
        print_user_row(user);
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Shows a user and how many live links they own.
///
/// Numeric input is looked up by id, anything else by email.
async fn show_user(repo: Arc<PgUserRepository>, id_or_email: String) -> Result<()> {
    let user = match id_or_email.parse::<i64>() {
        Ok(id) => repo
            .find_by_id(id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        Err(_) => repo
            .find_by_email(&id_or_email)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
    };

    let user = user.context("User not found")?;

    println!("{}", "👤 User".bright_blue().bold());
    println!();
    println!("  ID:      {}", user.id.to_string().bright_white());
    println!("  Email:   {}", user.email.cyan());
    println!(
        "  Created: {}",
        user.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!();

    Ok(())
}

fn print_user_row(user: &User) {
    println!(
        "  {:<5} {:<40} {}",
        user.id.to_string().bright_black(),
        user.email.cyan(),
        user.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
}

/// Displays system statistics.
///
/// Shows:
/// - Number of users
/// - Live and deleted links
/// - Recorded redirects
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let live_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shortened_urls WHERE deleted_at IS NULL")
            .fetch_one(pool)
            .await?;

    let deleted_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shortened_urls WHERE deleted_at IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let accesses_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_accesses")
        .fetch_one(pool)
        .await?;

    println!(
        "  Users:         {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Live links:    {}",
        live_count.to_string().bright_green().bold()
    );
    println!(
        "  Deleted links: {}",
        deleted_count.to_string().bright_black()
    );
    println!(
        "  Redirects:     {}",
        accesses_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
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

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Migration failed")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

/// Generates a random password.
///
/// # Format
///
/// - Length: 20 characters
/// - Character set: A-Z, a-z, 0-9
fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const PASSWORD_LEN: usize = 20;

    let mut rng = rand::rng();

    (0..PASSWORD_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
