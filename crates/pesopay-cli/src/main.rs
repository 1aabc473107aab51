//! PesoPay CLI - a terminal harness for the PesoPay client core.
//!
//! Drives the core library end-to-end: login/logout, the user profile,
//! and the linked card/account wallet. This is the development stand-in
//! for the mobile shell.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pesopay_core::{ApiClient, AuthManager, Config, KeyringStore, Session};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: pesopay <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login [email]   Sign in (password via prompt or PESOPAY_PASSWORD)");
    eprintln!("  logout          Clear the stored session");
    eprintln!("  profile         Show the authenticated user's profile");
    eprintln!("  cards           List linked cards");
    eprintln!("  accounts        List linked bank accounts");
    eprintln!();
    eprintln!("PESOPAY_API_URL overrides the backend base URL.");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    let mut config = Config::load()?;
    let session = Session::new(Arc::new(KeyringStore::new()));
    if let Err(e) = session.load() {
        warn!(error = %e, "Failed to restore persisted session");
    }

    let api = ApiClient::new(config.base_url(), session.watch())?;
    let manager = AuthManager::new(api.clone(), session);

    match command {
        "login" => login(&mut config, &manager, args.get(2).cloned()).await,
        "logout" => {
            manager.logout();
            println!("Logged out.");
            Ok(())
        }
        "profile" => profile(&manager).await,
        "cards" => cards(&manager, &api).await,
        "accounts" => accounts(&manager, &api).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(2);
        }
    }
}

async fn login(config: &mut Config, manager: &AuthManager, email_arg: Option<String>) -> Result<()> {
    let email = match email_arg
        .or_else(|| std::env::var("PESOPAY_EMAIL").ok().filter(|e| !e.is_empty()))
        .or_else(|| config.last_email.clone())
    {
        Some(email) => email,
        None => prompt_email()?,
    };

    let password = match std::env::var("PESOPAY_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password(format!("Password for {}: ", email))?,
    };

    let user = manager.login(&email, &password).await?;
    info!("Login successful");

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn profile(manager: &AuthManager) -> Result<()> {
    ensure_logged_in(manager)?;
    let user = manager.fetch_profile().await?;

    println!("Name:  {}", user.name);
    println!("Email: {}", user.email);
    if let Some(role) = user.role {
        println!("Role:  {}", role);
    }
    if let Some(created_at) = user.created_at {
        println!("Since: {}", created_at.format("%Y-%m-%d"));
    }
    Ok(())
}

async fn cards(manager: &AuthManager, api: &ApiClient) -> Result<()> {
    ensure_logged_in(manager)?;
    let cards = api.fetch_cards().await?;

    if cards.is_empty() {
        println!("No linked cards.");
        return Ok(());
    }
    for card in cards {
        println!(
            "{} {} ending {} (exp {:02}/{}){}",
            card.id,
            card.brand.as_deref().unwrap_or("card"),
            card.last4,
            card.exp_month,
            card.exp_year,
            if card.is_default { " [default]" } else { "" },
        );
    }
    Ok(())
}

async fn accounts(manager: &AuthManager, api: &ApiClient) -> Result<()> {
    ensure_logged_in(manager)?;
    let accounts = api.fetch_accounts().await?;

    if accounts.is_empty() {
        println!("No linked accounts.");
        return Ok(());
    }
    for account in accounts {
        println!(
            "{} {} {} ({}){}",
            account.id,
            account.bank_name,
            account.account_name,
            account.account_number_masked,
            if account.is_default { " [default]" } else { "" },
        );
    }
    Ok(())
}

fn ensure_logged_in(manager: &AuthManager) -> Result<()> {
    if !manager.is_logged_in() {
        anyhow::bail!("Not logged in. Run `pesopay login` first.");
    }
    Ok(())
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
