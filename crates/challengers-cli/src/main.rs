//! Challengers command-line client.
//!
//! Creates accounts, checks the stored session and runs guarded navigation
//! against the challengers account service.

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use challengers_core::auth::{NavigationOutcome, TokenStore};
use challengers_core::config::Config;
use challengers_core::routes::PendingNavigation;
use challengers_core::Client;

#[derive(Parser)]
#[command(name = "challengers", version, about = "Challengers client: accounts and guarded navigation")]
struct Cli {
    /// Account service base URL (overrides config and CHALLENGERS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show whether a session is stored and still accepted
    Status,
    /// Navigate to a location through the route guard
    Open {
        /// Location such as `/game/1`
        location: String,
    },
    /// Create an account and store its session token
    Create {
        /// Display name; defaults to the last one used
        name: Option<String>,
        /// Location to continue to afterwards, either a path or an
        /// `/account/create?redirectTo=...` location printed by `open`
        #[arg(long)]
        resume: Option<String>,
    },
    /// Forget the stored session
    Logout,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    debug!(api = %config.api_base_url, backend = ?config.token_backend, "Config loaded");

    let client = Client::new(&config)?;

    match cli.command {
        Command::Status => status(&client).await,
        Command::Open { location } => {
            report(client.guard.navigate(&location).await);
            Ok(())
        }
        Command::Create { name, resume } => create(&client, &mut config, name, resume).await,
        Command::Logout => {
            client.store.clear()?;
            println!("Logged out");
            Ok(())
        }
    }
}

async fn status(client: &Client) -> Result<()> {
    if client.store.read().is_none() {
        println!("No session stored");
        return Ok(());
    }

    if client.verifier.is_authenticated().await {
        println!("Authenticated");
    } else {
        println!("Session rejected by the account service and removed");
    }
    Ok(())
}

async fn create(
    client: &Client,
    config: &mut Config,
    name: Option<String>,
    resume: Option<String>,
) -> Result<()> {
    let name = name
        .or_else(|| config.last_name.clone())
        .ok_or_else(|| anyhow::anyhow!("A display name is required"))?;

    let previous = client.store.read();
    eprintln!("Creating account for {}...", name);
    client.accounts.create(&name).await;

    let current = client.store.read();
    if current.is_none() || current == previous {
        anyhow::bail!("Account creation failed, no new session was stored");
    }
    println!("Account created");
    info!("Session established");

    config.last_name = Some(name);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    if let Some(resume) = resume {
        let pending =
            PendingNavigation::from_location(&resume).or_else(|| PendingNavigation::new(&resume));
        if pending.is_none() {
            warn!(resume = %resume, "Ignoring resume target outside the application");
        }
        report(client.guard.resume(pending.as_ref()).await);
    }
    Ok(())
}

fn report(outcome: NavigationOutcome) {
    match outcome {
        NavigationOutcome::Allowed(route) => {
            println!("Allowed: {} ({})", route.location, route.route.name);
            for (key, value) in &route.params {
                println!("  {} = {}", key, value);
            }
        }
        NavigationOutcome::Redirected { location, pending } => {
            println!("Redirected to {}", location);
            if let Some(pending) = pending {
                println!("  resume with: challengers create <name> --resume '{}'", pending.target());
            }
        }
        NavigationOutcome::NotFound(location) => println!("Not found: {}", location),
    }
}
