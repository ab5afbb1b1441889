//! shopdb - Schema Lifecycle Tool
//!
//! Creates a two-table Customer/Order schema, seeds it with sample rows,
//! joins it back out, and drops it again, all from an interactive menu.
//!
//! Every menu action opens its own connection and releases it when done.
//! Any store error ends the program with a non-zero exit code.

mod config;
mod db;
mod error;
mod menu;
mod models;

use crate::config::Settings;
use crate::db::Store;
use crate::menu::Menu;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let store = Store::new(&settings.database)?;

    // The menu only needs the store once an operation is chosen.
    if let Err(e) = store.ping().await {
        warn!("⚠️  Cannot reach {} yet: {}", settings.database.display_target(), e);
    }

    // tokio's stdin reads on a blocking thread that cannot be cancelled. The
    // menu awaits every read before acting, so none is pending at exit.
    let stdin = BufReader::new(tokio::io::stdin());
    let mut menu = Menu::new(&store, stdin, std::io::stdout());

    if let Err(e) = menu.run().await {
        if e.is_foreign_key_violation() {
            error!("❌ Operation failed, an Order references a missing Customer: {}", e);
        } else {
            error!("❌ Operation failed: {}", e);
        }
        return Ok(ExitCode::FAILURE);
    }

    info!("👋 Menu closed");
    Ok(ExitCode::SUCCESS)
}

/// Initialize tracing on stderr so the menu keeps stdout to itself
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,shopdb=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
