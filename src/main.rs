// src/main.rs
use account_dashboard::config::AppConfig;
use account_dashboard::connectors::{BackendClient, DashboardApi};
use account_dashboard::sync::{AggregateLoader, RefreshOutcome, StatsRefresher, ViewState};
use account_dashboard::tui;
use account_dashboard::types::normalize_symbol;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "account-dashboard", version, about = "Trading account dashboard")]
struct Cli {
    /// Backend base address (overrides APP_BACKEND__BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Initial symbol filter
    #[arg(long, short, global = true)]
    symbol: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal dashboard (default)
    Tui,
    /// Run one full refresh and print the snapshot as JSON
    Snapshot,
    /// Look up a single order by id
    Order { id: String },
}

fn init_logging(cfg: &AppConfig, to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level));

    if to_file {
        // The terminal belongs to the dashboard, so logs go to a rolling file.
        std::fs::create_dir_all(&cfg.log.directory)
            .with_context(|| format!("failed to create log directory {}", cfg.log.directory))?;
        let appender = tracing_appender::rolling::daily(&cfg.log.directory, "dashboard.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut cfg = AppConfig::new().context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        cfg.backend.base_url = base_url;
    }
    if let Some(symbol) = cli.symbol {
        cfg.dashboard.symbol = symbol;
    }
    let symbol = normalize_symbol(&cfg.dashboard.symbol);

    let command = cli.command.unwrap_or(Command::Tui);
    let _guard = init_logging(&cfg, matches!(command, Command::Tui))?;

    // 2. Initialize Components
    let client = BackendClient::new(&cfg.backend)?;
    info!(
        backend = %client.base_url(),
        symbol = %symbol,
        ordering = ?cfg.dashboard.refresh_ordering,
        "starting"
    );
    let api: Arc<dyn DashboardApi> = Arc::new(client);
    let state = ViewState::new();
    let loader = AggregateLoader::new(
        Arc::clone(&api),
        state.clone(),
        cfg.dashboard.refresh_ordering,
    );

    // 3. Run
    match command {
        Command::Tui => {
            let refresher = StatsRefresher::new(Arc::clone(&api), state.clone());
            let initial = loader.clone();
            let initial_symbol = symbol.clone();
            tokio::spawn(async move { initial.refresh(&initial_symbol).await });

            tui::run(
                loader,
                refresher,
                state.subscribe(),
                cfg.backend.base_url.clone(),
                symbol,
                Duration::from_millis(cfg.dashboard.tick_rate_ms),
            )
            .await?;
        }
        Command::Snapshot => {
            let outcome = loader.refresh(&symbol).await;
            println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
            if let RefreshOutcome::Failed(e) = outcome {
                bail!("refresh failed: {}", e);
            }
        }
        Command::Order { id } => {
            let order = api
                .fetch_order(&id)
                .await
                .with_context(|| format!("failed to fetch order {}", id))?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}
