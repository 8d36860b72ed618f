//! Sprout - a terminal starter app with a welcome screen and sign-in.
//!
//! The UI runs on a single loop; login requests run as background tasks
//! so the screen stays responsive while they are in flight.

mod app;
mod cli;
mod routes;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sprout_core::{
    ApiClient, Config, KeyringStorage, LoginCoordinator, LoginCredentials, MemoryStorage,
    SecureStorage, SessionStore,
};

use app::{App, AppState};
use cli::{Cli, Command};
use routes::Route;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the cache directory
const LOG_FILE: &str = "sprout.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file in the cache directory so they never draw over the
/// terminal UI. Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::sink))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing();
    info!("Sprout starting");

    let config = Config::load_or_default();
    let storage = open_storage(cli.ephemeral);

    match cli.command() {
        Command::Tui { start } => run_tui(config, storage, start).await?,
        Command::Login => login_from_prompt(config, storage).await?,
        Command::Logout => logout(storage).await?,
        Command::Whoami => whoami(storage),
    }

    info!("Sprout shutting down");
    Ok(())
}

fn open_storage(ephemeral: bool) -> Arc<dyn SecureStorage> {
    if ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(KeyringStorage::new())
    }
}

async fn run_tui(config: Config, storage: Arc<dyn SecureStorage>, start: Route) -> Result<()> {
    let mut app = App::new(config, storage)?;
    if start != Route::Index {
        app.navigate(start);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Sign in from a terminal prompt (no TUI).
async fn login_from_prompt(mut config: Config, storage: Arc<dyn SecureStorage>) -> Result<()> {
    let email = prompt_email(config.last_email.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;

    let api = ApiClient::from_config(&config)?;
    let store = SessionStore::restore(storage);
    let login =
        LoginCoordinator::new(api, store).with_retry_policy(config.login_retry_policy());

    println!("\nSigning in to {}...", config.api_base_url());

    match login.submit(LoginCredentials::new(email, password)).await {
        Ok(user) => {
            config.last_email = Some(user.email.clone());
            config.save().context("Failed to save config")?;
            println!("Signed in as {} <{}>", user.display_name(), user.email);
            Ok(())
        }
        Err(e) => {
            let message = login
                .status()
                .error_message()
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string());
            Err(anyhow::anyhow!(message))
        }
    }
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_email {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

async fn logout(storage: Arc<dyn SecureStorage>) -> Result<()> {
    let store = SessionStore::restore(storage);
    store
        .clear_session()
        .await
        .context("Signed out, but the saved token could not be removed")?;
    println!("Signed out");
    Ok(())
}

fn whoami(storage: Arc<dyn SecureStorage>) {
    let store = SessionStore::restore(storage);
    match store.user() {
        Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
        None => println!("Not signed in"),
    }
}
