//! loginpage - a terminal login form for the login page backend.
//!
//! The form posts credentials to the backend, stores the returned session
//! token, and switches to a dashboard that verifies the token.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use loginpage_core::{ApiClient, Config};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory
const LOG_FILE: &str = "loginpage.log";

/// Initialize the tracing subscriber for logging.
///
/// The TUI owns the terminal, so logs go to a file in `log_dir`.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

/// Logging for the one-shot CLI commands
fn init_cli_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--health" {
        init_cli_tracing();
        return check_health(&config).await;
    }
    if args.len() > 1 && args[1] == "--register" {
        init_cli_tracing();
        return register_interactive(&config).await;
    }

    let log_dir = config.cache_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let _log_guard = init_tracing(&log_dir);
    info!("loginpage starting");

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
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

    info!("loginpage shutting down");
    Ok(())
}

/// Print the backend's health status
async fn check_health(config: &Config) -> Result<()> {
    let api = ApiClient::new(config.api_base_url())?;
    eprintln!("Checking {} ...", api.base_url());

    let health = api.health().await?;
    println!(
        "{}: {}",
        health.status,
        health.message.as_deref().unwrap_or("(no message)")
    );

    if !health.is_healthy() {
        anyhow::bail!("Backend reported status {}", health.status);
    }
    Ok(())
}

/// Create an account from the terminal
async fn register_interactive(config: &Config) -> Result<()> {
    println!("\n=== Register ===\n");

    let email = prompt("Email: ")?;
    let name = prompt("Name: ")?;
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let api = ApiClient::new(config.api_base_url())?;
    println!("\nRegistering...");
    let user = api.register(&email, &password, &name).await?;

    // Pre-fill the login form next time
    let mut config = config.clone();
    config.last_email = Some(user.email.clone());
    config.save()?;

    println!("Registration successful! Welcome, {}.\n", user.name);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Pick up finished requests and scheduled navigation
        app.check_background_tasks().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
