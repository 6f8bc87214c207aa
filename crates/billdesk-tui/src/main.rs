//! billdesk - a terminal client for the invoicing backend.
//!
//! Without arguments this opens the TUI at the login view. A route path
//! (`billdesk /templates/new/7`) opens that view instead, subject to the
//! access gate. `--status`, `--login` and `--logout` run without the TUI.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use billdesk_core::api::ApiClient;
use billdesk_core::auth::{flow, Credentials, HttpVerifier, LoginCompletion, SessionStatus, SessionStore};
use billdesk_core::config::{Config, ENV_PASSWORD};
use billdesk_core::gate::Route;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "billdesk.log";

const USAGE: &str = "\
Usage: billdesk [PATH]
       billdesk --status | --login | --logout

  PATH        Start at a route: /, /dashboard, /templates/new, /templates/new/<id>
  --status    Check the stored session and print the signed-in user
  --login     Sign in from the terminal
  --logout    Sign out and forget the stored session";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tui(Route),
    Status,
    Login,
    Logout,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Tui(Route::ENTRY)),
        [flag] if flag == "--status" => Ok(Command::Status),
        [flag] if flag == "--login" => Ok(Command::Login),
        [flag] if flag == "--logout" => Ok(Command::Logout),
        [flag] if flag == "--help" || flag == "-h" => Ok(Command::Help),
        [path] if !path.starts_with('-') => Route::parse(path)
            .map(Command::Tui)
            .ok_or_else(|| anyhow!("Unknown route: {}\n\n{}", path, USAGE)),
        _ => Err(anyhow!("Unrecognized arguments: {}\n\n{}", args.join(" "), USAGE)),
    }
}

fn env_filter() -> EnvFilter {
    // RUST_LOG controls the level (e.g. RUST_LOG=billdesk_core=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for the non-interactive commands
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file while the TUI owns the terminal. The guard must live
/// until shutdown so buffered lines are flushed.
fn init_file_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Logging disabled: cannot create {}: {}", log_dir.display(), e);
        return None;
    }
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Status => {
            init_stderr_tracing();
            print_status(Config::load_or_default()).await
        }
        Command::Login => {
            init_stderr_tracing();
            login_interactive(Config::load_or_default()).await
        }
        Command::Logout => {
            init_stderr_tracing();
            logout(Config::load_or_default()).await
        }
        Command::Tui(route) => run_tui(route).await,
    }
}

// ============================================================================
// TUI
// ============================================================================

async fn run_tui(route: Route) -> Result<()> {
    let config = Config::load_or_default();
    let _guard = config.log_dir().ok().and_then(|dir| init_file_tracing(&dir));
    info!(route = %route, "billdesk starting");

    // Build the app before touching the terminal so setup errors print normally
    let mut app = App::new(config, route)?;
    app.start_boot();

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

    info!("billdesk shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Redirects are applied before drawing so a gated view never renders
        app.sync_route();
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Yield so spawned tasks make progress between frames
        tokio::task::yield_now().await;

        app.check_background_tasks();
        app.maybe_revalidate();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// CLI commands
// ============================================================================

fn open_session(config: &Config) -> Result<(SessionStore, HttpVerifier)> {
    let api = ApiClient::new(&config.api_base_url(), config.timeout())?;
    Ok((SessionStore::new(config.credential_cache()?), HttpVerifier::new(api)))
}

async fn print_status(config: Config) -> Result<()> {
    let (mut store, verifier) = open_session(&config)?;
    let status = flow::boot(&mut store, &verifier).await;

    println!("Backend: {}", config.api_base_url());
    println!("Session: {}", status);
    if let Some(identity) = store.identity() {
        println!("{}", serde_json::to_string_pretty(identity)?);
    }
    Ok(())
}

async fn login_interactive(mut config: Config) -> Result<()> {
    let (mut store, verifier) = open_session(&config)?;

    if flow::boot(&mut store, &verifier).await == SessionStatus::Authenticated {
        let name = store.identity().map(|i| i.display_name()).unwrap_or_default();
        println!("Already signed in as {}", name);
        return Ok(());
    }

    println!("\n=== billdesk login ===\n");
    let email = prompt_email(config.login_email())?;
    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    println!("\nSigning in...");
    let credentials = Credentials::new(email.clone(), password);
    match flow::sign_in(&mut store, &verifier, &credentials).await {
        LoginCompletion::SignedIn => {
            config.last_email = Some(email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            let name = store.identity().map(|i| i.display_name()).unwrap_or_default();
            println!("Signed in as {}", name);
            Ok(())
        }
        LoginCompletion::Failed(failure) => Err(failure.into()),
        LoginCompletion::Discarded => Err(anyhow!("Login was superseded by another attempt")),
    }
}

fn prompt_email(default: Option<String>) -> Result<String> {
    match default {
        Some(ref email) => print!("Email [{}]: ", email),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if !input.is_empty() {
        Ok(input.to_string())
    } else {
        default.ok_or_else(|| anyhow!("Email is required"))
    }
}

async fn logout(config: Config) -> Result<()> {
    let (mut store, verifier) = open_session(&config)?;
    flow::sign_out(&mut store, &verifier).await;
    println!("Signed out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_args_opens_entry() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Tui(Route::Login));
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_args(&args(&["--status"])).unwrap(), Command::Status);
        assert_eq!(parse_args(&args(&["--login"])).unwrap(), Command::Login);
        assert_eq!(parse_args(&args(&["--logout"])).unwrap(), Command::Logout);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_route_path() {
        assert_eq!(
            parse_args(&args(&["/templates/new/7"])).unwrap(),
            Command::Tui(Route::EditTemplate(7))
        );
        assert_eq!(
            parse_args(&args(&["/dashboard"])).unwrap(),
            Command::Tui(Route::Dashboard)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_args(&args(&["/bills"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["--status", "--login"])).is_err());
    }
}
