//! Entry point for the `clipboard` command.
//!
//! Without a subcommand this opens the interactive history browser; the
//! subcommands manage the background listener and the history file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use clipboard_history::config::{Config, DEFAULT_POLL_INTERVAL_MS};
use clipboard_history::sampler::{self, Sampler};
use clipboard_history::session::BrowserSession;
use clipboard_history::utils::context::Context;
use clipboard_history::utils::logger;
use clipboard_history::{App, MAX_ENTRIES, SystemClipboard, store, supervisor};

#[derive(Parser, Debug)]
#[command(name = "clipboard")]
#[command(version, about = "Clipboard history listener and browser")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: GlobalOptions,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the background listener, replacing any running instance
    Listen,
    /// Stop the background listener
    Kill,
    /// Truncate the clipboard history
    Clear,
    /// Show whether the listener is running and how many entries are stored
    Status,
    /// Run the listener in the foreground (used by `listen`)
    #[command(name = "sample", hide = true)]
    Sample,
}

#[derive(Args, Debug)]
struct GlobalOptions {
    /// Directory holding the history file, PID file and logs
    #[arg(long, env = "CLIPBOARD_HISTORY_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Maximum number of entries kept in the history
    #[arg(long, env = "CLIPBOARD_HISTORY_MAX", default_value_t = MAX_ENTRIES, global = true)]
    max_entries: usize,

    /// Clipboard polling interval in milliseconds
    #[arg(long, env = "CLIPBOARD_HISTORY_POLL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS, global = true)]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = cli.options;
    let config = Config::new(options.config_dir, options.max_entries, options.poll_interval_ms)?;

    store::ensure_store_file(&config.history_path())
        .with_context(|| format!("Failed to create clipboard history in {}", config.config_dir().display()))?;

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = logger::init_logging(&config.log_dir());

    match cli.command {
        None => run_browser(&config).await,
        Some(Commands::Listen) => {
            let pid = supervisor::listen(&config)?;
            println!("Clipboard listener started (pid {pid}). Use `clipboard kill` to stop it.");
            Ok(())
        }
        Some(Commands::Kill) => {
            match supervisor::stop(&config)? {
                Some(pid) => println!("Stopped clipboard listener (pid {pid}). Use `clipboard listen` to resume."),
                None => println!("No clipboard listener running."),
            }
            Ok(())
        }
        Some(Commands::Clear) => {
            store::clear(&config.history_path()).context("Failed to clear clipboard contents")?;
            info!("History cleared");
            println!("Cleared clipboard contents.");
            Ok(())
        }
        Some(Commands::Status) => print_status(&config),
        Some(Commands::Sample) => run_sampler(&config).await,
    }
}

async fn run_browser(config: &Config) -> Result<()> {
    // Load before touching the terminal so a decode error prints cleanly.
    let session = BrowserSession::open(config).context("Error opening clipboard history")?;

    let mut terminal = ratatui::init();
    // Context guard ensures cleanup on both normal exit and panic
    let _ctx = Context::with(ratatui::restore);

    let mut app = App::new(session, SystemClipboard::new());
    app.run(&mut terminal).await
}

async fn run_sampler(config: &Config) -> Result<()> {
    let _registration = supervisor::register(config)?;
    info!("Sampler started (pid {})", std::process::id());

    let listener = Sampler::new(config, SystemClipboard::new());
    let history = listener.run(sampler::shutdown_signal()).await;

    info!("Sampler stopped with {} entries", history.len());
    Ok(())
}

fn print_status(config: &Config) -> Result<()> {
    match supervisor::running_pid(config) {
        Some(pid) => println!("Listener: running (pid {pid})"),
        None => println!("Listener: stopped"),
    }
    let history = store::load(&config.history_path(), config.max_entries)?;
    println!(
        "History: {} of {} entries in {}",
        history.len(),
        config.max_entries,
        config.history_path().display()
    );
    Ok(())
}
