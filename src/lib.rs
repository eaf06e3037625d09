//! Clipboard history: a background listener that records plain-text
//! clipboard snapshots into a small bounded history file, and a terminal
//! browser to copy entries back or delete them.
//!
//! The two processes share nothing but the history file, which is read
//! fully and rewritten fully on every mutation:
//! - `store`: the bounded, deduplicated, newest-first history and its JSON file
//! - `sampler`: the polling loop run by the listener process
//! - `session`: the browser's snapshot view and its copy/delete intents
//! - `supervisor`: PID-file bookkeeping that keeps a single listener alive
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use clipboard_history::config::Config;
//! use clipboard_history::store;
//!
//! # fn main() -> Result<(), clipboard_history::HistoryError> {
//! let config = Config::default();
//! store::ensure_store_file(&config.history_path())?;
//!
//! let mut history = store::load(&config.history_path(), config.max_entries)?;
//! if history.insert("copied text", Utc::now()) {
//!     store::save(&config.history_path(), &history)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod event;
pub mod sampler;
pub mod session;
pub mod store;
pub mod supervisor;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use app::App;
pub use clipboard::{ClipboardSink, ClipboardSource, SystemClipboard};
pub use config::Config;
pub use error::{HistoryError, Result};
pub use event::Intent;
pub use sampler::{Sampler, TickOutcome};
pub use session::{BrowserSession, DisplayItem};
pub use store::{HistoryEntry, HistoryStore, MAX_ENTRIES};
