//! Background clipboard sampler.
//!
//! Polls the clipboard at a fixed interval and records every new distinct
//! text value in the history file. Read and save failures are logged and the
//! loop carries on with the next tick.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clipboard::ClipboardSource;
use crate::config::Config;
use crate::store::{self, HistoryStore};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing new on the clipboard, no I/O performed.
    Unchanged,
    /// A new value was inserted and the history file rewritten.
    Recorded,
    /// The clipboard could not be read.
    ReadFailed,
    /// The history file could not be written; the value is retried next tick.
    SaveFailed,
}

pub struct Sampler<C: ClipboardSource> {
    clipboard: C,
    history_path: PathBuf,
    capacity: usize,
    poll_interval: Duration,
    store: HistoryStore,
    /// Last snapshot already reconciled with the store.
    last_snapshot: Option<String>,
}

impl<C: ClipboardSource> Sampler<C> {
    /// Create a sampler, seeding its view from the history file.
    ///
    /// A missing or unreadable file is logged and the sampler starts from an
    /// empty store; the next successful save replaces the file.
    pub fn new(config: &Config, clipboard: C) -> Self {
        let history_path = config.history_path();
        let store = match store::load(&history_path, config.max_entries) {
            Ok(store) => store,
            Err(e) => {
                error!("Error loading history, starting empty: {}", e);
                HistoryStore::new(config.max_entries)
            }
        };
        info!(
            "Sampler ready: {} entries loaded from {}",
            store.len(),
            history_path.display()
        );

        Self {
            clipboard,
            history_path,
            capacity: config.max_entries,
            poll_interval: config.poll_interval,
            store,
            last_snapshot: None,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Run one poll/evaluate/persist cycle.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let snapshot = match self.clipboard.read_text() {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => return TickOutcome::Unchanged,
            Err(e) => {
                warn!("Error reading clipboard: {}", e);
                return TickOutcome::ReadFailed;
            }
        };

        if self.last_snapshot.as_deref() == Some(snapshot.as_str()) {
            return TickOutcome::Unchanged;
        }

        // Compare against the file, not the cached view: a browser delete or
        // `clear` may have removed values since the last save.
        let mut next = match store::load(&self.history_path, self.capacity) {
            Ok(on_disk) => on_disk,
            Err(e) => {
                warn!("Error reloading history, using in-memory copy: {}", e);
                self.store.clone()
            }
        };

        if !next.insert(&snapshot, now) {
            debug!("Value already stored, adopting file contents");
            self.store = next;
            self.last_snapshot = Some(snapshot);
            return TickOutcome::Unchanged;
        }

        match store::save(&self.history_path, &next) {
            Ok(()) => {
                info!("Recorded clipboard value ({} bytes), {} entries", snapshot.len(), next.len());
                self.store = next;
                self.last_snapshot = Some(snapshot);
                TickOutcome::Recorded
            }
            Err(e) => {
                error!("Error saving history: {}", e);
                TickOutcome::SaveFailed
            }
        }
    }

    /// Tick at the configured interval until `shutdown` resolves.
    ///
    /// Ticks run to completion; the shutdown future is only observed between
    /// them, so the history file is never left half written.
    pub async fn run<F: Future<Output = ()>>(mut self, shutdown: F) -> HistoryStore {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("Sampler polling every {:?}", self.poll_interval);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, sampler stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.tick(Utc::now());
                }
            }
        }
        self.store
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
