//! Browser session: the interactive front end's view over the history.
//!
//! The view is a snapshot taken when the session opens; later sampler writes
//! are not observed. Copy never touches the store. Delete updates the view
//! first, then rewrites the persisted history.

use std::path::PathBuf;

use tracing::info;

use crate::clipboard::ClipboardSink;
use crate::config::Config;
use crate::error::Result;
use crate::store::{self, HistoryEntry};

/// Longest single-line preview, in characters, including the ellipsis.
pub const SUMMARY_MAX_CHARS: usize = 50;
const ELLIPSIS: &str = "...";

/// What the display shows for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub summary: String,
    pub full_value: String,
    pub recorded_label: String,
}

impl From<&HistoryEntry> for DisplayItem {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            summary: summarize(entry.value()),
            full_value: entry.value().to_string(),
            recorded_label: format!("Copied to clipboard: {}", entry.recorded_label()),
        }
    }
}

/// Single-line preview: newlines become spaces, long values are cut to
/// `SUMMARY_MAX_CHARS` characters with a trailing `...`.
pub fn summarize(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.chars().count() <= SUMMARY_MAX_CHARS {
        return flat;
    }
    let keep = SUMMARY_MAX_CHARS - ELLIPSIS.len();
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

pub struct BrowserSession {
    history_path: PathBuf,
    capacity: usize,
    entries: Vec<HistoryEntry>,
}

impl BrowserSession {
    /// Load the persisted history. Decode and I/O errors are returned to the
    /// caller, which treats them as fatal.
    pub fn open(config: &Config) -> Result<Self> {
        let history_path = config.history_path();
        let store = store::load(&history_path, config.max_entries)?;
        info!("Browser session opened with {} entries", store.len());
        Ok(Self {
            history_path,
            capacity: config.max_entries,
            entries: store.into_entries(),
        })
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> Vec<DisplayItem> {
        self.entries.iter().map(DisplayItem::from).collect()
    }

    /// Put the full value of entry `index` on the clipboard.
    ///
    /// Returns `Ok(None)` for an out-of-range index. The history is not
    /// modified: copying does not re-rank the entry.
    pub fn copy<S: ClipboardSink>(&self, index: usize, sink: &mut S) -> Result<Option<&HistoryEntry>> {
        let Some(entry) = self.entries.get(index) else {
            return Ok(None);
        };
        sink.write_text(entry.value())?;
        info!("Copied entry {} ({} bytes) to clipboard", index, entry.value().len());
        Ok(Some(entry))
    }

    /// Remove entry `index` from the view, then from the persisted history.
    ///
    /// The file is re-read before the removal so entries the sampler added
    /// since the session opened survive. Any error here means the view and
    /// the file disagree; callers must not continue silently.
    pub fn delete(&mut self, index: usize) -> Result<Option<HistoryEntry>> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let entry = self.entries.remove(index);

        let persisted = store::load(&self.history_path, self.capacity)?.removed(entry.value());
        store::save(&self.history_path, &persisted)?;
        info!("Deleted entry {} from history", index);
        Ok(Some(entry))
    }
}
