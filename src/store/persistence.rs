//! Disk persistence for the clipboard history.
//!
//! The file is a single JSON document read fully and rewritten fully on every
//! mutation. There is no locking between processes: the last writer wins.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::entry::HistoryEntry;
use super::history::HistoryStore;
use crate::error::{HistoryError, Result};

/// On-disk document. Unknown fields are ignored on decode.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(rename = "clipboardHistory", default)]
    clipboard_history: Vec<HistoryEntry>,
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Write `data` to a uniquely named file next to `path`, then rename it into
/// place. Concurrent writers never share a temp file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| HistoryError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| HistoryError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| HistoryError::io(path, e.error))?;
    Ok(())
}

/// Read and decode the history file. Does not create it.
pub fn load(path: &Path, capacity: usize) -> Result<HistoryStore> {
    let raw = fs::read(path).map_err(|e| HistoryError::io(path, e))?;
    let file: HistoryFile = serde_json::from_slice(&raw).map_err(|e| HistoryError::decode(path, e))?;
    Ok(HistoryStore::from_entries(file.clipboard_history, capacity))
}

/// Serialize the whole store and replace the history file with it.
pub fn save(path: &Path, store: &HistoryStore) -> Result<()> {
    let file = HistoryFile {
        clipboard_history: store.entries().to_vec(),
    };
    let data = serde_json::to_vec_pretty(&file).map_err(|e| HistoryError::io(path, std::io::Error::other(e)))?;
    write_atomic(path, &data)
}

/// Create the parent directory and an empty history file if either is
/// missing. Returns `true` when the file was created.
pub fn ensure_store_file(path: &Path) -> Result<bool> {
    ensure_parent_dir(path)?;
    if path.exists() {
        return Ok(false);
    }
    tracing::info!("Creating empty history file at {}", path.display());
    save(path, &HistoryStore::default())?;
    Ok(true)
}

/// Reset the persisted history to empty.
pub fn clear(path: &Path) -> Result<()> {
    save(path, &HistoryStore::default())
}
