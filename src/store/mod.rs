//! The clipboard history store.
//!
//! `history` holds the in-memory rules (dedup, capacity, ordering),
//! `persistence` moves a whole store to and from its JSON file.

mod entry;
mod history;
pub mod persistence;

pub use entry::{HistoryEntry, RECORDED_FORMAT, parse_recorded};
pub use history::{HistoryStore, MAX_ENTRIES};
pub use persistence::{clear, ensure_store_file, load, save};
