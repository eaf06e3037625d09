//! Event handling for the browser.
//!
//! Terminal input is read on a dedicated thread and forwarded over a channel
//! so the async loop never blocks on `crossterm::event::read()`. Raw key
//! events are turned into `KeyAction`s by `keys`; the app resolves those
//! against the current selection into `Intent`s for the session.
//!
//! # Submodules
//!
//! - `keys`: key bindings for list navigation and filter input

pub mod keys;

use std::io::Result;
use std::thread;

use tokio::sync::mpsc::{self, Receiver};

pub use keys::{InputMode, KeyAction, map_key};

/// Type alias for user input events from the terminal.
pub type UserEvent = crossterm::event::Event;

/// Requests the display sends to the session. Indices refer to positions in
/// the session's entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Copy(usize),
    Delete(usize),
    Resize(u16, u16),
}

/// Initializes the user event stream.
///
/// Spawns a thread that blocks on `crossterm::event::read()` and forwards
/// every event. The thread ends once the receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(64);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}
