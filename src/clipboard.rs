//! System clipboard access.
//!
//! The sampler only reads and the browser only writes, so the two directions
//! are separate traits. `SystemClipboard` implements both on top of arboard.

use arboard::Clipboard;
use tracing::{debug, warn};

use crate::error::{HistoryError, Result};

/// Something the sampler can take plain-text snapshots from.
pub trait ClipboardSource {
    /// Current text content. `Ok(None)` when the clipboard holds no text.
    fn read_text(&mut self) -> Result<Option<String>>;
}

/// Something the browser can copy a value onto.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Platform clipboard, opened lazily.
///
/// A failed open or read drops the handle so the next call starts over; this
/// lets a listener started before the display server recover on its own.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut Clipboard> {
        if self.inner.is_none() {
            let clipboard = Clipboard::new()?;
            debug!("Opened system clipboard");
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| HistoryError::Clipboard("clipboard handle unavailable".to_string()))
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>> {
        let result = self.handle()?.get_text();
        match result {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => {
                warn!("Resetting clipboard handle after read failure: {}", e);
                self.inner = None;
                Err(e.into())
            }
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let result = self.handle()?.set_text(text);
        if let Err(e) = result {
            self.inner = None;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::*;

    /// Scripted clipboard: reads pop from `reads` (repeating the last one),
    /// writes are recorded.
    #[derive(Default)]
    pub struct FakeClipboard {
        pub reads: VecDeque<Result<Option<String>>>,
        pub last_read: Option<String>,
        pub written: Vec<String>,
        pub fail_writes: bool,
    }

    impl FakeClipboard {
        pub fn with_reads<I: IntoIterator<Item = Result<Option<String>>>>(reads: I) -> Self {
            Self {
                reads: reads.into_iter().collect(),
                ..Self::default()
            }
        }

        pub fn text(s: &str) -> Result<Option<String>> {
            Ok(Some(s.to_string()))
        }

        pub fn failure() -> Result<Option<String>> {
            Err(HistoryError::Clipboard("display unavailable".to_string()))
        }
    }

    impl ClipboardSource for FakeClipboard {
        fn read_text(&mut self) -> Result<Option<String>> {
            match self.reads.pop_front() {
                Some(Ok(text)) => {
                    self.last_read = text.clone();
                    Ok(text)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last_read.clone()),
            }
        }
    }

    impl ClipboardSink for FakeClipboard {
        fn write_text(&mut self, text: &str) -> Result<()> {
            if self.fail_writes {
                return Err(HistoryError::Clipboard("write refused".to_string()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }
}
