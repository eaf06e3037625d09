//! Interactive browser state and event loop.
//!
//! `App` owns the session snapshot, the selection, the optional filter query
//! and the status line. Key presses become `KeyAction`s, which are resolved
//! against the current selection into session `Intent`s.

use anyhow::{Context, Result};
use ratatui::DefaultTerminal;
use tracing::{error, info};

use crate::clipboard::ClipboardSink;
use crate::event::{InputMode, Intent, KeyAction, UserEvent, init_user_event, map_key};
use crate::session::{BrowserSession, summarize};

/// Rows each list item occupies (summary + recorded label).
pub(crate) const ITEM_HEIGHT: u16 = 2;
/// Rows used by borders, preview, status and help lines.
pub(crate) const CHROME_HEIGHT: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App<S: ClipboardSink> {
    session: BrowserSession,
    clipboard: S,

    mode: InputMode,
    filter: String,
    /// Session indices matching the filter, in display order.
    visible: Vec<usize>,
    /// Position within `visible`.
    selected: usize,

    show_help: bool,
    status: Option<StatusMessage>,
    size: (u16, u16),
    exit: bool,
}

impl<S: ClipboardSink> App<S> {
    pub fn new(session: BrowserSession, clipboard: S) -> Self {
        let visible = (0..session.len()).collect();
        Self {
            session,
            clipboard,
            mode: InputMode::Browse,
            filter: String::new(),
            visible,
            selected: 0,
            show_help: false,
            status: None,
            size: (80, 24),
            exit: false,
        }
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Selected position within `visible()`, if the list is not empty.
    pub fn selected_position(&self) -> Option<usize> {
        (!self.visible.is_empty()).then_some(self.selected)
    }

    /// Session index of the selected entry.
    pub fn selected_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut user_events = init_user_event();
        let area = terminal.size()?;
        self.size = (area.width, area.height);
        self.draw(terminal)?;
        while !self.exit {
            let event = user_events
                .recv()
                .await
                .with_context(|| anyhow::anyhow!("User event stream is ended."))?;
            self.handle_user_event(event?)?;
            self.draw(terminal)?;
        }
        info!("Browser session closed");
        Ok(())
    }

    pub fn draw(&self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            // Render using Widget trait
            use ratatui::widgets::Widget;
            (&*self).render(frame.area(), frame.buffer_mut());
        })?;
        Ok(())
    }

    /// Handle one terminal event. Only failures that leave the view and the
    /// history file inconsistent are returned as errors.
    pub fn handle_user_event(&mut self, event: UserEvent) -> Result<()> {
        match event {
            UserEvent::Key(key) => {
                if let Some(action) = map_key(key, self.mode) {
                    self.handle_key_action(action)?;
                }
            }
            UserEvent::Resize(width, height) => self.apply_intent(Intent::Resize(width, height))?,
            _ => {}
        }
        Ok(())
    }

    pub fn handle_key_action(&mut self, action: KeyAction) -> Result<()> {
        // Any new input replaces the previous status message.
        self.status = None;

        match action {
            KeyAction::Up => self.select_prev(1),
            KeyAction::Down => self.select_next(1),
            KeyAction::PageUp => self.select_prev(self.page_size()),
            KeyAction::PageDown => self.select_next(self.page_size()),
            KeyAction::Top => self.selected = 0,
            KeyAction::Bottom => self.selected = self.visible.len().saturating_sub(1),
            KeyAction::CopySelected => {
                if let Some(index) = self.selected_index() {
                    self.apply_intent(Intent::Copy(index))?;
                }
            }
            KeyAction::DeleteSelected => {
                if let Some(index) = self.selected_index() {
                    self.apply_intent(Intent::Delete(index))?;
                }
            }
            KeyAction::StartFilter => self.mode = InputMode::Filter,
            KeyAction::FilterChar(c) => {
                self.filter.push(c);
                self.refresh_visible();
            }
            KeyAction::FilterBackspace => {
                self.filter.pop();
                self.refresh_visible();
            }
            KeyAction::ApplyFilter => self.mode = InputMode::Browse,
            KeyAction::ClearFilter => {
                self.filter.clear();
                self.mode = InputMode::Browse;
                self.refresh_visible();
            }
            KeyAction::ToggleHelp => self.show_help = !self.show_help,
            KeyAction::Quit => self.exit = true,
        }
        Ok(())
    }

    /// Apply a display intent to the session.
    ///
    /// A clipboard failure on copy is reported in the status line and the
    /// session continues. A failure to persist a delete is returned.
    pub fn apply_intent(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Copy(index) => match self.session.copy(index, &mut self.clipboard) {
                Ok(Some(entry)) => {
                    let text = format!("Copied to clipboard: {}", summarize(entry.value()));
                    self.set_status(StatusKind::Info, text);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Copy failed: {}", e);
                    self.set_status(StatusKind::Error, format!("Copy failed: {e}"));
                }
            },
            Intent::Delete(index) => {
                let removed = self
                    .session
                    .delete(index)
                    .context("Failed to delete entry from clipboard history")?;
                self.refresh_visible();
                if let Some(entry) = removed {
                    self.set_status(StatusKind::Info, format!("Deleted: {}", summarize(entry.value())));
                }
            }
            Intent::Resize(width, height) => self.size = (width, height),
        }
        Ok(())
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(StatusMessage { kind, text });
    }

    fn page_size(&self) -> usize {
        let rows = self.size.1.saturating_sub(CHROME_HEIGHT) / ITEM_HEIGHT;
        usize::from(rows.max(1))
    }

    fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    fn select_next(&mut self, step: usize) {
        let last = self.visible.len().saturating_sub(1);
        self.selected = (self.selected + step).min(last);
    }

    /// Recompute the filtered list, keeping the selection on the same entry
    /// when it is still visible.
    fn refresh_visible(&mut self) {
        let previous = self.selected_index();
        let needle = self.filter.to_lowercase();
        self.visible = self
            .session
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| needle.is_empty() || e.value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();

        // After a delete the session indices shift; fall back to the same
        // position in the list.
        self.selected = previous
            .and_then(|prev| self.visible.iter().position(|&i| i == prev))
            .unwrap_or(self.selected)
            .min(self.visible.len().saturating_sub(1));
    }
}
