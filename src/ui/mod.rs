//! Rendering of the browser.
//!
//! Layout, top to bottom inside the outer frame: filter line, entry list
//! (two rows per entry), preview of the selected value, status line, help.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, StatusKind};
use crate::clipboard::ClipboardSink;
use crate::event::InputMode;

const PREVIEW_HEIGHT: u16 = 5;
const STATUS_COLOR: Color = Color::Rgb(0x04, 0xB5, 0x75);
const TITLE_BG: Color = Color::Rgb(0x43, 0x4C, 0x5E);

const SHORT_HELP: &str = "enter copy • x delete • / filter • ? more • q quit";
const FULL_HELP: &str =
    "↑/k ↓/j move • pgup/pgdn page • g/G top/bottom • enter copy • x/⌫ delete • / filter (esc clears) • q quit";

impl<S: ClipboardSink> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(vec![
            Span::styled(" Clipboard History ", Style::new().fg(Color::White).bg(TITLE_BG)),
            Span::raw(format!(" {} items ", self.session().len())),
        ]);
        let outer_block = Block::new().borders(Borders::ALL).title(title);
        let inner_area = outer_block.inner(area);
        outer_block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),              // filter
                Constraint::Min(2),                 // list
                Constraint::Length(PREVIEW_HEIGHT), // preview
                Constraint::Length(1),              // status
                Constraint::Length(1),              // help
            ])
            .split(inner_area);

        render_filter_line(self, chunks[0], buf);
        render_list(self, chunks[1], buf);
        render_preview(self, chunks[2], buf);
        render_status(self, chunks[3], buf);

        let help = if self.show_help() { FULL_HELP } else { SHORT_HELP };
        Paragraph::new(Line::from(help.dark_gray())).render(chunks[4], buf);
    }
}

fn render_filter_line<S: ClipboardSink>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let line = match app.mode() {
        InputMode::Filter => Line::from(vec![
            Span::styled("Filter: ", Style::new().fg(Color::Yellow)),
            Span::raw(app.filter()),
            Span::styled("█", Style::new().fg(Color::Yellow)),
        ]),
        InputMode::Browse if !app.filter().is_empty() => Line::from(format!(
            "Filter: {} ({} of {})",
            app.filter(),
            app.visible().len(),
            app.session().len()
        )),
        InputMode::Browse => Line::from("/ to filter".dark_gray()),
    };
    Paragraph::new(line).render(area, buf);
}

fn render_list<S: ClipboardSink>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    if app.visible().is_empty() {
        let message = if app.session().is_empty() {
            "No clipboard history yet. Run `clipboard listen` to start recording."
        } else {
            "No entries match the filter."
        };
        Paragraph::new(message.dark_gray()).render(area, buf);
        return;
    }

    let width = usize::from(area.width.saturating_sub(2));
    let items: Vec<ListItem> = app
        .visible()
        .iter()
        .filter_map(|&i| app.session().get(i))
        .map(|entry| {
            let item = crate::session::DisplayItem::from(entry);
            ListItem::new(vec![
                Line::from(fit_width(&item.summary, width)),
                Line::from(fit_width(&item.recorded_label, width).dark_gray()),
            ])
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::new().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .highlight_symbol("│ ");
    let mut state = ListState::default().with_selected(app.selected_position());
    StatefulWidget::render(list, area, buf, &mut state);
}

fn render_preview<S: ClipboardSink>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let block = Block::new().borders(Borders::TOP).title(" Preview ".dark_gray());
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(entry) = app.selected_index().and_then(|i| app.session().get(i)) else {
        return;
    };
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines: Vec<Line> = textwrap::wrap(entry.value(), usize::from(inner.width))
        .into_iter()
        .take(usize::from(inner.height))
        .map(|l| Line::from(l.into_owned()))
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

fn render_status<S: ClipboardSink>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let Some(status) = app.status() else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => STATUS_COLOR,
        StatusKind::Error => Color::Red,
    };
    Paragraph::new(Line::from(Span::styled(status.text.as_str(), Style::new().fg(color)))).render(area, buf);
}

/// Cut `text` to at most `width` terminal columns, ending with `…` when cut.
pub fn fit_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::FakeClipboard;
    use crate::config::Config;
    use crate::event::KeyAction;
    use crate::session::BrowserSession;
    use crate::store::{self, HistoryStore};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn rows(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn render_app(values: &[&str], actions: &[KeyAction]) -> Vec<String> {
        let dir = tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf()), 50, 100).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 4, 4, 4, 4, 4).unwrap();
        let mut history = HistoryStore::new(50);
        for v in values.iter().rev() {
            history.insert(v, at);
        }
        store::save(&config.history_path(), &history).unwrap();

        let mut app = App::new(BrowserSession::open(&config).unwrap(), FakeClipboard::default());
        for action in actions {
            app.handle_key_action(*action).unwrap();
        }

        let area = Rect::new(0, 0, 70, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        rows(&buf)
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("short", 10), "short");
        assert_eq!(fit_width("abcdefghij", 5), "abcd…");
        assert_eq!(fit_width("日本語テキスト", 7), "日本語…");
        assert_eq!(fit_width("abc", 0), "");
    }

    #[test]
    fn test_renders_entries_and_labels() {
        let screen = render_app(&["first\nsecond line", "other"], &[]).join("\n");

        assert!(screen.contains("Clipboard History"));
        assert!(screen.contains("first second line"));
        assert!(screen.contains("Copied to clipboard: 2024-04-04 04:04:04"));
        assert!(screen.contains("other"));
        assert!(screen.contains("enter copy"));
    }

    #[test]
    fn test_preview_shows_full_value_lines() {
        let screen = render_app(&["alpha\nbeta"], &[]);

        assert!(screen.iter().any(|row| row.contains("Preview")));
        assert!(screen.iter().any(|row| row.trim_matches('│').trim() == "alpha"));
        assert!(screen.iter().any(|row| row.trim_matches('│').trim() == "beta"));
    }

    #[test]
    fn test_empty_history_message() {
        let screen = render_app(&[], &[]).join("\n");
        assert!(screen.contains("No clipboard history yet"));
    }

    #[test]
    fn test_status_after_copy() {
        let screen = render_app(&["payload"], &[KeyAction::CopySelected]).join("\n");
        assert!(screen.contains("Copied to clipboard: payload"));
    }

    #[test]
    fn test_filter_line() {
        let screen = render_app(
            &["red", "green"],
            &[KeyAction::StartFilter, KeyAction::FilterChar('g'), KeyAction::ApplyFilter],
        )
        .join("\n");

        assert!(screen.contains("Filter: g (1 of 2)"));
        assert!(!screen.contains("red"));
    }
}
