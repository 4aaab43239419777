//! Filter bar shown above a list while its filter sub-mode is active.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, PartialEq, Eq)]
pub enum FilterAction {
    Changed(String),
    /// Enter: keep the text, leave the sub-mode.
    Confirmed,
    /// Esc on an empty input: leave the sub-mode.
    Cancelled,
}

#[derive(Default)]
pub struct FilterInput {
    input: Input,
    active: bool,
}

impl FilterInput {
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Handles one key while active.
    ///
    /// The first Esc clears the text and stays active; an Esc on empty text
    /// leaves the sub-mode.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc => {
                self.active = false;
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.active = false;
                FilterAction::Confirmed
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width < 4 || area.height == 0 {
            return;
        }
        let scroll = self.input.visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled("/ type to filter", Style::default().fg(C_MUTED))
        } else {
            let shown: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {shown}"), Style::default().fg(C_FILTER_FG))
        };
        frame.render_widget(
            Paragraph::new(Line::from(display)).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active {
            let cursor_x = area.x + 2 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}
