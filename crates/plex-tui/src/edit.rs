//! Add/edit form for a favorite: name, kind, metadata key.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use tui_input::{backend::crossterm::EventHandler, Input};

use plex_proto::protocol::{FavoriteItem, FavoriteKind};
use plex_proto::PlexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    Kind,
    Key,
}

impl EditField {
    fn next(self) -> Self {
        match self {
            EditField::Name => EditField::Kind,
            EditField::Kind => EditField::Key,
            EditField::Key => EditField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            EditField::Name => EditField::Key,
            EditField::Kind => EditField::Name,
            EditField::Key => EditField::Kind,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Cancel,
    Submit,
}

pub struct EditForm {
    name: Input,
    key: Input,
    kind: Option<FavoriteKind>,
    focus: EditField,
    /// `(kind, key)` of the favorite being edited; `None` when adding.
    original: Option<(FavoriteKind, String)>,
}

impl EditForm {
    pub fn add() -> Self {
        Self {
            name: Input::default(),
            key: Input::default(),
            kind: Some(FavoriteKind::EDITABLE[0]),
            focus: EditField::Name,
            original: None,
        }
    }

    /// Pre-filled from `item`. Kinds the form cannot offer (stations) start
    /// unselected.
    pub fn edit(item: &FavoriteItem) -> Self {
        Self {
            name: Input::new(item.name.clone()),
            key: Input::new(item.key.clone()),
            kind: FavoriteKind::EDITABLE.contains(&item.kind).then_some(item.kind),
            focus: EditField::Name,
            original: Some((item.kind, item.key.clone())),
        }
    }

    pub fn name(&self) -> &str {
        self.name.value()
    }

    pub fn key(&self) -> &str {
        self.key.value()
    }

    pub fn kind(&self) -> Option<FavoriteKind> {
        self.kind
    }

    pub fn focus(&self) -> EditField {
        self.focus
    }

    pub fn original(&self) -> Option<&(FavoriteKind, String)> {
        self.original.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        match key.code {
            KeyCode::Esc => return EditOutcome::Cancel,
            KeyCode::Enter => return EditOutcome::Submit,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Left | KeyCode::Char('h') if self.focus == EditField::Kind => {
                self.step_kind(-1)
            }
            KeyCode::Right | KeyCode::Char('l') if self.focus == EditField::Kind => {
                self.step_kind(1)
            }
            _ => match self.focus {
                EditField::Name => {
                    self.name.handle_event(&Event::Key(key));
                }
                EditField::Key => {
                    self.key.handle_event(&Event::Key(key));
                }
                EditField::Kind => {}
            },
        }
        EditOutcome::Continue
    }

    fn step_kind(&mut self, delta: isize) {
        let kinds = FavoriteKind::EDITABLE;
        let next = match self.kind.and_then(|k| kinds.iter().position(|&c| c == k)) {
            Some(i) => (i as isize + delta).clamp(0, kinds.len() as isize - 1) as usize,
            None => 0,
        };
        self.kind = Some(kinds[next]);
    }

    /// The favorite the form describes, or the first invalid field.
    pub fn validate(&self) -> plex_proto::Result<FavoriteItem> {
        let name = self.name.value().trim();
        if name.is_empty() {
            return Err(PlexError::Validation("name cannot be empty".into()));
        }
        let Some(kind) = self.kind else {
            return Err(PlexError::Validation("please select a valid type".into()));
        };
        let key = self.key.value().trim();
        if key.is_empty() {
            return Err(PlexError::Validation("metadata key cannot be empty".into()));
        }
        Ok(FavoriteItem::new(name, kind, key))
    }
}
