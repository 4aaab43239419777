//! One list component for every browsable entity: a filterable, scrollable
//! list plus the filter bar that drives it.

use ratatui::crossterm::event::{KeyCode, KeyEvent};

use plex_proto::protocol::{
    Album, Artist, FavoriteItem, FavoriteKind, PlayerConnection, Playlist, ServerConnection,
};

use crate::widgets::filter_input::{FilterAction, FilterInput};
use crate::widgets::scrollable_list::ScrollableList;

/// What a list row needs to know about its record.
pub trait BrowseEntity: Send + Sync + 'static {
    fn title(&self) -> &str;

    /// Secondary text shown after the title.
    fn detail(&self) -> Option<String> {
        None
    }

    /// The favorite this row would become, for rows that can be favorited.
    fn as_favorite(&self) -> Option<FavoriteItem> {
        None
    }

    /// Text the filter matches against.
    fn matches(&self, query: &str) -> bool {
        self.title().to_lowercase().contains(&query.to_lowercase())
    }
}

impl BrowseEntity for Artist {
    fn title(&self) -> &str {
        &self.title
    }

    fn as_favorite(&self) -> Option<FavoriteItem> {
        Some(FavoriteItem::new(&self.title, FavoriteKind::Artist, &self.rating_key))
    }
}

impl BrowseEntity for Album {
    fn title(&self) -> &str {
        &self.title
    }

    fn detail(&self) -> Option<String> {
        match &self.year {
            Some(y) if !y.is_empty() => Some(format!("{} ({y})", self.parent_title)),
            _ => Some(self.parent_title.clone()),
        }
    }

    fn as_favorite(&self) -> Option<FavoriteItem> {
        Some(FavoriteItem::new(&self.title, FavoriteKind::Album, &self.rating_key))
    }

    fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.title.to_lowercase().contains(&q) || self.parent_title.to_lowercase().contains(&q)
    }
}

impl BrowseEntity for Playlist {
    fn title(&self) -> &str {
        &self.title
    }

    fn as_favorite(&self) -> Option<FavoriteItem> {
        Some(FavoriteItem::new(&self.title, FavoriteKind::Playlist, &self.rating_key))
    }
}

impl BrowseEntity for ServerConnection {
    fn title(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Option<String> {
        let scope = if self.is_local { "local" } else { "remote" };
        Some(format!("{} ({scope})", self.host_port()))
    }
}

impl BrowseEntity for PlayerConnection {
    fn title(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Option<String> {
        Some(self.address.clone())
    }
}

impl BrowseEntity for FavoriteItem {
    fn title(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Option<String> {
        Some(self.kind.label().to_string())
    }
}

pub struct EntityBrowser<T> {
    pub list: ScrollableList<T>,
    pub filter: FilterInput,
    page_size: usize,
}

impl<T: BrowseEntity> Default for EntityBrowser<T> {
    fn default() -> Self {
        Self {
            list: ScrollableList::new(|item: &T, q: &str| item.matches(q)),
            filter: FilterInput::default(),
            page_size: 10,
        }
    }
}

impl<T: BrowseEntity> EntityBrowser<T> {
    /// Wholesale refill; selection resets, filter text survives.
    pub fn replace(&mut self, items: Vec<T>) {
        self.list.set_items(items);
    }

    pub fn selected(&self) -> Option<&T> {
        self.list.selected_item()
    }

    pub fn len(&self) -> usize {
        self.list.total_len()
    }
}

/// Type-erased list operations, so the session can drive whichever list is
/// active without knowing its record type.
pub trait ListControl {
    fn is_filtering(&self) -> bool;
    fn start_filter(&mut self);
    fn handle_filter_key(&mut self, key: KeyEvent);
    /// Rows available to the list, used as the PgUp/PgDn step.
    fn set_page_size(&mut self, rows: usize);
    /// List navigation keys. Returns false for anything else.
    fn navigate(&mut self, key: KeyEvent) -> bool;
}

impl<T: BrowseEntity> ListControl for EntityBrowser<T> {
    fn is_filtering(&self) -> bool {
        self.filter.is_active()
    }

    fn start_filter(&mut self) {
        self.filter.activate();
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        if let FilterAction::Changed(text) = self.filter.handle_key(key) {
            self.list.set_filter(&text);
        }
    }

    fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    fn navigate(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(self.page_size),
            KeyCode::PageDown => self.list.select_down(self.page_size),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            _ => return false,
        }
        true
    }
}
