//! Session: the single-owner state machine behind the UI.
//!
//! The event loop feeds every [`Message`] into [`Session::update`], which
//! mutates state and returns the [`Command`]s to run. Nothing here touches
//! the network or the terminal; the stores are the only side effects and
//! they are injected at construction.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

use plex_proto::config::{Loaded, Settings, SettingsStore};
use plex_proto::favorites::FavoritesStore;
use plex_proto::playback_url::PlaybackUrlBuilder;
use plex_proto::player::PlayerCommand;
use plex_proto::protocol::{
    Album, Artist, FavoriteItem, FavoriteKind, Library, PlaybackSnapshot, PlayerConnection,
    Playlist, ServerConnection,
};
use plex_proto::PlexError;

use crate::browse::{BrowseEntity, EntityBrowser, ListControl};
use crate::edit::{EditForm, EditOutcome};
use crate::message::{Command, Fetched, ListKind, Message};

pub const VOLUME_STEP: i16 = 5;
pub const SEEK_STEP: Duration = Duration::from_secs(10);

/// Rows taken by header, now-playing panel and footer.
const CHROME_ROWS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Favorites list; the home screen.
    Playback,
    EditItem,
    BrowseArtists,
    BrowseAlbums,
    BrowsePlaylists,
    BrowseServers,
    BrowsePlayers,
}

impl Mode {
    pub fn browsing(kind: ListKind) -> Self {
        match kind {
            ListKind::Artists => Mode::BrowseArtists,
            ListKind::Albums => Mode::BrowseAlbums,
            ListKind::Playlists => Mode::BrowsePlaylists,
            ListKind::Servers => Mode::BrowseServers,
            ListKind::Players => Mode::BrowsePlayers,
        }
    }

    pub fn browse_kind(self) -> Option<ListKind> {
        match self {
            Mode::BrowseArtists => Some(ListKind::Artists),
            Mode::BrowseAlbums => Some(ListKind::Albums),
            Mode::BrowsePlaylists => Some(ListKind::Playlists),
            Mode::BrowseServers => Some(ListKind::Servers),
            Mode::BrowsePlayers => Some(ListKind::Players),
            Mode::Playback | Mode::EditItem => None,
        }
    }
}

pub struct Session {
    pub mode: Mode,
    /// Mode to go back to when an edit is cancelled.
    edit_return: Mode,
    pub settings: Settings,
    settings_store: Box<dyn SettingsStore>,
    favorites_store: Box<dyn FavoritesStore>,
    /// `(kind, key)` of every stored favorite, for star markers.
    pub favorite_keys: HashSet<(FavoriteKind, String)>,

    pub favorites: EntityBrowser<FavoriteItem>,
    pub artists: EntityBrowser<Artist>,
    pub albums: EntityBrowser<Album>,
    pub playlists: EntityBrowser<Playlist>,
    pub servers: EntityBrowser<ServerConnection>,
    pub players: EntityBrowser<PlayerConnection>,
    pub edit: Option<EditForm>,

    pub playback: PlaybackSnapshot,
    /// When `playback.position_ms` was last known exactly.
    pub last_update: Instant,
    pub shuffle: bool,
    /// Bumped on every player change; poll results from older epochs are dropped.
    pub epoch: u64,
    pub authenticated: bool,
    pub using_default_config: bool,
    pub status: String,
    pub last_command: String,
    pub should_quit: bool,
}

impl Session {
    pub fn new(
        loaded: Loaded,
        settings_store: Box<dyn SettingsStore>,
        favorites_store: Box<dyn FavoritesStore>,
        authenticated: bool,
    ) -> Self {
        let mut session = Self {
            mode: Mode::Playback,
            edit_return: Mode::Playback,
            settings: loaded.settings,
            settings_store,
            favorites_store,
            favorite_keys: HashSet::new(),
            favorites: EntityBrowser::default(),
            artists: EntityBrowser::default(),
            albums: EntityBrowser::default(),
            playlists: EntityBrowser::default(),
            servers: EntityBrowser::default(),
            players: EntityBrowser::default(),
            edit: None,
            playback: PlaybackSnapshot::default(),
            last_update: Instant::now(),
            shuffle: true,
            epoch: 0,
            authenticated,
            using_default_config: loaded.using_default,
            status: String::new(),
            last_command: String::new(),
            should_quit: false,
        };
        session.reload_favorites();
        if !authenticated {
            session.status = PlexError::AuthRequired.to_string();
        }
        session
    }

    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Key(key) => self.on_key(key),
            Message::Resize(_, height) => {
                let rows = (height as usize).saturating_sub(CHROME_ROWS);
                for list in self.lists_mut() {
                    list.set_page_size(rows);
                }
                Vec::new()
            }
            Message::Fetched(fetched) => {
                self.on_fetched(fetched);
                Vec::new()
            }
            Message::PlaybackTriggered(result) => {
                match result {
                    Ok(()) => {
                        self.last_command = "Playback Started".to_string();
                        self.status = "Playback triggered successfully".to_string();
                    }
                    Err(e) => {
                        warn!("playback trigger failed: {e}");
                        self.last_command = "Playback Failed".to_string();
                        self.status = format!("Playback error: {e}");
                    }
                }
                Vec::new()
            }
            Message::PollTick => self.poll_command().into_iter().collect(),
            Message::PollResult { epoch, snapshot } => {
                if epoch == self.epoch {
                    self.playback = snapshot;
                    self.last_update = Instant::now();
                } else {
                    debug!("dropping poll result from epoch {epoch} (current {})", self.epoch);
                }
                Vec::new()
            }
            Message::ServerSelected { server, libraries } => {
                self.on_server_selected(server, libraries);
                Vec::new()
            }
            Message::PlayerSelected { player } => self.select_player(player),
            Message::ControlSent { command, result } => {
                match result {
                    Ok(()) => debug!("{} sent", command.label()),
                    Err(e) => warn!("{} failed: {e}", command.label()),
                }
                Vec::new()
            }
            Message::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    // ── Queries used by the view ─────────────────────────────────────────────

    pub fn is_favorite(&self, item: &FavoriteItem) -> bool {
        self.favorite_keys.contains(&(item.kind, item.key.clone()))
    }

    pub fn is_filtering(&self) -> bool {
        match self.mode {
            Mode::Playback => self.favorites.is_filtering(),
            Mode::BrowseArtists => self.artists.is_filtering(),
            Mode::BrowseAlbums => self.albums.is_filtering(),
            Mode::BrowsePlaylists => self.playlists.is_filtering(),
            Mode::BrowseServers => self.servers.is_filtering(),
            Mode::BrowsePlayers => self.players.is_filtering(),
            Mode::EditItem => false,
        }
    }

    /// Player position extrapolated from the last poll while playing,
    /// clamped to the track.
    pub fn position_at(&self, now: Instant) -> u64 {
        let mut pos = self.playback.position_ms;
        if self.playback.is_playing {
            pos += now.saturating_duration_since(self.last_update).as_millis() as u64;
        }
        if self.playback.duration_ms > 0 {
            pos = pos.min(self.playback.duration_ms);
        }
        pos
    }

    pub fn current_position(&self) -> u64 {
        self.position_at(Instant::now())
    }

    // ── Keys ─────────────────────────────────────────────────────────────────

    fn on_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }
        if self.mode == Mode::EditItem {
            return self.on_edit_key(key);
        }
        if let Some(list) = self.active_list() {
            if list.is_filtering() {
                list.handle_filter_key(key);
                return Vec::new();
            }
        }

        let handled = match self.mode.browse_kind() {
            Some(kind) => self.on_browse_key(kind, key),
            None => self.on_playback_key(key),
        };
        if let Some(cmds) = handled {
            return cmds;
        }
        if let Some(cmds) = self.on_global_key(key) {
            return cmds;
        }
        if let Some(list) = self.active_list() {
            list.navigate(key);
        }
        Vec::new()
    }

    fn on_playback_key(&mut self, key: KeyEvent) -> Option<Vec<Command>> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => self.open_edit(EditForm::add()),
            KeyCode::Char('e') => {
                let form = self.favorites.selected().map(EditForm::edit)?;
                self.open_edit(form);
            }
            KeyCode::Char('d') => self.delete_selected_favorite(),
            KeyCode::Enter => {
                let item = self.favorites.selected()?.clone();
                self.last_command = format!("Playing {}", item.name);
                let url = self.url_builder().for_favorite(&item);
                return Some(self.trigger(url));
            }
            KeyCode::Char('r') => {
                let item = self.favorites.selected()?.clone();
                if item.kind != FavoriteKind::Artist {
                    self.status = "Radio is only available for artists".to_string();
                    return Some(Vec::new());
                }
                self.last_command = format!("Playing {} Radio", item.name);
                let url = self.url_builder().artist_radio(&item.key);
                return Some(self.trigger(url));
            }
            _ => return None,
        }
        Some(Vec::new())
    }

    fn on_browse_key(&mut self, kind: ListKind, key: KeyEvent) -> Option<Vec<Command>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.mode = Mode::Playback;
                self.status.clear();
                Some(Vec::new())
            }
            KeyCode::Char('R') => {
                self.status = format!("Refreshing {}...", kind.label());
                Some(vec![self.fetch_command(kind)])
            }
            KeyCode::Enter => Some(self.activate_selected(kind)),
            KeyCode::Char('r') if kind == ListKind::Artists => {
                let artist = self.artists.selected()?.clone();
                self.last_command = format!("Playing {} Radio", artist.title);
                let url = self.url_builder().artist_radio(&artist.rating_key);
                Some(self.trigger(url))
            }
            KeyCode::Char('f') => {
                let fav = match kind {
                    ListKind::Artists => self.artists.selected().and_then(|a| a.as_favorite()),
                    ListKind::Albums => self.albums.selected().and_then(|a| a.as_favorite()),
                    ListKind::Playlists => self.playlists.selected().and_then(|p| p.as_favorite()),
                    ListKind::Servers | ListKind::Players => return None,
                }?;
                self.toggle_favorite(fav);
                Some(Vec::new())
            }
            _ => None,
        }
    }

    /// Shortcuts shared by the favorites view and every browse mode.
    fn on_global_key(&mut self, key: KeyEvent) -> Option<Vec<Command>> {
        let cmds = match key.code {
            KeyCode::Char('1') => self.open_browser(ListKind::Artists),
            KeyCode::Char('2') => self.open_browser(ListKind::Albums),
            KeyCode::Char('3') => self.open_browser(ListKind::Playlists),
            KeyCode::Char('6') => self.open_browser(ListKind::Servers),
            KeyCode::Char('7') => self.open_browser(ListKind::Players),
            KeyCode::Char('/') => {
                if let Some(list) = self.active_list() {
                    list.start_filter();
                }
                Vec::new()
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_playback(),
            KeyCode::Char('n') => self.transport(PlayerCommand::SkipNext),
            KeyCode::Char('b') => self.transport(PlayerCommand::SkipPrevious),
            KeyCode::Char('+') | KeyCode::Char(']') => self.adjust_volume(VOLUME_STEP),
            KeyCode::Char('-') | KeyCode::Char('[') => self.adjust_volume(-VOLUME_STEP),
            KeyCode::Char('>') => self.seek(SEEK_STEP.as_millis() as i64),
            KeyCode::Char('<') => self.seek(-(SEEK_STEP.as_millis() as i64)),
            KeyCode::Char('h') => self.toggle_shuffle(),
            KeyCode::Tab => self.cycle_library(),
            _ => return None,
        };
        Some(cmds)
    }

    fn on_edit_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let Some(form) = self.edit.as_mut() else {
            self.mode = Mode::Playback;
            return Vec::new();
        };
        match form.handle_key(key) {
            EditOutcome::Continue => {}
            EditOutcome::Cancel => {
                self.edit = None;
                self.mode = self.edit_return;
            }
            EditOutcome::Submit => self.save_edit(),
        }
        Vec::new()
    }

    // ── Lists ────────────────────────────────────────────────────────────────

    fn active_list(&mut self) -> Option<&mut dyn ListControl> {
        let list: &mut dyn ListControl = match self.mode {
            Mode::Playback => &mut self.favorites,
            Mode::BrowseArtists => &mut self.artists,
            Mode::BrowseAlbums => &mut self.albums,
            Mode::BrowsePlaylists => &mut self.playlists,
            Mode::BrowseServers => &mut self.servers,
            Mode::BrowsePlayers => &mut self.players,
            Mode::EditItem => return None,
        };
        Some(list)
    }

    fn lists_mut(&mut self) -> [&mut dyn ListControl; 6] {
        [
            &mut self.favorites,
            &mut self.artists,
            &mut self.albums,
            &mut self.playlists,
            &mut self.servers,
            &mut self.players,
        ]
    }

    fn open_browser(&mut self, kind: ListKind) -> Vec<Command> {
        if !self.authenticated {
            self.status = PlexError::AuthRequired.to_string();
            return Vec::new();
        }
        self.mode = Mode::browsing(kind);
        self.status = format!("Loading {}...", kind.label());
        vec![self.fetch_command(kind)]
    }

    fn fetch_command(&self, kind: ListKind) -> Command {
        Command::Fetch {
            kind,
            server_addr: self.settings.plex_server_addr.clone(),
            library_id: self.settings.plex_library_id.clone(),
        }
    }

    /// Routed by what was fetched, never by the current mode. Only the
    /// active mode's result is reported in the status line.
    fn on_fetched(&mut self, fetched: Fetched) {
        let kind = fetched.kind();
        let outcome = match fetched {
            Fetched::Artists(r) => refill(&mut self.artists, r),
            Fetched::Albums(r) => refill(&mut self.albums, r),
            Fetched::Playlists(r) => refill(&mut self.playlists, r),
            Fetched::Servers(r) => refill(&mut self.servers, r),
            Fetched::Players(r) => refill(&mut self.players, r),
        };
        let status = match outcome {
            Ok(n) => {
                info!("loaded {n} {}", kind.label());
                format!("Loaded {n} {}", kind.label())
            }
            Err(e) => {
                warn!("fetching {} failed: {e}", kind.label());
                format!("Error fetching {}: {e}", kind.label())
            }
        };
        if self.mode.browse_kind() == Some(kind) {
            self.status = status;
        }
    }

    fn activate_selected(&mut self, kind: ListKind) -> Vec<Command> {
        let builder = self.url_builder();
        let (title, url) = match kind {
            ListKind::Artists => match self.artists.selected() {
                Some(a) => (a.title.clone(), builder.play_queue(&a.rating_key)),
                None => return Vec::new(),
            },
            ListKind::Albums => match self.albums.selected() {
                Some(a) => (a.title.clone(), builder.play_queue(&a.rating_key)),
                None => return Vec::new(),
            },
            ListKind::Playlists => match self.playlists.selected() {
                Some(p) => (p.title.clone(), builder.playlist(&p.rating_key)),
                None => return Vec::new(),
            },
            ListKind::Servers => {
                let Some(server) = self.servers.selected().cloned() else {
                    return Vec::new();
                };
                self.status = format!("Selecting server {}...", server.name);
                return vec![Command::SelectServer { server }];
            }
            ListKind::Players => {
                let Some(player) = self.players.selected().cloned() else {
                    return Vec::new();
                };
                return self.select_player(player);
            }
        };
        self.last_command = format!("Playing {title}");
        self.trigger(url)
    }

    // ── Favorites ────────────────────────────────────────────────────────────

    fn reload_favorites(&mut self) {
        match self.favorites_store.list() {
            Ok(items) => {
                self.favorite_keys = items.iter().map(|f| (f.kind, f.key.clone())).collect();
                self.favorites.replace(items);
            }
            Err(e) => {
                warn!("loading favorites failed: {e}");
                self.status = format!("Error loading favorites: {e}");
            }
        }
    }

    fn toggle_favorite(&mut self, fav: FavoriteItem) {
        self.last_command = format!("Toggling favorite for {}", fav.name);
        let existed = self.is_favorite(&fav);
        let result = if existed {
            self.favorites_store.remove(fav.kind, &fav.key)
        } else {
            self.favorites_store.upsert(&fav)
        };
        match result {
            Ok(()) => {
                self.status = if existed {
                    format!("Removed {} from favorites", fav.name)
                } else {
                    format!("Added {} to favorites", fav.name)
                };
                self.reload_favorites();
            }
            Err(e) => {
                warn!("saving favorite failed: {e}");
                self.status = format!("Error saving favorite: {e}");
            }
        }
    }

    fn delete_selected_favorite(&mut self) {
        let Some(item) = self.favorites.selected().cloned() else {
            return;
        };
        match self.favorites_store.remove(item.kind, &item.key) {
            Ok(()) => {
                self.status = format!("Deleted {}", item.name);
                self.reload_favorites();
            }
            Err(e) => {
                warn!("deleting favorite failed: {e}");
                self.status = format!("Error deleting favorite: {e}");
            }
        }
    }

    fn open_edit(&mut self, form: EditForm) {
        self.edit_return = self.mode;
        self.edit = Some(form);
        self.mode = Mode::EditItem;
    }

    fn save_edit(&mut self) {
        let Some(form) = self.edit.as_ref() else {
            return;
        };
        let item = match form.validate() {
            Ok(item) => item,
            Err(e) => {
                self.last_command = format!("Save failed: {e}");
                self.status = format!("Validation error: {e}");
                return;
            }
        };
        let result = match form.original().cloned() {
            Some((kind, key)) => self.favorites_store.replace(kind, &key, &item),
            None => self.favorites_store.upsert(&item),
        };
        match result {
            Ok(()) => {
                self.last_command = "Saved successfully".to_string();
                self.status = format!("Saved favorite {}", item.name);
                self.edit = None;
                self.mode = Mode::Playback;
                self.reload_favorites();
            }
            Err(e) => {
                warn!("saving favorite failed: {e}");
                self.last_command = format!("Save failed: {e}");
                self.status = format!("Error saving favorite: {e}");
            }
        }
    }

    // ── Connection ───────────────────────────────────────────────────────────

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            warn!("saving settings failed: {e}");
            self.status = format!("Error saving config: {e}");
        }
    }

    fn select_player(&mut self, player: PlayerConnection) -> Vec<Command> {
        info!("player selected: {} ({})", player.name, player.address);
        self.settings.selected_player = player.address;
        self.settings.selected_player_name = player.name;
        self.epoch += 1;
        self.playback = PlaybackSnapshot::default();
        self.last_update = Instant::now();
        self.last_command = "Player Selected".to_string();
        self.status.clear();
        self.mode = Mode::Playback;
        self.persist_settings();
        self.poll_command().into_iter().collect()
    }

    fn on_server_selected(
        &mut self,
        server: ServerConnection,
        libraries: plex_proto::Result<Vec<Library>>,
    ) {
        info!("server selected: {} ({})", server.name, server.host_port());
        self.settings.server_id = server.client_identifier.clone();
        self.settings.plex_server_addr = server.host_port();
        self.settings.plex_server_name = server.name.clone();
        self.mode = Mode::Playback;

        let libraries = libraries.unwrap_or_else(|e| {
            warn!("fetching libraries of {} failed: {e}", server.name);
            Vec::new()
        });
        if libraries.is_empty() {
            self.last_command = "Server Selected Failed, No Libraries".to_string();
            self.status = "No libraries found on this server".to_string();
            self.persist_settings();
            return;
        }

        // same-named library keeps its name but takes this server's key
        let chosen = match libraries
            .iter()
            .find(|l| l.title == self.settings.plex_library_name)
        {
            Some(library) => library,
            None => {
                debug!("library {} not on this server, using the first one", self.settings.plex_library_name);
                &libraries[0]
            }
        };
        self.settings.plex_library_id = chosen.key.clone();
        self.settings.plex_library_name = chosen.title.clone();
        self.settings.plex_libraries = libraries;
        self.last_command = "Server Selected".to_string();
        self.status.clear();
        self.persist_settings();
    }

    fn cycle_library(&mut self) -> Vec<Command> {
        let libraries = &self.settings.plex_libraries;
        if libraries.is_empty() {
            self.status = "No libraries known, select a server first".to_string();
            return Vec::new();
        }
        let next = libraries
            .iter()
            .position(|l| l.key == self.settings.plex_library_id)
            .map_or(0, |i| (i + 1) % libraries.len());
        let library = libraries[next].clone();
        self.settings.plex_library_id = library.key;
        self.settings.plex_library_name = library.title;
        self.last_command = format!("Library {}", self.settings.plex_library_name);
        self.persist_settings();
        match self.mode.browse_kind() {
            Some(kind @ (ListKind::Artists | ListKind::Albums | ListKind::Playlists)) => {
                self.status = format!("Loading {}...", kind.label());
                vec![self.fetch_command(kind)]
            }
            _ => Vec::new(),
        }
    }

    // ── Playback ─────────────────────────────────────────────────────────────

    fn url_builder(&self) -> PlaybackUrlBuilder {
        PlaybackUrlBuilder::new(&self.settings.server_id)
    }

    /// A trigger without a player fails right here, without a request.
    fn trigger(&mut self, url: String) -> Vec<Command> {
        let address = self.settings.selected_player.clone();
        if address.is_empty() {
            return self.update(Message::PlaybackTriggered(Err(PlexError::NoServerSelected)));
        }
        debug!("trigger {url} (shuffle {})", self.shuffle);
        vec![Command::Trigger {
            address,
            url,
            shuffle: self.shuffle,
        }]
    }

    fn poll_command(&self) -> Option<Command> {
        if self.settings.selected_player.is_empty() {
            return None;
        }
        Some(Command::Poll {
            address: self.settings.selected_player.clone(),
            epoch: self.epoch,
        })
    }

    /// Player address, or `None` with the status set.
    fn player_address(&mut self) -> Option<String> {
        if self.settings.selected_player.is_empty() {
            self.status = format!("Control error: {}", PlexError::NoPlayerSelected);
            return None;
        }
        Some(self.settings.selected_player.clone())
    }

    /// Best effort: the result only comes back as a log line. An immediate
    /// poll follows so the display catches up.
    fn transport(&mut self, command: PlayerCommand) -> Vec<Command> {
        let Some(address) = self.player_address() else {
            return Vec::new();
        };
        self.last_command = command.label();
        vec![
            Command::Control {
                address: address.clone(),
                command,
            },
            Command::Poll {
                address,
                epoch: self.epoch,
            },
        ]
    }

    fn toggle_playback(&mut self) -> Vec<Command> {
        let command = if self.playback.is_playing {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Play
        };
        let cmds = self.transport(command);
        if !cmds.is_empty() {
            self.playback.is_playing = !self.playback.is_playing;
        }
        cmds
    }

    fn adjust_volume(&mut self, delta: i16) -> Vec<Command> {
        let volume = (self.playback.volume as i16 + delta).clamp(0, 100) as u8;
        let cmds = self.transport(PlayerCommand::SetVolume(volume));
        if !cmds.is_empty() {
            self.playback.volume = volume;
        }
        cmds
    }

    fn seek(&mut self, delta_ms: i64) -> Vec<Command> {
        let now = Instant::now();
        let mut target = (self.position_at(now) as i64 + delta_ms).max(0) as u64;
        if self.playback.duration_ms > 0 {
            target = target.min(self.playback.duration_ms);
        }
        let cmds = self.transport(PlayerCommand::SeekTo(target));
        if !cmds.is_empty() {
            self.playback.position_ms = target;
            self.last_update = now;
        }
        cmds
    }

    /// The flag also shapes every later trigger URL, so it flips even with
    /// no player to tell.
    fn toggle_shuffle(&mut self) -> Vec<Command> {
        self.shuffle = !self.shuffle;
        let command = PlayerCommand::Shuffle(self.shuffle);
        if self.settings.selected_player.is_empty() {
            self.last_command = command.label();
            return Vec::new();
        }
        self.transport(command)
    }
}

/// Replaces a browser's items; on error the list is left untouched.
fn refill<T: BrowseEntity>(
    browser: &mut EntityBrowser<T>,
    result: plex_proto::Result<Vec<T>>,
) -> plex_proto::Result<usize> {
    let items = result?;
    let n = items.len();
    browser.replace(items);
    Ok(n)
}
