//! Messages into the session and commands out of it.
//!
//! Every input event, timer tick and finished network task arrives as a
//! [`Message`]. [`crate::core::Session::update`] consumes one at a time and
//! answers with zero or more [`Command`]s, which the executor runs as
//! detached tasks whose results come back as further messages.

use ratatui::crossterm::event::KeyEvent;

use plex_proto::player::PlayerCommand;
use plex_proto::protocol::{
    Album, Artist, Library, PlaybackSnapshot, PlayerConnection, Playlist, ServerConnection,
};

/// The five remote lists the user can browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Artists,
    Albums,
    Playlists,
    Servers,
    Players,
}

impl ListKind {
    pub fn label(self) -> &'static str {
        match self {
            ListKind::Artists => "artists",
            ListKind::Albums => "albums",
            ListKind::Playlists => "playlists",
            ListKind::Servers => "servers",
            ListKind::Players => "players",
        }
    }
}

/// Result of one list fetch, tagged by what was fetched.
#[derive(Debug)]
pub enum Fetched {
    Artists(plex_proto::Result<Vec<Artist>>),
    Albums(plex_proto::Result<Vec<Album>>),
    Playlists(plex_proto::Result<Vec<Playlist>>),
    Servers(plex_proto::Result<Vec<ServerConnection>>),
    Players(plex_proto::Result<Vec<PlayerConnection>>),
}

impl Fetched {
    pub fn kind(&self) -> ListKind {
        match self {
            Fetched::Artists(_) => ListKind::Artists,
            Fetched::Albums(_) => ListKind::Albums,
            Fetched::Playlists(_) => ListKind::Playlists,
            Fetched::Servers(_) => ListKind::Servers,
            Fetched::Players(_) => ListKind::Players,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Resize(u16, u16),
    Fetched(Fetched),
    PlaybackTriggered(plex_proto::Result<()>),
    /// From the 2 s poll ticker.
    PollTick,
    /// A timeline poll finished. Errors arrive as the neutral snapshot.
    PollResult {
        epoch: u64,
        snapshot: PlaybackSnapshot,
    },
    /// Libraries of a newly chosen server were fetched.
    ServerSelected {
        server: ServerConnection,
        libraries: plex_proto::Result<Vec<Library>>,
    },
    PlayerSelected {
        player: PlayerConnection,
    },
    /// Outcome of a best-effort transport command. Only logged.
    ControlSent {
        command: PlayerCommand,
        result: plex_proto::Result<()>,
    },
    Quit,
}

/// Side effects requested by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a list. `server_addr`/`library_id` are ignored where the list
    /// does not need them.
    Fetch {
        kind: ListKind,
        server_addr: String,
        library_id: String,
    },
    /// Send a `listen.plex.tv` trigger URL to the player.
    Trigger {
        address: String,
        url: String,
        shuffle: bool,
    },
    /// Fire-and-forget transport command.
    Control {
        address: String,
        command: PlayerCommand,
    },
    Poll {
        address: String,
        epoch: u64,
    },
    /// Fetch the libraries of `server`, answered by `ServerSelected`.
    SelectServer {
        server: ServerConnection,
    },
}
