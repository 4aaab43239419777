//! Builds `listen.plex.tv` playback URLs and rewrites them for a local
//! headless player.
//!
//! Every function here is pure except [`PlaybackUrlBuilder::artist_radio`],
//! which draws a fresh station id per call.

use crate::platform::PLAYER_CONTROL_PORT;
use crate::protocol::{FavoriteItem, FavoriteKind};

pub const LISTEN_BASE_URL: &str = "https://listen.plex.tv";
const LISTEN_BASE_URL_HTTP: &str = "http://listen.plex.tv";

/// What a playback trigger asks the player to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// Album or artist: a plain play queue.
    Queue,
    Playlist,
    /// Artist radio, seeded with a new station id.
    Radio,
}

impl PlaybackTarget {
    pub fn for_kind(kind: FavoriteKind) -> Self {
        match kind {
            FavoriteKind::Artist | FavoriteKind::Album => PlaybackTarget::Queue,
            FavoriteKind::Playlist => PlaybackTarget::Playlist,
            FavoriteKind::Station => PlaybackTarget::Radio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackUrlBuilder {
    server_id: String,
}

impl PlaybackUrlBuilder {
    pub fn new(server_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
        }
    }

    pub fn content_uri(&self, content_id: &str) -> String {
        format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            self.server_id, content_id
        )
    }

    pub fn play_queue(&self, content_id: &str) -> String {
        format!(
            "{LISTEN_BASE_URL}/player/playback/createPlayQueue?uri={}",
            query_escape(&self.content_uri(content_id))
        )
    }

    pub fn playlist(&self, content_id: &str) -> String {
        format!(
            "{LISTEN_BASE_URL}/player/playback/createPlayQueue?source={}&uri={}&playlistID={}&type=audio",
            query_escape(&self.server_id),
            query_escape(&self.content_uri(content_id)),
            content_id
        )
    }

    pub fn radio_with_station(&self, content_id: &str, station: &str) -> String {
        let uri = format!("{}/station/{}", self.content_uri(content_id), station);
        format!(
            "{LISTEN_BASE_URL}/player/playback/playMedia?type=10&type=audio&uri={}",
            query_escape(&uri)
        )
    }

    pub fn artist_radio(&self, content_id: &str) -> String {
        self.radio_with_station(content_id, &uuid::Uuid::new_v4().to_string())
    }

    pub fn build(&self, target: PlaybackTarget, content_id: &str) -> String {
        match target {
            PlaybackTarget::Queue => self.play_queue(content_id),
            PlaybackTarget::Playlist => self.playlist(content_id),
            PlaybackTarget::Radio => self.artist_radio(content_id),
        }
    }

    pub fn for_favorite(&self, item: &FavoriteItem) -> String {
        self.build(PlaybackTarget::for_kind(item.kind), &item.key)
    }
}

/// Query-component escaping in `application/x-www-form-urlencoded` form:
/// space becomes `+`, `A-Za-z0-9` and `*-._` pass through, everything else
/// is `%XX` with uppercase hex.
pub fn query_escape(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Sets `shuffle=1` (exactly once) or strips every `shuffle` key.
///
/// Other query pairs are kept in order, byte-for-byte. `shuffle=0` is never
/// emitted.
pub fn apply_shuffle(url: &str, on: bool) -> String {
    let (without_fragment, fragment) = match url.find('#') {
        Some(i) => (&url[..i], &url[i..]),
        None => (url, ""),
    };
    let (base, query) = match without_fragment.find('?') {
        Some(i) => (&without_fragment[..i], &without_fragment[i + 1..]),
        None => (without_fragment, ""),
    };

    let mut pairs: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty())
        .filter(|p| p.split('=').next() != Some("shuffle"))
        .collect();
    if on {
        pairs.push("shuffle=1");
    }

    if pairs.is_empty() {
        format!("{base}{fragment}")
    } else {
        format!("{base}?{}{fragment}", pairs.join("&"))
    }
}

/// Points a `listen.plex.tv` URL at the player's control port.
///
/// Only a leading `https://listen.plex.tv` or `http://listen.plex.tv` host is
/// replaced; anything else is returned unchanged.
pub fn rewrite_for_player(url: &str, address: &str) -> String {
    rewrite_for_player_port(url, address, PLAYER_CONTROL_PORT)
}

pub fn rewrite_for_player_port(url: &str, address: &str, port: u16) -> String {
    for prefix in [LISTEN_BASE_URL, LISTEN_BASE_URL_HTTP] {
        if let Some(rest) = url.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
                return format!("http://{address}:{port}{rest}");
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_queue_escapes_uri() {
        let b = PlaybackUrlBuilder::new("abc123");
        assert_eq!(
            b.play_queue("42"),
            "https://listen.plex.tv/player/playback/createPlayQueue?uri=server%3A%2F%2Fabc123%2Fcom.plexapp.plugins.library%2Flibrary%2Fmetadata%2F42"
        );
    }

    #[test]
    fn playlist_carries_source_and_id() {
        let b = PlaybackUrlBuilder::new("srv");
        let url = b.playlist("7");
        assert!(url.starts_with("https://listen.plex.tv/player/playback/createPlayQueue?source=srv&uri="));
        assert!(url.ends_with("&playlistID=7&type=audio"));
    }

    #[test]
    fn radio_appends_station() {
        let b = PlaybackUrlBuilder::new("srv");
        let url = b.radio_with_station("9", "u-1");
        assert_eq!(
            url,
            "https://listen.plex.tv/player/playback/playMedia?type=10&type=audio&uri=server%3A%2F%2Fsrv%2Fcom.plexapp.plugins.library%2Flibrary%2Fmetadata%2F9%2Fstation%2Fu-1"
        );
    }

    #[test]
    fn radio_station_is_fresh_each_call() {
        let b = PlaybackUrlBuilder::new("srv");
        assert_ne!(b.artist_radio("9"), b.artist_radio("9"));
    }

    #[test]
    fn favorite_kinds_map_to_targets() {
        assert_eq!(PlaybackTarget::for_kind(FavoriteKind::Artist), PlaybackTarget::Queue);
        assert_eq!(PlaybackTarget::for_kind(FavoriteKind::Album), PlaybackTarget::Queue);
        assert_eq!(PlaybackTarget::for_kind(FavoriteKind::Playlist), PlaybackTarget::Playlist);
        assert_eq!(PlaybackTarget::for_kind(FavoriteKind::Station), PlaybackTarget::Radio);
    }

    #[test]
    fn query_escape_matches_form_encoding() {
        assert_eq!(query_escape("a b/c:d_f.g-h"), "a+b%2Fc%3Ad_f.g-h");
        assert_eq!(query_escape("é"), "%C3%A9");
        // form encoding escapes `~` and keeps `*`
        assert_eq!(query_escape("~*"), "%7E*");
    }

    #[test]
    fn shuffle_on_is_idempotent() {
        let url = "http://h/p?uri=x%2Fy&shuffle=0&type=audio";
        let once = apply_shuffle(url, true);
        assert_eq!(once, "http://h/p?uri=x%2Fy&type=audio&shuffle=1");
        assert_eq!(apply_shuffle(&once, true), once);
    }

    #[test]
    fn shuffle_off_strips_every_key() {
        let url = "http://h/p?shuffle=1&a=1&shuffle=1";
        assert_eq!(apply_shuffle(url, false), "http://h/p?a=1");
        assert_eq!(apply_shuffle("http://h/p?shuffle=1", false), "http://h/p");
    }

    #[test]
    fn shuffle_on_then_off_restores_built_urls() {
        let b = PlaybackUrlBuilder::new("srv");
        for url in [
            b.play_queue("42"),
            b.playlist("7"),
            b.radio_with_station("9", "u-1"),
        ] {
            let on = apply_shuffle(&url, true);
            assert!(on.ends_with("&shuffle=1"));
            assert_eq!(apply_shuffle(&on, false), url);
        }
    }

    #[test]
    fn shuffle_on_without_query() {
        assert_eq!(apply_shuffle("http://h/p", true), "http://h/p?shuffle=1");
    }

    #[test]
    fn rewrite_replaces_only_leading_host() {
        assert_eq!(
            rewrite_for_player("https://listen.plex.tv/player/playback/x?a=1", "10.0.0.5"),
            "http://10.0.0.5:32500/player/playback/x?a=1"
        );
        assert_eq!(
            rewrite_for_player("http://listen.plex.tv/p", "h"),
            "http://h:32500/p"
        );
        let other = "https://example.com/?u=https://listen.plex.tv";
        assert_eq!(rewrite_for_player(other, "h"), other);
        let lookalike = "https://listen.plex.tv.evil/p";
        assert_eq!(rewrite_for_player(lookalike, "h"), lookalike);
    }
}
