use serde::{Deserialize, Serialize};

/// A music library section on a media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub rating_key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub rating_key: String,
    pub title: String,
    /// Artist name.
    pub parent_title: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub rating_key: String,
    pub title: String,
}

/// One reachable connection of a server-providing device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConnection {
    pub client_identifier: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub is_local: bool,
}

impl ServerConnection {
    /// `address:port`, the form stored as the server address in settings.
    pub fn host_port(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// One reachable connection of a player-providing device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConnection {
    pub client_identifier: String,
    pub name: String,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Artist,
    Album,
    Playlist,
    Station,
}

impl FavoriteKind {
    /// Kinds offered by the edit form, in cycle order.
    pub const EDITABLE: [FavoriteKind; 3] =
        [FavoriteKind::Artist, FavoriteKind::Album, FavoriteKind::Playlist];

    pub fn as_str(self) -> &'static str {
        match self {
            FavoriteKind::Artist => "artist",
            FavoriteKind::Album => "album",
            FavoriteKind::Playlist => "playlist",
            FavoriteKind::Station => "station",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FavoriteKind::Artist => "Artist",
            FavoriteKind::Album => "Album",
            FavoriteKind::Playlist => "Playlist",
            FavoriteKind::Station => "Station",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist" => Some(FavoriteKind::Artist),
            "album" => Some(FavoriteKind::Album),
            "playlist" => Some(FavoriteKind::Playlist),
            "station" => Some(FavoriteKind::Station),
            _ => None,
        }
    }
}

impl std::fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A saved shortcut. Unique by `(kind, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    pub key: String,
}

impl FavoriteItem {
    pub fn new(name: impl Into<String>, kind: FavoriteKind, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            key: key.into(),
        }
    }
}

/// What the player last reported. All zero/empty when the player is
/// unreachable or idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub track_label: String,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: u8,
}

/// `m:ss`, with `0:00` for anything non-positive.
pub fn format_time(ms: u64) -> String {
    if ms == 0 {
        return "0:00".to_string();
    }
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_minutes_seconds() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(999), "0:00");
        assert_eq!(format_time(61_000), "1:01");
        assert_eq!(format_time(3_725_000), "62:05");
    }

    #[test]
    fn favorite_kind_parse_is_case_insensitive() {
        assert_eq!(FavoriteKind::parse("Album"), Some(FavoriteKind::Album));
        assert_eq!(FavoriteKind::parse(" station "), Some(FavoriteKind::Station));
        assert_eq!(FavoriteKind::parse("track"), None);
    }

    #[test]
    fn favorite_item_json_uses_type_field() {
        let item: FavoriteItem =
            serde_json::from_str(r#"{"name":"Blue","type":"album","key":"42"}"#).unwrap();
        assert_eq!(item, FavoriteItem::new("Blue", FavoriteKind::Album, "42"));
    }

    #[test]
    fn server_host_port() {
        let s = ServerConnection {
            client_identifier: "abc".into(),
            name: "nas".into(),
            address: "10.0.0.2".into(),
            port: 32400,
            is_local: true,
        };
        assert_eq!(s.host_port(), "10.0.0.2:32400");
    }
}
