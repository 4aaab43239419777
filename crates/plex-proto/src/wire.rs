//! JSON shapes returned by media servers, plex.tv and the player, and the
//! mapping into domain records.
//!
//! Plex is inconsistent about scalar types (ids and numbers show up both as
//! JSON strings and as JSON numbers), so every scalar is read leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;
use crate::protocol::{
    Album, Artist, Library, PlaybackSnapshot, PlayerConnection, Playlist, ServerConnection,
};

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    let s = lenient_string(d)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f.max(0.0) as u64).unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataItem>,
}

#[derive(Debug, Deserialize)]
struct MetadataItem {
    #[serde(rename = "ratingKey", default, deserialize_with = "lenient_string")]
    rating_key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    kind: String,
    #[serde(rename = "parentTitle", default, deserialize_with = "lenient_string")]
    parent_title: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<DirectoryItem>,
}

#[derive(Debug, Deserialize)]
struct DirectoryItem {
    #[serde(default, deserialize_with = "lenient_string")]
    key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    kind: String,
}

/// Artists of a library section, sorted by title.
pub fn parse_artists(body: &str) -> Result<Vec<Artist>> {
    let env: Envelope<MetadataContainer> = serde_json::from_str(body)?;
    let mut artists: Vec<Artist> = env
        .media_container
        .metadata
        .into_iter()
        .filter(|m| m.kind.is_empty() || m.kind == "artist")
        .map(|m| Artist {
            rating_key: m.rating_key,
            title: m.title,
        })
        .collect();
    artists.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(artists)
}

/// Albums of a library section, sorted by artist name.
pub fn parse_albums(body: &str) -> Result<Vec<Album>> {
    let env: Envelope<MetadataContainer> = serde_json::from_str(body)?;
    let mut albums: Vec<Album> = env
        .media_container
        .metadata
        .into_iter()
        .filter(|m| m.kind.is_empty() || m.kind == "album")
        .map(|m| Album {
            rating_key: m.rating_key,
            title: m.title,
            parent_title: m.parent_title,
            year: m.year,
        })
        .collect();
    // stable: albums by the same artist keep server order
    albums.sort_by(|a, b| a.parent_title.cmp(&b.parent_title));
    Ok(albums)
}

pub fn parse_playlists(body: &str) -> Result<Vec<Playlist>> {
    let env: Envelope<MetadataContainer> = serde_json::from_str(body)?;
    Ok(env
        .media_container
        .metadata
        .into_iter()
        .map(|m| Playlist {
            rating_key: m.rating_key,
            title: m.title,
        })
        .collect())
}

/// Music sections only.
pub fn parse_libraries(body: &str) -> Result<Vec<Library>> {
    let env: Envelope<DirectoryContainer> = serde_json::from_str(body)?;
    Ok(env
        .media_container
        .directory
        .into_iter()
        .filter(|d| d.kind == "artist")
        .map(|d| Library {
            key: d.key,
            title: d.title,
            kind: d.kind,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct Device {
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "clientIdentifier", default, deserialize_with = "lenient_string")]
    client_identifier: String,
    #[serde(default, deserialize_with = "lenient_string")]
    provides: String,
    #[serde(default)]
    connections: Vec<Connection>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default, deserialize_with = "lenient_string")]
    address: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    port: u64,
    #[serde(default, deserialize_with = "lenient_bool")]
    local: bool,
}

fn devices_providing(body: &str, capability: &str) -> Result<Vec<(String, String, Connection)>> {
    let devices: Vec<Device> = serde_json::from_str(body)?;
    Ok(devices
        .into_iter()
        .filter(|d| d.provides.split(',').any(|p| p.trim() == capability))
        .flat_map(|d| {
            let Device {
                name,
                client_identifier,
                connections,
                ..
            } = d;
            connections
                .into_iter()
                .map(move |c| (name.clone(), client_identifier.clone(), c))
        })
        .collect())
}

/// One entry per connection of every device providing `server`.
pub fn parse_servers(body: &str) -> Result<Vec<ServerConnection>> {
    Ok(devices_providing(body, "server")?
        .into_iter()
        .map(|(name, client_identifier, c)| ServerConnection {
            client_identifier,
            name,
            address: c.address,
            port: u16::try_from(c.port).unwrap_or(0),
            is_local: c.local,
        })
        .collect())
}

/// One entry per connection of every device providing `player`.
pub fn parse_players(body: &str) -> Result<Vec<PlayerConnection>> {
    Ok(devices_providing(body, "player")?
        .into_iter()
        .map(|(name, client_identifier, c)| PlayerConnection {
            client_identifier,
            name,
            address: c.address,
            port: u16::try_from(c.port).unwrap_or(0),
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
struct TimelineContainer {
    #[serde(rename = "Timeline", default)]
    timeline: Vec<Timeline>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    state: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    time: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    duration: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    volume: u64,
    #[serde(rename = "Track", alias = "Metadata", default, deserialize_with = "lenient_track")]
    track: Option<TimelineTrack>,
}

#[derive(Debug, Deserialize)]
struct TimelineTrack {
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "parentTitle", default, deserialize_with = "lenient_string")]
    parent_title: String,
    #[serde(rename = "grandparentTitle", default, deserialize_with = "lenient_string")]
    grandparent_title: String,
}

/// The track may come as an object or as a one-element array.
fn lenient_track<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<TimelineTrack>, D::Error> {
    let value = match Value::deserialize(d)? {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(map) => Some(Value::Object(map)),
        _ => None,
    };
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Picks the first `music` timeline, else the first one.
pub fn parse_timeline(body: &str) -> Result<PlaybackSnapshot> {
    let env: Envelope<TimelineContainer> = serde_json::from_str(body)?;
    let timelines = env.media_container.timeline;
    let Some(chosen) = timelines
        .iter()
        .find(|t| t.kind == "music")
        .or_else(|| timelines.first())
    else {
        return Ok(PlaybackSnapshot::default());
    };

    let track_label = match &chosen.track {
        Some(t) if !t.title.is_empty() => {
            format!("{} - {} ({})", t.grandparent_title, t.title, t.parent_title)
        }
        _ => String::new(),
    };

    Ok(PlaybackSnapshot {
        is_playing: chosen.state == "playing",
        track_label,
        position_ms: chosen.time,
        duration_ms: chosen.duration,
        volume: chosen.volume.min(100) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artists_sorted_and_filtered() {
        let body = r#"{"MediaContainer":{"size":3,"Metadata":[
            {"ratingKey":"2","title":"Zappa","type":"artist"},
            {"ratingKey":3,"title":"Abba","type":"artist"},
            {"ratingKey":"4","title":"Not an artist","type":"album"}
        ]}}"#;
        let artists = parse_artists(body).unwrap();
        assert_eq!(
            artists,
            vec![
                Artist { rating_key: "3".into(), title: "Abba".into() },
                Artist { rating_key: "2".into(), title: "Zappa".into() },
            ]
        );
    }

    #[test]
    fn albums_sorted_by_artist_with_numeric_year() {
        let body = r#"{"MediaContainer":{"Metadata":[
            {"ratingKey":"10","title":"Kid A","parentTitle":"Radiohead","year":2000,"type":"album"},
            {"ratingKey":"11","title":"Blue","parentTitle":"Joni Mitchell","type":"album"}
        ]}}"#;
        let albums = parse_albums(body).unwrap();
        assert_eq!(albums[0].parent_title, "Joni Mitchell");
        assert_eq!(albums[0].year, None);
        assert_eq!(albums[1].year.as_deref(), Some("2000"));
    }

    #[test]
    fn empty_container_is_empty_list() {
        assert!(parse_playlists(r#"{"MediaContainer":{"size":0}}"#).unwrap().is_empty());
    }

    #[test]
    fn libraries_keep_music_sections() {
        let body = r#"{"MediaContainer":{"Directory":[
            {"key":"1","title":"Movies","type":"movie"},
            {"key":"15","title":"Music","type":"artist"}
        ]}}"#;
        assert_eq!(
            parse_libraries(body).unwrap(),
            vec![Library { key: "15".into(), title: "Music".into(), kind: "artist".into() }]
        );
    }

    #[test]
    fn resources_split_by_capability_and_connection() {
        let body = r#"[
            {"name":"nas","clientIdentifier":"s1","provides":"server",
             "connections":[
                {"address":"10.0.0.2","port":32400,"local":true},
                {"address":"1.2.3.4","port":"32400","local":false}]},
            {"name":"pi","clientIdentifier":"p1","provides":"client,player",
             "connections":[{"address":"10.0.0.7","port":32500,"local":true}]}
        ]"#;
        let servers = parse_servers(body).unwrap();
        assert_eq!(servers.len(), 2);
        assert!(servers[0].is_local);
        assert!(!servers[1].is_local);
        assert_eq!(servers[1].port, 32400);

        let players = parse_players(body).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "pi");
        assert_eq!(players[0].address, "10.0.0.7");
    }

    #[test]
    fn timeline_prefers_music() {
        let body = r#"{"MediaContainer":{"Timeline":[
            {"type":"video","state":"stopped","time":"0"},
            {"type":"music","state":"playing","time":"61000","duration":200000,"volume":"55",
             "Track":{"title":"Song","parentTitle":"Album","grandparentTitle":"Artist"}}
        ]}}"#;
        let snap = parse_timeline(body).unwrap();
        assert!(snap.is_playing);
        assert_eq!(snap.track_label, "Artist - Song (Album)");
        assert_eq!(snap.position_ms, 61_000);
        assert_eq!(snap.duration_ms, 200_000);
        assert_eq!(snap.volume, 55);
    }

    #[test]
    fn timeline_without_title_has_empty_label() {
        let body = r#"{"MediaContainer":{"Timeline":[{"type":"photo","state":"paused","time":5}]}}"#;
        let snap = parse_timeline(body).unwrap();
        assert!(!snap.is_playing);
        assert_eq!(snap.track_label, "");
        assert_eq!(snap.position_ms, 5);
    }

    #[test]
    fn timeline_malformed_is_error() {
        assert!(parse_timeline("<xml/>").is_err());
    }
}
