//! Library and resource discovery against a mock media server.

mod common;

use axum::http::StatusCode;
use plex_proto::auth::ClientIdentity;
use plex_proto::client::PlexClient;
use plex_proto::PlexError;

use common::spawn_mock;

fn media_server(pq: &str) -> (StatusCode, String) {
    let body = if pq.starts_with("/library/sections/7/all?type=8") {
        r#"{"MediaContainer":{"Metadata":[
            {"ratingKey":"2","title":"Pixies","type":"artist"},
            {"ratingKey":"1","title":"Blur","type":"artist"}]}}"#
    } else if pq.starts_with("/library/sections/7/all?type=9") {
        r#"{"MediaContainer":{"Metadata":[
            {"ratingKey":"20","title":"Doolittle","parentTitle":"Pixies","year":1989,"type":"album"}]}}"#
    } else if pq == "/library/sections" {
        r#"{"MediaContainer":{"Directory":[
            {"key":"7","title":"Music","type":"artist"},
            {"key":"8","title":"Films","type":"movie"}]}}"#
    } else if pq == "/playlists" {
        r#"{"MediaContainer":{"Metadata":[{"ratingKey":"99","title":"Road trip"}]}}"#
    } else if pq.starts_with("/api/v2/resources") {
        r#"[{"name":"nas","clientIdentifier":"abc","provides":"server",
             "connections":[{"address":"127.0.0.1","port":32400,"local":true}]},
            {"name":"kitchen","clientIdentifier":"p1","provides":"player",
             "connections":[{"address":"10.0.0.8","port":32500,"local":true}]}]"#
    } else {
        return (StatusCode::NOT_FOUND, String::new());
    };
    (StatusCode::OK, body.to_string())
}

fn unauthorized(_: &str) -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, String::new())
}

fn client(token: Option<&str>) -> PlexClient {
    PlexClient::new(
        ClientIdentity {
            client_id: "plexamp-tui-test".into(),
        },
        token.map(str::to_string),
    )
    .unwrap()
}

#[tokio::test]
async fn artists_albums_playlists_and_libraries() {
    let (addr, seen) = spawn_mock(media_server).await;
    let c = client(Some("tok"));
    let server = addr.to_string();

    let artists = c.artists(&server, "7").await.unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].title, "Blur");

    let albums = c.albums(&server, "7").await.unwrap();
    assert_eq!(albums[0].year.as_deref(), Some("1989"));

    let playlists = c.playlists(&server).await.unwrap();
    assert_eq!(playlists[0].rating_key, "99");

    let libraries = c.libraries(&server).await.unwrap();
    assert_eq!(libraries.len(), 1);
    assert_eq!(libraries[0].key, "7");

    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .all(|s| s.token.as_deref() == Some("tok")));
}

#[tokio::test]
async fn resources_split_into_servers_and_players() {
    let (addr, _) = spawn_mock(media_server).await;
    let c = client(Some("tok")).with_plex_tv_url(format!("http://{addr}"));

    let servers = c.servers().await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].host_port(), "127.0.0.1:32400");

    let players = c.players().await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "kitchen");
}

#[tokio::test]
async fn rejected_token_is_auth_required() {
    let (addr, _) = spawn_mock(unauthorized).await;
    let err = client(Some("bad")).playlists(&addr.to_string()).await.unwrap_err();
    assert!(matches!(err, PlexError::AuthRequired));
}

#[tokio::test]
async fn missing_section_is_status_error() {
    let (addr, _) = spawn_mock(media_server).await;
    let err = client(Some("tok"))
        .artists(&addr.to_string(), "404")
        .await
        .unwrap_err();
    assert!(matches!(err, PlexError::Status(404)));
}
