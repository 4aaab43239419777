//! Player client against a mock player on a local port.

mod common;

use axum::http::StatusCode;
use plex_proto::player::{PlayerClient, PlayerCommand};
use plex_proto::playback_url::PlaybackUrlBuilder;
use plex_proto::PlexError;

use common::spawn_mock;

fn no_content(_: &str) -> (StatusCode, String) {
    (StatusCode::NO_CONTENT, String::new())
}

fn server_error(_: &str) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, String::new())
}

fn accepted(_: &str) -> (StatusCode, String) {
    (StatusCode::ACCEPTED, String::new())
}

fn timeline(_: &str) -> (StatusCode, String) {
    (
        StatusCode::OK,
        r#"{"MediaContainer":{"Timeline":[
            {"type":"video","state":"stopped"},
            {"type":"music","state":"paused","time":"1500","duration":"300000","volume":"70",
             "Track":{"title":"Hey","parentTitle":"Pixies","grandparentTitle":"Doolittle"}}
        ]}}"#
            .to_string(),
    )
}

#[tokio::test]
async fn transport_command_hits_player_path() {
    let (addr, seen) = spawn_mock(no_content).await;
    let client = PlayerClient::with_port(addr.port()).unwrap();

    client
        .command("127.0.0.1", PlayerCommand::SetVolume(35))
        .await
        .unwrap();
    client.command("127.0.0.1", PlayerCommand::SkipNext).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].path_and_query,
        "/player/playback/setParameters?volume=35&commandID=1&type=music"
    );
    assert_eq!(seen[1].path_and_query, "/player/playback/skipNext");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (addr, _) = spawn_mock(server_error).await;
    let client = PlayerClient::with_port(addr.port()).unwrap();
    let err = client.command("127.0.0.1", PlayerCommand::Play).await.unwrap_err();
    assert!(matches!(err, PlexError::Status(500)));
}

#[tokio::test]
async fn only_200_and_204_count_as_sent() {
    let (addr, _) = spawn_mock(accepted).await;
    let client = PlayerClient::with_port(addr.port()).unwrap();
    let err = client.command("127.0.0.1", PlayerCommand::Pause).await.unwrap_err();
    assert!(matches!(err, PlexError::Status(202)));
}

#[tokio::test]
async fn playback_trigger_is_rewritten_and_shuffled() {
    let (addr, seen) = spawn_mock(no_content).await;
    let client = PlayerClient::with_port(addr.port()).unwrap();
    let url = PlaybackUrlBuilder::new("srv").play_queue("42");

    client.send_playback_url("127.0.0.1", &url, true).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let pq = &seen[0].path_and_query;
    assert!(pq.starts_with("/player/playback/createPlayQueue?uri=server%3A%2F%2Fsrv"));
    assert!(pq.ends_with("&shuffle=1"));
}

#[tokio::test]
async fn timeline_is_parsed() {
    let (addr, seen) = spawn_mock(timeline).await;
    let client = PlayerClient::with_port(addr.port()).unwrap();

    let snap = client.timeline("127.0.0.1", 3).await.unwrap();
    assert!(!snap.is_playing);
    assert_eq!(snap.track_label, "Doolittle - Hey (Pixies)");
    assert_eq!(snap.position_ms, 1500);
    assert_eq!(snap.duration_ms, 300_000);
    assert_eq!(snap.volume, 70);

    assert_eq!(
        seen.lock().unwrap()[0].path_and_query,
        "/player/timeline/poll?wait=1&includeMetadata=1&commandID=3&type=music"
    );
}

#[tokio::test]
async fn unreachable_player_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = PlayerClient::with_port(port).unwrap();
    let err = client.command("127.0.0.1", PlayerCommand::Play).await.unwrap_err();
    assert!(matches!(err, PlexError::Http(_)));
}
