//! Local control API of a headless Plexamp player.

use std::time::Duration;
use tracing::debug;

use crate::error::{PlexError, Result};
use crate::platform::PLAYER_CONTROL_PORT;
use crate::playback_url::{apply_shuffle, rewrite_for_player_port};
use crate::protocol::PlaybackSnapshot;
use crate::wire;

pub const PLAYER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const PLAYER_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Fire-and-forget transport commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    SkipNext,
    SkipPrevious,
    SetVolume(u8),
    SeekTo(u64),
    Shuffle(bool),
}

impl PlayerCommand {
    /// Path and query under `/player/`.
    pub fn path(&self) -> String {
        match self {
            PlayerCommand::Play => "playback/play".to_string(),
            PlayerCommand::Pause => "playback/pause".to_string(),
            PlayerCommand::SkipNext => "playback/skipNext".to_string(),
            PlayerCommand::SkipPrevious => "playback/skipPrevious".to_string(),
            PlayerCommand::SetVolume(v) => {
                format!("playback/setParameters?volume={}&commandID=1&type=music", (*v).min(100))
            }
            PlayerCommand::SeekTo(ms) => format!("playback/seekTo?time={ms}"),
            PlayerCommand::Shuffle(true) => "playback/shuffle/on".to_string(),
            PlayerCommand::Shuffle(false) => "playback/shuffle/off".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PlayerCommand::Play => "Play".to_string(),
            PlayerCommand::Pause => "Pause".to_string(),
            PlayerCommand::SkipNext => "Next".to_string(),
            PlayerCommand::SkipPrevious => "Previous".to_string(),
            PlayerCommand::SetVolume(v) => format!("Volume {v}%"),
            PlayerCommand::SeekTo(ms) => {
                format!("Seek to {}", crate::protocol::format_time(*ms))
            }
            PlayerCommand::Shuffle(true) => "Shuffle ON".to_string(),
            PlayerCommand::Shuffle(false) => "Shuffle OFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerClient {
    http: reqwest::Client,
    port: u16,
}

impl PlayerClient {
    pub fn new() -> Result<Self> {
        Self::with_port(PLAYER_CONTROL_PORT)
    }

    /// Talks to the player on `port` instead of the standard control port.
    pub fn with_port(port: u16) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(PLAYER_REQUEST_TIMEOUT)
            .connect_timeout(PLAYER_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { http, port })
    }

    fn base(&self, address: &str) -> Result<String> {
        if address.is_empty() {
            return Err(PlexError::NoPlayerSelected);
        }
        Ok(format!("http://{address}:{}/player", self.port))
    }

    /// GET; 200 and 204 count as success.
    async fn send(&self, url: &str) -> Result<()> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        let status = resp.status().as_u16();
        debug!("{url} -> {status}");
        match status {
            200 | 204 => Ok(()),
            other => Err(PlexError::Status(other)),
        }
    }

    pub async fn command(&self, address: &str, cmd: PlayerCommand) -> Result<()> {
        let url = format!("{}/{}", self.base(address)?, cmd.path());
        self.send(&url).await
    }

    /// Applies the shuffle flag, rewrites the `listen.plex.tv` host to the
    /// player, and sends it.
    pub async fn send_playback_url(&self, address: &str, url: &str, shuffle: bool) -> Result<()> {
        if address.is_empty() {
            return Err(PlexError::NoServerSelected);
        }
        let shuffled = apply_shuffle(url, shuffle);
        let local = rewrite_for_player_port(&shuffled, address, self.port);
        self.send(&local).await
    }

    pub async fn timeline(&self, address: &str, command_id: u64) -> Result<PlaybackSnapshot> {
        let url = format!(
            "{}/timeline/poll?wait=1&includeMetadata=1&commandID={command_id}&type=music",
            self.base(address)?
        );
        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(PlexError::Status(resp.status().as_u16()));
        }
        wire::parse_timeline(&resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_paths() {
        assert_eq!(PlayerCommand::SkipNext.path(), "playback/skipNext");
        assert_eq!(
            PlayerCommand::SetVolume(40).path(),
            "playback/setParameters?volume=40&commandID=1&type=music"
        );
        assert_eq!(PlayerCommand::SeekTo(75_000).path(), "playback/seekTo?time=75000");
        assert_eq!(PlayerCommand::Shuffle(false).path(), "playback/shuffle/off");
    }

    #[test]
    fn command_labels() {
        assert_eq!(PlayerCommand::SetVolume(55).label(), "Volume 55%");
        assert_eq!(PlayerCommand::SeekTo(75_000).label(), "Seek to 1:15");
        assert_eq!(PlayerCommand::Shuffle(true).label(), "Shuffle ON");
    }

    #[tokio::test]
    async fn empty_address_fails_without_request() {
        let client = PlayerClient::new().unwrap();
        let err = client.command("", PlayerCommand::Play).await.unwrap_err();
        assert!(matches!(err, PlexError::NoPlayerSelected));
        let err = client
            .send_playback_url("", "https://listen.plex.tv/player/playback/x", true)
            .await
            .unwrap_err();
        assert!(matches!(err, PlexError::NoServerSelected));
    }
}
