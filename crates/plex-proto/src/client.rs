//! Media-server library calls and plex.tv resource discovery.

use std::time::Duration;
use tracing::debug;

use crate::auth::ClientIdentity;
use crate::error::{PlexError, Result};
use crate::protocol::{Album, Artist, Library, PlayerConnection, Playlist, ServerConnection};
use crate::wire;

pub const PLEX_TV_URL: &str = "https://plex.tv";
pub const LIBRARY_TIMEOUT: Duration = Duration::from_secs(10);

/// Async client for the library/browse API of one media server at a time
/// and the plex.tv resources API.
#[derive(Debug, Clone)]
pub struct PlexClient {
    http: reqwest::Client,
    identity: ClientIdentity,
    token: Option<String>,
    plex_tv_url: String,
}

impl PlexClient {
    pub fn new(identity: ClientIdentity, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LIBRARY_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            identity,
            token,
            plex_tv_url: PLEX_TV_URL.to_string(),
        })
    }

    /// Points resource discovery somewhere other than plex.tv.
    pub fn with_plex_tv_url(mut self, url: impl Into<String>) -> Self {
        self.plex_tv_url = url.into();
        self
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(PlexError::AuthRequired)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let token = self.token()?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .headers(self.identity.headers())
            .header("X-Plex-Token", token)
            .send()
            .await?;
        let status = resp.status();
        debug!("{url} -> {status}");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlexError::AuthRequired);
        }
        if !status.is_success() {
            return Err(PlexError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }

    pub async fn artists(&self, server_addr: &str, library_id: &str) -> Result<Vec<Artist>> {
        let url = format!("http://{server_addr}/library/sections/{library_id}/all?type=8");
        wire::parse_artists(&self.get_text(&url).await?)
    }

    pub async fn albums(&self, server_addr: &str, library_id: &str) -> Result<Vec<Album>> {
        let url = format!("http://{server_addr}/library/sections/{library_id}/all?type=9");
        wire::parse_albums(&self.get_text(&url).await?)
    }

    pub async fn playlists(&self, server_addr: &str) -> Result<Vec<Playlist>> {
        let url = format!("http://{server_addr}/playlists");
        wire::parse_playlists(&self.get_text(&url).await?)
    }

    pub async fn libraries(&self, server_addr: &str) -> Result<Vec<Library>> {
        let url = format!("http://{server_addr}/library/sections");
        wire::parse_libraries(&self.get_text(&url).await?)
    }

    fn resources_url(&self) -> String {
        format!(
            "{}/api/v2/resources?includeHttps=1&includeRelay=1",
            self.plex_tv_url
        )
    }

    pub async fn servers(&self) -> Result<Vec<ServerConnection>> {
        let url = self.resources_url();
        wire::parse_servers(&self.get_text(&url).await?)
    }

    pub async fn players(&self) -> Result<Vec<PlayerConnection>> {
        let url = self.resources_url();
        wire::parse_players(&self.get_text(&url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ClientIdentity {
        ClientIdentity {
            client_id: "plexamp-tui-test".into(),
        }
    }

    #[tokio::test]
    async fn missing_token_fails_before_network() {
        // Unroutable address: a network attempt would time out, not fail fast.
        let client = PlexClient::new(identity(), None).unwrap();
        let err = client.artists("10.255.255.1:32400", "1").await.unwrap_err();
        assert!(matches!(err, PlexError::AuthRequired));
        let err = client.servers().await.unwrap_err();
        assert!(matches!(err, PlexError::AuthRequired));
    }
}
