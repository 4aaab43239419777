//! plex.tv PIN authorization and the stored credential.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::write_atomic;
use crate::error::{PlexError, Result};
use crate::playback_url::query_escape;

pub const PLEX_API_URL: &str = "https://plex.tv/api/v2";
pub const PRODUCT: &str = "Plexamp TUI";
pub const VERSION: &str = "1.0.0";
pub const PLATFORM: &str = "Linux";
pub const DEVICE: &str = "Terminal";

pub const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);
pub const AUTH_DEADLINE: Duration = Duration::from_secs(5 * 60);
pub const PIN_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Identifies this installation to plex.tv and media servers.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: String,
}

impl ClientIdentity {
    pub fn for_this_host() -> Self {
        Self {
            client_id: format!("plexamp-tui-{}", hostname()),
        }
    }

    /// `X-Plex-*` headers plus `Accept: application/json`.
    pub fn headers(&self) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ACCEPT, HeaderValue::from_static("application/json"));
        h.insert("x-plex-product", HeaderValue::from_static(PRODUCT));
        h.insert("x-plex-version", HeaderValue::from_static(VERSION));
        h.insert("x-plex-platform", HeaderValue::from_static(PLATFORM));
        h.insert("x-plex-device", HeaderValue::from_static(DEVICE));
        if let Ok(v) = HeaderValue::from_str(&self.client_id) {
            h.insert("x-plex-client-identifier", v);
        }
        h
    }

    /// Browser URL the user opens to approve `code`.
    pub fn auth_url(&self, code: &str) -> String {
        format!(
            "https://app.plex.tv/auth#?clientID={}&code={}&context[device][product]={}",
            query_escape(&self.client_id),
            code,
            query_escape(PRODUCT)
        )
    }
}

fn hostname() -> String {
    let host = gethostname::gethostname().to_string_lossy().trim().to_string();
    if host.is_empty() {
        "unknown".to_string()
    } else {
        host
    }
}

/// Contents of `plex_auth.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Non-empty token that has not passed its `expires_at`.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && self.expires_at.map_or(true, |exp| exp > now)
    }
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no credential has been stored yet.
    pub fn load(&self) -> Result<Option<Credentials>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// The stored token, if present and not expired.
    pub fn token(&self) -> Option<String> {
        match self.load() {
            Ok(Some(c)) if c.is_valid() => Some(c.token),
            Ok(_) => None,
            Err(e) => {
                warn!("unreadable credential file {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn save(&self, creds: &Credentials) -> Result<()> {
        let data = serde_json::to_vec_pretty(creds)?;
        write_atomic(&self.path, &data)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlexUser {
    #[serde(default)]
    username: String,
}

/// PIN-based authorization against plex.tv.
#[derive(Debug, Clone)]
pub struct PinAuthenticator {
    http: reqwest::Client,
    base_url: String,
    identity: ClientIdentity,
    check_interval: Duration,
    deadline: Duration,
}

impl PinAuthenticator {
    pub fn new(identity: ClientIdentity) -> Result<Self> {
        Self::with_base_url(identity, PLEX_API_URL)
    }

    pub fn with_base_url(identity: ClientIdentity, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(IDENTITY_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            identity,
            check_interval: PIN_CHECK_INTERVAL,
            deadline: AUTH_DEADLINE,
        })
    }

    pub fn with_timing(mut self, check_interval: Duration, deadline: Duration) -> Self {
        self.check_interval = check_interval;
        self.deadline = deadline;
        self
    }

    pub async fn request_pin(&self) -> Result<Pin> {
        let resp = self
            .http
            .post(format!("{}/pins?strong=true", self.base_url))
            .headers(self.identity.headers())
            .send()
            .await?;
        if resp.status() != reqwest::StatusCode::CREATED {
            return Err(PlexError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }

    pub async fn check_pin(&self, id: u64) -> Result<Pin> {
        let resp = self
            .http
            .get(format!("{}/pins/{id}", self.base_url))
            .headers(self.identity.headers())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(PlexError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }

    pub async fn fetch_username(&self, token: &str) -> Result<String> {
        let resp = self
            .http
            .get(format!("{}/user", self.base_url))
            .headers(self.identity.headers())
            .header("X-Plex-Token", token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(PlexError::Status(resp.status().as_u16()));
        }
        let user: PlexUser = resp.json().await?;
        Ok(user.username)
    }

    /// Asks plex.tv whether `token` still belongs to an account.
    ///
    /// `Ok(false)` when plex.tv rejects it (401/403); transport failures
    /// are returned as errors so the caller can decide.
    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        match self.fetch_username(token).await {
            Ok(user) => {
                debug!("token verified for {user}");
                Ok(true)
            }
            Err(PlexError::Status(401 | 403)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Runs the whole flow: request a PIN, hand the approval URL to
    /// `prompt`, then check the PIN until a token appears or the deadline
    /// passes. Failed checks are retried.
    pub async fn authenticate(&self, prompt: impl FnOnce(&str, &Pin)) -> Result<Credentials> {
        let pin = self.request_pin().await?;
        let url = self.identity.auth_url(&pin.code);
        prompt(&url, &pin);

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);
        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // interval fires immediately; the first check waits one period
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut deadline => return Err(PlexError::AuthTimedOut),
                _ = ticker.tick() => {
                    let checked = match self.check_pin(pin.id).await {
                        Ok(p) => p,
                        Err(e) => {
                            debug!("pin check failed: {e}");
                            continue;
                        }
                    };
                    let Some(token) = checked.auth_token.filter(|t| !t.is_empty()) else {
                        continue;
                    };
                    info!("pin {} authorized", pin.id);
                    let username = match self.fetch_username(&token).await {
                        Ok(u) => Some(u),
                        Err(e) => {
                            warn!("could not fetch user info: {e}");
                            None
                        }
                    };
                    return Ok(Credentials {
                        token,
                        username,
                        expires_at: Some(Utc::now() + ChronoDuration::days(365)),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_url_escapes_identity() {
        let id = ClientIdentity {
            client_id: "plexamp-tui-my host".into(),
        };
        assert_eq!(
            id.auth_url("ABCD"),
            "https://app.plex.tv/auth#?clientID=plexamp-tui-my+host&code=ABCD&context[device][product]=Plexamp+TUI"
        );
    }

    #[test]
    fn headers_carry_identity() {
        let id = ClientIdentity {
            client_id: "plexamp-tui-box".into(),
        };
        let h = id.headers();
        assert_eq!(h["x-plex-client-identifier"], "plexamp-tui-box");
        assert_eq!(h["x-plex-product"], "Plexamp TUI");
        assert_eq!(h["accept"], "application/json");
    }

    #[test]
    fn missing_credentials_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("plex_auth.json"));
        assert!(store.load().unwrap().is_none());
        assert!(store.token().is_none());
    }

    #[test]
    fn saved_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("plex_auth.json"));
        let creds = Credentials {
            token: "tok".into(),
            username: Some("me".into()),
            expires_at: None,
        };
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));
        assert_eq!(store.token().as_deref(), Some("tok"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_credentials_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("plex_auth.json"));
        store
            .save(&Credentials {
                token: "t".into(),
                username: None,
                expires_at: None,
            })
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn expired_credentials_yield_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("plex_auth.json"));
        store
            .save(&Credentials {
                token: "revoked".into(),
                username: None,
                expires_at: Some(Utc::now() - ChronoDuration::days(30)),
            })
            .unwrap();
        assert!(store.load().unwrap().is_some());
        assert!(store.token().is_none());
    }

    #[test]
    fn validity_follows_expiry() {
        let now = Utc::now();
        let mut creds = Credentials {
            token: "t".into(),
            username: None,
            expires_at: Some(now + ChronoDuration::hours(1)),
        };
        assert!(creds.is_valid_at(now));
        assert!(!creds.is_valid_at(now + ChronoDuration::hours(2)));
        creds.expires_at = None;
        assert!(creds.is_valid_at(now + ChronoDuration::days(10_000)));
    }

    #[test]
    fn this_host_gets_an_identifier() {
        let id = ClientIdentity::for_this_host();
        assert!(id.client_id.starts_with("plexamp-tui-"));
        assert!(id.client_id.len() > "plexamp-tui-".len());
    }

    #[test]
    fn empty_token_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plex_auth.json");
        std::fs::write(&path, r#"{"token":""}"#).unwrap();
        assert!(CredentialStore::new(path).token().is_none());
    }
}
