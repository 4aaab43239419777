use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PlexError, Result};
use crate::protocol::Library;

pub const PLACEHOLDER_SERVER: &str = "SELECT_SERVER";
pub const PLACEHOLDER_PLAYER: &str = "SELECT_PLAYER";
pub const PLACEHOLDER_LIBRARY: &str = "SELECT_LIBRARY";

/// Connection settings persisted as `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Machine identifier of the media server, used in content URIs.
    #[serde(default)]
    pub server_id: String,
    /// `host:port` of the media server for library calls.
    #[serde(default)]
    pub plex_server_addr: String,
    #[serde(default)]
    pub plex_server_name: String,
    #[serde(default)]
    pub plex_library_id: String,
    #[serde(default)]
    pub plex_library_name: String,
    #[serde(default)]
    pub plex_libraries: Vec<Library>,
    /// Address of the headless player. Empty means none selected.
    #[serde(default)]
    pub selected_player: String,
    #[serde(default)]
    pub selected_player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_id: PLACEHOLDER_SERVER.to_string(),
            plex_server_addr: "127.0.0.1:32400".to_string(),
            plex_server_name: PLACEHOLDER_SERVER.to_string(),
            plex_library_id: "15".to_string(),
            plex_library_name: PLACEHOLDER_LIBRARY.to_string(),
            plex_libraries: vec![Library {
                key: "15".to_string(),
                title: PLACEHOLDER_LIBRARY.to_string(),
                kind: "artist".to_string(),
            }],
            selected_player: "127.0.0.1".to_string(),
            selected_player_name: PLACEHOLDER_PLAYER.to_string(),
        }
    }
}

/// Outcome of a settings load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub settings: Settings,
    /// No file existed; defaults were written.
    pub using_default: bool,
}

/// Load/save capability for connection settings.
pub trait SettingsStore: Send {
    fn load(&self) -> Result<Loaded>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// `config.json` on disk, written atomically.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Loaded> {
        if !self.path.exists() {
            info!("no config at {}, writing defaults", self.path.display());
            let settings = Settings::default();
            self.save(&settings)?;
            return Ok(Loaded {
                settings,
                using_default: true,
            });
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PlexError::Config(format!("{}: {e}", self.path.display())))?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| PlexError::Config(format!("{}: {e}", self.path.display())))?;
        debug!("loaded config from {}", self.path.display());
        Ok(Loaded {
            settings,
            using_default: false,
        })
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let content = serde_json::to_vec_pretty(settings)?;
        write_atomic(&self.path, &content)
    }
}

/// Writes to a temp file beside `path`, then renames over it.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PlexError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.server_id, "SELECT_SERVER");
        assert_eq!(s.plex_server_addr, "127.0.0.1:32400");
        assert_eq!(s.plex_library_id, "15");
        assert_eq!(s.plex_libraries.len(), 1);
        assert_eq!(s.plex_libraries[0].kind, "artist");
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("config.json"));
        let loaded = store.load().unwrap();
        assert!(loaded.using_default);
        assert!(store.path().exists());

        let again = store.load().unwrap();
        assert!(!again.using_default);
        assert_eq!(again.settings, Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested").join("config.json"));
        let mut s = Settings::default();
        s.selected_player = "10.0.0.9".into();
        s.plex_libraries.push(Library {
            key: "3".into(),
            title: "Jazz".into(),
            kind: "artist".into(),
        });
        store.save(&s).unwrap();
        assert_eq!(store.load().unwrap().settings, s);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonSettingsStore::new(path).load().unwrap_err();
        assert!(matches!(err, PlexError::Config(_)));
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"selected_player":"1.2.3.4"}"#).unwrap();
        let s = JsonSettingsStore::new(path).load().unwrap().settings;
        assert_eq!(s.selected_player, "1.2.3.4");
        assert!(s.plex_libraries.is_empty());
    }
}
