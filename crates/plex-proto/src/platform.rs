use std::path::{Path, PathBuf};

/// Port the headless Plexamp player listens on for control requests.
pub const PLAYER_CONTROL_PORT: u16 = 32500;

/// Subdirectory (under the config home) that holds every persisted file.
pub const APP_DIR_NAME: &str = "plexamp-tui";

pub const CONFIG_FILE: &str = "config.json";
pub const FAVORITES_DB_FILE: &str = "favorites.db";
pub const FAVORITES_JSON_FILE: &str = "favorites.json";
pub const AUTH_FILE: &str = "plex_auth.json";
pub const LOG_FILE: &str = "plexamp-tui.log";

/// Root directory for all persisted files.
///
/// `$XDG_CONFIG_HOME/plexamp-tui` when the variable is set and non-empty,
/// otherwise the platform's per-user config directory.
pub fn config_dir() -> PathBuf {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from))
}

fn config_dir_from(xdg_home: Option<PathBuf>) -> PathBuf {
    if let Some(base) = xdg_home.filter(|p| !p.as_os_str().is_empty()) {
        return base.join(APP_DIR_NAME);
    }

    // On macOS and Linux, always use ~/.config/ for consistency with the
    // XDG layout instead of ~/Library/Application Support.
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR_NAME)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Sibling files live next to the settings file, so `--config` relocates
/// favorites, credentials and the log too.
pub fn sibling_of(config_path: &Path, name: &str) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
