//! Leaf capabilities for the Plexamp terminal client: settings, favorites,
//! credentials, the library/identity API, the local player API and playback
//! URL construction.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod platform;
pub mod playback_url;
pub mod player;
pub mod protocol;
pub mod wire;

pub use error::{PlexError, Result};
