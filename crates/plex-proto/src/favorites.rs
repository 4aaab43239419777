//! Favorites persisted in SQLite, unique by `(type, metadata_key)`.

use rusqlite::{params, Connection};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::protocol::{FavoriteItem, FavoriteKind};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS favorites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    metadata_key TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(type, metadata_key)
)";

pub trait FavoritesStore: Send {
    /// Newest first.
    fn list(&self) -> Result<Vec<FavoriteItem>>;
    /// Insert, or rename the existing `(kind, key)` entry.
    fn upsert(&mut self, item: &FavoriteItem) -> Result<()>;
    fn remove(&mut self, kind: FavoriteKind, key: &str) -> Result<()>;
    /// Swap the entry at `(old_kind, old_key)` for `item`.
    fn replace(&mut self, old_kind: FavoriteKind, old_key: &str, item: &FavoriteItem)
        -> Result<()>;
}

pub struct SqliteFavorites {
    conn: Connection,
}

impl SqliteFavorites {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM favorites", [], |row| row.get(0))?)
    }

    /// One-shot import of a legacy `{"items":[...]}` file. Does nothing when
    /// the table already has rows or the file is missing. Returns the number
    /// of rows imported.
    pub fn import_json(&mut self, path: &Path) -> Result<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let legacy: LegacyFavorites = serde_json::from_str(&data)?;

        let tx = self.conn.transaction()?;
        let mut imported = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO favorites (name, type, metadata_key) VALUES (?1, ?2, ?3)
                 ON CONFLICT(type, metadata_key) DO UPDATE SET name = excluded.name",
            )?;
            for item in legacy.items {
                let Some(kind) = FavoriteKind::parse(&item.kind) else {
                    warn!("skipping legacy favorite {:?} with type {:?}", item.name, item.kind);
                    continue;
                };
                stmt.execute(params![item.name, kind.as_str(), item.key])?;
                imported += 1;
            }
        }
        tx.commit()?;
        info!("imported {imported} favorites from {}", path.display());
        Ok(imported)
    }
}

#[derive(Deserialize)]
struct LegacyFavorites {
    #[serde(default)]
    items: Vec<LegacyItem>,
}

#[derive(Deserialize)]
struct LegacyItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    key: String,
}

impl FavoritesStore for SqliteFavorites {
    fn list(&self) -> Result<Vec<FavoriteItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, metadata_key FROM favorites ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (name, kind, key) = row?;
            match FavoriteKind::parse(&kind) {
                Some(kind) => items.push(FavoriteItem { name, kind, key }),
                None => debug!("ignoring favorite {name:?} with unknown type {kind:?}"),
            }
        }
        Ok(items)
    }

    fn upsert(&mut self, item: &FavoriteItem) -> Result<()> {
        self.conn.execute(
            "INSERT INTO favorites (name, type, metadata_key) VALUES (?1, ?2, ?3)
             ON CONFLICT(type, metadata_key) DO UPDATE SET name = excluded.name",
            params![item.name, item.kind.as_str(), item.key],
        )?;
        Ok(())
    }

    fn remove(&mut self, kind: FavoriteKind, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM favorites WHERE type = ?1 AND metadata_key = ?2",
            params![kind.as_str(), key],
        )?;
        Ok(())
    }

    fn replace(
        &mut self,
        old_kind: FavoriteKind,
        old_key: &str,
        item: &FavoriteItem,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE OR REPLACE favorites SET name = ?1, type = ?2, metadata_key = ?3
             WHERE type = ?4 AND metadata_key = ?5",
            params![item.name, item.kind.as_str(), item.key, old_kind.as_str(), old_key],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO favorites (name, type, metadata_key) VALUES (?1, ?2, ?3)
                 ON CONFLICT(type, metadata_key) DO UPDATE SET name = excluded.name",
                params![item.name, item.kind.as_str(), item.key],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
