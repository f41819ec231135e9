//! SQLite-backed kill store

use super::{KillRecord, KillRecordStore, StoreError};
use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_KILLS_V1: &str = r"
CREATE TABLE IF NOT EXISTS selfcraft_upgrade_kills (
  guid INTEGER NOT NULL,
  boss_entry INTEGER NOT NULL,
  max_ilevel INTEGER NOT NULL CHECK (max_ilevel >= 0),
  kill_time TEXT NOT NULL,
  PRIMARY KEY (guid, boss_entry)
);
";

/// Kill store persisted in the `selfcraft_upgrade_kills` table
pub struct SqliteKillStore {
    conn: Connection,
}

impl SqliteKillStore {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Self::from_connection(conn)
    }

    /// Fresh in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection and ensure the schema exists
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = SqliteKillStore { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA_KILLS_V1)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn guid(player: PlayerId) -> Result<i64, StoreError> {
    i64::try_from(player.0).map_err(|_| StoreError::OutOfRange(format!("player guid {player}")))
}

fn level_from_sql(value: i64) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("max_ilevel {value}")))
}

impl KillRecordStore for SqliteKillStore {
    fn max_threshold(&self, player: PlayerId) -> Result<Option<u32>, StoreError> {
        let value = self.conn.query_row(
            "SELECT MAX(max_ilevel) FROM selfcraft_upgrade_kills WHERE guid = ?1",
            params![guid(player)?],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        value.map(level_from_sql).transpose()
    }

    fn threshold(&self, player: PlayerId, source: u32) -> Result<Option<u32>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT max_ilevel FROM selfcraft_upgrade_kills WHERE guid = ?1 AND boss_entry = ?2",
                params![guid(player)?, i64::from(source)],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        value.map(level_from_sql).transpose()
    }

    fn record_kill(
        &mut self,
        player: PlayerId,
        source: u32,
        threshold_level: u32,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO selfcraft_upgrade_kills (guid, boss_entry, max_ilevel, kill_time)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(guid, boss_entry) DO UPDATE SET
               max_ilevel = MAX(max_ilevel, excluded.max_ilevel),
               kill_time = excluded.kill_time",
            params![guid(player)?, i64::from(source), i64::from(threshold_level), now],
        )?;
        Ok(())
    }

    fn records(&self, player: PlayerId) -> Result<Vec<KillRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT boss_entry, max_ilevel, kill_time
             FROM selfcraft_upgrade_kills
             WHERE guid = ?1
             ORDER BY boss_entry",
        )?;
        let rows = stmt.query_map(params![guid(player)?], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (source, level, kill_time) = row?;
            let source = u32::try_from(source)
                .map_err(|_| StoreError::Corrupt(format!("boss_entry {source}")))?;
            let last_kill_at = DateTime::parse_from_rfc3339(&kill_time)
                .map_err(|err| StoreError::Corrupt(format!("kill_time `{kill_time}`: {err}")))?
                .with_timezone(&Utc);
            records.push(KillRecord {
                player,
                source,
                threshold_level: level_from_sql(level)?,
                last_kill_at,
            });
        }
        Ok(records)
    }
}
