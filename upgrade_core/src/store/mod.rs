//! Kill record persistence
//!
//! The store remembers, per (player, boss), the highest threshold level the
//! player has unlocked. The upgrade logic only ever asks for the maximum
//! over all of a player's bosses.

mod memory;
mod sqlite;

pub use memory::InMemoryKillStore;
pub use sqlite::SqliteKillStore;

use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kill record persistence error
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Value out of range for storage: {0}")]
    OutOfRange(String),
    #[error("Corrupt kill record: {0}")]
    Corrupt(String),
    #[error("Kill record store unavailable: {0}")]
    Unavailable(String),
}

/// One row of kill history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRecord {
    pub player: PlayerId,
    /// Boss creature entry
    pub source: u32,
    pub threshold_level: u32,
    pub last_kill_at: DateTime<Utc>,
}

/// Persistence for boss kill thresholds
pub trait KillRecordStore {
    /// Highest threshold across every boss the player has killed
    ///
    /// `Ok(None)` when the player has no recorded kills.
    fn max_threshold(&self, player: PlayerId) -> Result<Option<u32>, StoreError>;

    /// Stored threshold for one (player, boss) pair
    fn threshold(&self, player: PlayerId, source: u32) -> Result<Option<u32>, StoreError>;

    /// Upsert a kill: the stored threshold becomes `max(stored, threshold_level)`
    /// and the kill timestamp is refreshed
    fn record_kill(
        &mut self,
        player: PlayerId,
        source: u32,
        threshold_level: u32,
    ) -> Result<(), StoreError>;

    /// All kill rows for a player, ordered by boss entry
    fn records(&self, player: PlayerId) -> Result<Vec<KillRecord>, StoreError>;
}

impl<S: KillRecordStore + ?Sized> KillRecordStore for Box<S> {
    fn max_threshold(&self, player: PlayerId) -> Result<Option<u32>, StoreError> {
        (**self).max_threshold(player)
    }

    fn threshold(&self, player: PlayerId, source: u32) -> Result<Option<u32>, StoreError> {
        (**self).threshold(player, source)
    }

    fn record_kill(
        &mut self,
        player: PlayerId,
        source: u32,
        threshold_level: u32,
    ) -> Result<(), StoreError> {
        (**self).record_kill(player, source, threshold_level)
    }

    fn records(&self, player: PlayerId) -> Result<Vec<KillRecord>, StoreError> {
        (**self).records(player)
    }
}
