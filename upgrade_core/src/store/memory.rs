//! In-process kill store

use super::{KillRecord, KillRecordStore, StoreError};
use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct KillEntry {
    threshold_level: u32,
    last_kill_at: DateTime<Utc>,
}

/// Kill store backed by an ordered map
///
/// Nothing survives the process; intended for tests and the simulator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKillStore {
    kills: BTreeMap<(PlayerId, u32), KillEntry>,
}

impl InMemoryKillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (player, boss) rows
    pub fn len(&self) -> usize {
        self.kills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kills.is_empty()
    }
}

impl KillRecordStore for InMemoryKillStore {
    fn max_threshold(&self, player: PlayerId) -> Result<Option<u32>, StoreError> {
        Ok(self
            .kills
            .range((player, u32::MIN)..=(player, u32::MAX))
            .map(|(_, entry)| entry.threshold_level)
            .max())
    }

    fn threshold(&self, player: PlayerId, source: u32) -> Result<Option<u32>, StoreError> {
        Ok(self
            .kills
            .get(&(player, source))
            .map(|entry| entry.threshold_level))
    }

    fn record_kill(
        &mut self,
        player: PlayerId,
        source: u32,
        threshold_level: u32,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        self.kills
            .entry((player, source))
            .and_modify(|entry| {
                entry.threshold_level = entry.threshold_level.max(threshold_level);
                entry.last_kill_at = now;
            })
            .or_insert(KillEntry {
                threshold_level,
                last_kill_at: now,
            });
        Ok(())
    }

    fn records(&self, player: PlayerId) -> Result<Vec<KillRecord>, StoreError> {
        Ok(self
            .kills
            .range((player, u32::MIN)..=(player, u32::MAX))
            .map(|(&(player, source), entry)| KillRecord {
                player,
                source,
                threshold_level: entry.threshold_level,
                last_kill_at: entry.last_kill_at,
            })
            .collect())
    }
}
