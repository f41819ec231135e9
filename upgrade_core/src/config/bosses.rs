//! Boss → threshold level table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Creature entries shipped in the default config
/// (Ragnaros, Onyxia, Nefarian, C'Thun, Kel'Thuzad)
pub const DEFAULT_BOSS_ENTRIES: [u32; 5] = [11502, 10184, 11583, 15727, 15990];

/// Threshold level unlocked by each configured boss
///
/// Only bosses with a non-zero threshold are present. The table is never
/// edited in place; a reload builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BossConfig {
    thresholds: BTreeMap<u32, u32>,
}

impl BossConfig {
    /// Create an empty table (no boss upgrades anything)
    pub fn new() -> Self {
        BossConfig {
            thresholds: BTreeMap::new(),
        }
    }

    /// Build from (entry, threshold) pairs, dropping zero thresholds
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let thresholds = entries
            .into_iter()
            .filter(|&(_, threshold)| threshold > 0)
            .collect();
        BossConfig { thresholds }
    }

    /// Threshold for a creature entry, if it is a configured boss
    pub fn threshold_for(&self, entry: u32) -> Option<u32> {
        self.thresholds.get(&entry).copied()
    }

    pub fn contains(&self, entry: u32) -> bool {
        self.thresholds.contains_key(&entry)
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Iterate (entry, threshold) in entry order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.thresholds.iter().map(|(&entry, &threshold)| (entry, threshold))
    }
}
