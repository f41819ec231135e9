//! ItemStatBonus - Per-slot bonus deltas

use crate::formula::StatFormula;
use crate::types::{ItemTemplate, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bonus deltas granted for the item in one equipment slot
///
/// Holds only strictly positive deltas. Two stat lines of the same kind on
/// one item fold into a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStatBonus {
    deltas: BTreeMap<StatKind, i32>,
}

impl ItemStatBonus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the bonus an item earns under an unlocked threshold
    ///
    /// Quality is not checked here; see [`crate::ledger::BonusLedger::apply_bonuses`].
    pub fn for_item(item: &ItemTemplate, threshold_level: u32, formula: &StatFormula) -> Self {
        let mut bonus = ItemStatBonus::new();
        if item.item_level >= threshold_level {
            return bonus;
        }

        for stat in &item.stats {
            let Some(kind) = stat.stat_type.stat_kind() else {
                continue;
            };
            if stat.value <= 0 {
                continue;
            }
            let delta = formula.compute_delta(stat.value, threshold_level, item.item_level);
            bonus.add(kind, delta);
        }
        bonus
    }

    /// Add a delta; non-positive deltas are ignored
    pub fn add(&mut self, kind: StatKind, delta: i32) {
        if delta <= 0 {
            return;
        }
        let entry = self.deltas.entry(kind).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    pub fn get(&self, kind: StatKind) -> Option<i32> {
        self.deltas.get(&kind).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate (stat, delta) in stat order
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i32)> + '_ {
        self.deltas.iter().map(|(&kind, &delta)| (kind, delta))
    }

    /// Sum of all deltas
    pub fn total(&self) -> i64 {
        self.deltas.values().map(|&d| i64::from(d)).sum()
    }
}
