//! BonusLedger - Which bonuses are currently granted, per player and slot
//!
//! Every delta pushed to the host is recorded here first, so removal can
//! hand back exactly what was given.

mod bonus;

pub use bonus::ItemStatBonus;

use crate::formula::StatFormula;
use crate::host::{ModifierOp, StatModifiers};
use crate::types::{EquipmentSlot, ItemTemplate, PlayerId, StatKind};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Bonus lifecycle of one (player, slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unbonused,
    Bonused,
}

/// Result of an apply attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The module is switched off
    Disabled,
    /// Item quality is not eligible
    NotEpic,
    /// Player has no recorded kill
    NoThreshold,
    /// Item level is at or above the unlocked threshold
    AtOrAboveThreshold,
    /// Stats were processed but no delta came out positive
    NoPositiveDelta,
    /// This many stat modifiers were applied
    Applied(usize),
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, ApplyOutcome::Applied(_))
    }
}

/// Granted bonuses keyed by player, then slot
#[derive(Debug, Clone, Default)]
pub struct BonusLedger {
    players: HashMap<PlayerId, HashMap<EquipmentSlot, ItemStatBonus>>,
}

impl BonusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant bonuses for `item` in `slot` under the given unlocked threshold
    ///
    /// Nothing is touched unless the item is epic, a threshold exists, and it
    /// exceeds the item level. If the slot already carries a bonus it is
    /// reverted before the new one lands, so deltas never stack. The host is
    /// asked to recompute once after the stats have been processed.
    pub fn apply_bonuses<H>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        slot: EquipmentSlot,
        item: &ItemTemplate,
        threshold_level: Option<u32>,
        formula: &StatFormula,
    ) -> ApplyOutcome
    where
        H: StatModifiers + ?Sized,
    {
        if !item.quality.is_upgradable() {
            trace!(%player, ?slot, item = item.entry, "item not epic");
            return ApplyOutcome::NotEpic;
        }
        let Some(threshold_level) = threshold_level else {
            debug!(%player, ?slot, "no boss kills recorded");
            return ApplyOutcome::NoThreshold;
        };
        if threshold_level <= item.item_level {
            debug!(
                %player,
                ?slot,
                item_level = item.item_level,
                threshold_level,
                "item already at unlocked threshold"
            );
            return ApplyOutcome::AtOrAboveThreshold;
        }

        let bonus = ItemStatBonus::for_item(item, threshold_level, formula);
        if bonus.is_empty() {
            host.update_all_stats(player);
            return ApplyOutcome::NoPositiveDelta;
        }

        let slots = self.players.entry(player).or_default();
        if let Some(previous) = slots.remove(&slot) {
            for (stat, delta) in previous.iter() {
                host.modify_stat(player, stat, delta, ModifierOp::Remove);
            }
        }
        for (stat, delta) in bonus.iter() {
            host.modify_stat(player, stat, delta, ModifierOp::Apply);
        }
        let applied = bonus.len();
        debug!(%player, ?slot, item = item.entry, applied, threshold_level, "bonuses applied");
        slots.insert(slot, bonus);
        host.update_all_stats(player);

        ApplyOutcome::Applied(applied)
    }

    /// Take back every bonus recorded for `slot`
    ///
    /// Returns false (and does nothing) if the slot had no bonus.
    pub fn remove_bonuses<H>(&mut self, host: &mut H, player: PlayerId, slot: EquipmentSlot) -> bool
    where
        H: StatModifiers + ?Sized,
    {
        let Some(slots) = self.players.get_mut(&player) else {
            return false;
        };
        let Some(bonus) = slots.remove(&slot) else {
            return false;
        };
        if slots.is_empty() {
            self.players.remove(&player);
        }

        for (stat, delta) in bonus.iter() {
            host.modify_stat(player, stat, delta, ModifierOp::Remove);
        }
        debug!(%player, ?slot, removed = bonus.len(), "bonuses removed");
        host.update_all_stats(player);
        true
    }

    /// Forget everything recorded for a player without touching the host
    ///
    /// Returns how many slots were dropped.
    pub fn clear_player(&mut self, player: PlayerId) -> usize {
        self.players.remove(&player).map_or(0, |slots| slots.len())
    }

    pub fn bonus(&self, player: PlayerId, slot: EquipmentSlot) -> Option<&ItemStatBonus> {
        self.players.get(&player).and_then(|slots| slots.get(&slot))
    }

    pub fn slot_state(&self, player: PlayerId, slot: EquipmentSlot) -> SlotState {
        if self.bonus(player, slot).is_some() {
            SlotState::Bonused
        } else {
            SlotState::Unbonused
        }
    }

    /// Bonused slots of a player, in slot order
    pub fn bonused_slots(&self, player: PlayerId) -> Vec<EquipmentSlot> {
        let mut slots: Vec<EquipmentSlot> = self
            .players
            .get(&player)
            .map(|slots| slots.keys().copied().collect())
            .unwrap_or_default();
        slots.sort();
        slots
    }

    /// Total bonus currently granted to a player for one stat
    pub fn total_for(&self, player: PlayerId, stat: StatKind) -> i64 {
        self.players
            .get(&player)
            .map(|slots| {
                slots
                    .values()
                    .filter_map(|bonus| bonus.get(stat))
                    .map(i64::from)
                    .sum()
            })
            .unwrap_or(0)
    }

    pub fn is_tracking(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    /// Number of players with at least one bonused slot
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
