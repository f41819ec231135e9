//! A minimal stand-in for the game server

use serde::Serialize;
use std::collections::BTreeMap;
use upgrade_core::{
    BonusLedger, EquipmentLookup, EquipmentSlot, ItemStatBonus, ItemTemplate, ModifierOp,
    Notifier, PlayerId, StatKind, StatModifiers,
};

/// Per-character state the host owns
#[derive(Debug, Clone, Default)]
pub struct SimPlayer {
    pub online: bool,
    pub equipment: BTreeMap<EquipmentSlot, ItemTemplate>,
    /// Sum of additive modifiers currently applied
    pub modifiers: BTreeMap<StatKind, i64>,
    /// Totals as of the last recompute
    pub totals: BTreeMap<StatKind, i64>,
    pub recomputes: usize,
    pub notices: Vec<String>,
}

impl SimPlayer {
    /// Base attribute sum across equipped items
    fn item_stats(&self) -> BTreeMap<StatKind, i64> {
        let mut stats = BTreeMap::new();
        for item in self.equipment.values() {
            for stat in &item.stats {
                if let Some(kind) = stat.stat_type.stat_kind() {
                    *stats.entry(kind).or_insert(0) += i64::from(stat.value);
                }
            }
        }
        stats
    }

    fn recompute(&mut self) {
        let mut totals = self.item_stats();
        for (&kind, &amount) in &self.modifiers {
            *totals.entry(kind).or_insert(0) += amount;
        }
        self.totals = totals;
        self.recomputes += 1;
    }
}

/// Host holding every simulated character
#[derive(Debug, Default)]
pub struct SimHost {
    players: BTreeMap<PlayerId, SimPlayer>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, id: PlayerId) -> Option<&SimPlayer> {
        self.players.get(&id)
    }

    pub fn login(&mut self, id: PlayerId) {
        let player = self.players.entry(id).or_default();
        player.online = true;
        player.recompute();
    }

    /// The session's stat state is torn down; equipment stays on the character
    pub fn logout(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.online = false;
            player.modifiers.clear();
            player.recompute();
        }
    }

    pub fn equip(&mut self, id: PlayerId, slot: EquipmentSlot, item: ItemTemplate) {
        self.players.entry(id).or_default().equipment.insert(slot, item);
    }

    pub fn unequip(&mut self, id: PlayerId, slot: EquipmentSlot) -> Option<ItemTemplate> {
        self.players.get_mut(&id)?.equipment.remove(&slot)
    }

    /// Snapshot for printing, with the per-slot bonuses the ledger tracks
    pub fn report(&self, ledger: &BonusLedger) -> Vec<PlayerReport> {
        self.players
            .iter()
            .map(|(&id, player)| PlayerReport {
                player: id,
                online: player.online,
                equipment: player
                    .equipment
                    .iter()
                    .map(|(&slot, item)| (slot, item.name.clone()))
                    .collect(),
                item_stats: player.item_stats(),
                bonus: player.modifiers.clone(),
                slot_bonuses: ledger
                    .bonused_slots(id)
                    .into_iter()
                    .filter_map(|slot| ledger.bonus(id, slot).map(|bonus| (slot, bonus.clone())))
                    .collect(),
                totals: player.totals.clone(),
                recomputes: player.recomputes,
                notices: player.notices.clone(),
            })
            .collect()
    }
}

impl EquipmentLookup for SimHost {
    fn equipped_item(&self, player: PlayerId, slot: EquipmentSlot) -> Option<ItemTemplate> {
        self.players.get(&player)?.equipment.get(&slot).cloned()
    }
}

impl StatModifiers for SimHost {
    fn modify_stat(&mut self, player: PlayerId, stat: StatKind, amount: i32, op: ModifierOp) {
        let player = self.players.entry(player).or_default();
        let total = player.modifiers.entry(stat).or_insert(0);
        *total += op.signed(amount);
        if *total == 0 {
            player.modifiers.remove(&stat);
        }
    }

    fn update_all_stats(&mut self, player: PlayerId) {
        self.players.entry(player).or_default().recompute();
    }
}

impl Notifier for SimHost {
    fn send_notice(&mut self, player: PlayerId, text: &str) {
        self.players
            .entry(player)
            .or_default()
            .notices
            .push(text.to_string());
    }
}

/// Final per-player state
#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player: PlayerId,
    pub online: bool,
    pub equipment: BTreeMap<EquipmentSlot, String>,
    pub item_stats: BTreeMap<StatKind, i64>,
    pub bonus: BTreeMap<StatKind, i64>,
    pub slot_bonuses: BTreeMap<EquipmentSlot, ItemStatBonus>,
    pub totals: BTreeMap<StatKind, i64>,
    pub recomputes: usize,
    pub notices: Vec<String>,
}
