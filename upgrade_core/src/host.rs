//! Ports into the host server
//!
//! The host owns players, items and the real stat model. The upgrade logic
//! reaches it only through these traits.

use crate::types::{EquipmentSlot, ItemTemplate, PlayerId, StatKind};

/// Whether a modifier is being added or taken back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierOp {
    Apply,
    Remove,
}

impl ModifierOp {
    /// Signed contribution of `amount` under this op
    pub fn signed(self, amount: i32) -> i64 {
        match self {
            ModifierOp::Apply => i64::from(amount),
            ModifierOp::Remove => -i64::from(amount),
        }
    }
}

/// Read access to what a player is wearing
pub trait EquipmentLookup {
    /// Template of the item in `slot`, or `None` for an empty slot
    fn equipped_item(&self, player: PlayerId, slot: EquipmentSlot) -> Option<ItemTemplate>;
}

/// Additive ("total value") stat modifiers on the player
pub trait StatModifiers {
    fn modify_stat(&mut self, player: PlayerId, stat: StatKind, amount: i32, op: ModifierOp);

    /// Recompute the player's derived totals after a batch of modifier changes
    fn update_all_stats(&mut self, player: PlayerId);
}

/// System text sent to a player's session
pub trait Notifier {
    fn send_notice(&mut self, player: PlayerId, text: &str);
}

/// Everything the coordinator needs from the host
pub trait HostServices: EquipmentLookup + StatModifiers + Notifier {}

impl<T: EquipmentLookup + StatModifiers + Notifier> HostServices for T {}
