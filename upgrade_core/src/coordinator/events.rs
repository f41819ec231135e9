//! Host events the coordinator reacts to

use crate::config::UpgradeSettings;
use crate::types::{Combatant, CreatureInfo, EquipmentSlot, ItemTemplate, PlayerId};

/// Names of the host hooks the coordinator needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Login,
    Logout,
    Equip,
    Unequip,
    CreatureDied,
    ConfigReloaded,
}

impl EventKind {
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Login,
            EventKind::Logout,
            EventKind::Equip,
            EventKind::Unequip,
            EventKind::CreatureDied,
            EventKind::ConfigReloaded,
        ]
    }
}

/// Event payload forwarded by the host
#[derive(Debug, Clone)]
pub enum HostEvent {
    Login {
        player: PlayerId,
    },
    Logout {
        player: PlayerId,
    },
    /// `item` is now in `slot`; whatever was there before is gone
    Equip {
        player: PlayerId,
        slot: EquipmentSlot,
        item: ItemTemplate,
    },
    Unequip {
        player: PlayerId,
        slot: EquipmentSlot,
    },
    CreatureDied {
        creature: CreatureInfo,
        killer: Combatant,
    },
    /// Settings were reloaded; replaces the previous settings wholesale
    ConfigReloaded(UpgradeSettings),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Login { .. } => EventKind::Login,
            HostEvent::Logout { .. } => EventKind::Logout,
            HostEvent::Equip { .. } => EventKind::Equip,
            HostEvent::Unequip { .. } => EventKind::Unequip,
            HostEvent::CreatureDied { .. } => EventKind::CreatureDied,
            HostEvent::ConfigReloaded(_) => EventKind::ConfigReloaded,
        }
    }
}
