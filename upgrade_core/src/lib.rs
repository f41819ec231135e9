//! upgrade_core - Boss-kill driven stat upgrades for equipped epic items
//!
//! This library provides:
//! - StatFormula: exponential bonus from the threshold/item level gap
//! - BonusLedger: per-player, per-slot record of granted bonuses
//! - KillRecordStore: highest threshold unlocked per (player, boss)
//! - Coordinator: reacts to login/equip/unequip/logout/boss-kill events

pub mod config;
pub mod coordinator;
pub mod formula;
pub mod host;
pub mod ledger;
pub mod prelude;
pub mod store;
pub mod types;

// Re-export core types for convenience
pub use config::{BossConfig, ConfigError, UpgradeSettings, DEFAULT_BOSS_ENTRIES};
pub use coordinator::{kill_notice, BossKill, Coordinator, EventKind, HostEvent};
pub use formula::{compute_delta, StatFormula, DEFAULT_STAT_MULTIPLIER};
pub use host::{EquipmentLookup, HostServices, ModifierOp, Notifier, StatModifiers};
pub use ledger::{ApplyOutcome, BonusLedger, ItemStatBonus, SlotState};
pub use store::{InMemoryKillStore, KillRecord, KillRecordStore, SqliteKillStore, StoreError};
pub use types::{
    resolve_acting_player, Combatant, CreatureInfo, EquipmentSlot, ItemQuality, ItemStat,
    ItemStatType, ItemTemplate, PlayerId, StatKind,
};
