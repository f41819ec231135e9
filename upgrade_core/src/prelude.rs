//! Prelude module for convenient imports
//!
//! ```rust
//! use upgrade_core::prelude::*;
//! ```

// Core types
pub use crate::types::{Combatant, CreatureInfo, EquipmentSlot, ItemQuality, ItemTemplate, PlayerId, StatKind};

// Engine
pub use crate::coordinator::{Coordinator, HostEvent};
pub use crate::formula::StatFormula;
pub use crate::ledger::{ApplyOutcome, BonusLedger, ItemStatBonus};

// Ports
pub use crate::host::{EquipmentLookup, HostServices, ModifierOp, Notifier, StatModifiers};
pub use crate::store::{InMemoryKillStore, KillRecordStore};

// Config
pub use crate::config::UpgradeSettings;
