//! Core types shared by the ledger, store and coordinator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Character identity as the host knows it (low GUID counter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        PlayerId(id)
    }
}

/// Equipment slot on the character sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Shoulders,
    Body,
    Chest,
    Waist,
    Legs,
    Feet,
    Wrists,
    Hands,
    Finger1,
    Finger2,
    Trinket1,
    Trinket2,
    Back,
    MainHand,
    OffHand,
    Ranged,
    Tabard,
}

impl EquipmentSlot {
    /// Get all equipment slots, in host slot order
    pub fn all() -> &'static [EquipmentSlot] {
        &[
            EquipmentSlot::Head,
            EquipmentSlot::Neck,
            EquipmentSlot::Shoulders,
            EquipmentSlot::Body,
            EquipmentSlot::Chest,
            EquipmentSlot::Waist,
            EquipmentSlot::Legs,
            EquipmentSlot::Feet,
            EquipmentSlot::Wrists,
            EquipmentSlot::Hands,
            EquipmentSlot::Finger1,
            EquipmentSlot::Finger2,
            EquipmentSlot::Trinket1,
            EquipmentSlot::Trinket2,
            EquipmentSlot::Back,
            EquipmentSlot::MainHand,
            EquipmentSlot::OffHand,
            EquipmentSlot::Ranged,
            EquipmentSlot::Tabard,
        ]
    }

    /// Host slot index (0-based)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a slot by host index
    pub fn from_index(index: u8) -> Option<EquipmentSlot> {
        Self::all().get(index as usize).copied()
    }
}

/// Item rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    Poor,
    Normal,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
    Heirloom,
}

impl ItemQuality {
    /// Only epic items take part in upgrades
    pub fn is_upgradable(self) -> bool {
        self == ItemQuality::Epic
    }
}

/// Character attribute that can receive a bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Agility,
    Strength,
    Intellect,
    Spirit,
    Stamina,
}

impl StatKind {
    pub fn all() -> &'static [StatKind] {
        &[
            StatKind::Agility,
            StatKind::Strength,
            StatKind::Intellect,
            StatKind::Spirit,
            StatKind::Stamina,
        ]
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Agility => "agility",
            StatKind::Strength => "strength",
            StatKind::Intellect => "intellect",
            StatKind::Spirit => "spirit",
            StatKind::Stamina => "stamina",
        };
        f.write_str(name)
    }
}

/// Stat type as it appears on an item template
///
/// Items carry more than the five attributes (ratings, spell power, ...).
/// Those are kept as `Other` with the host's raw type code and never upgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatType {
    Agility,
    Strength,
    Intellect,
    Spirit,
    Stamina,
    Other(u32),
}

impl ItemStatType {
    /// The attribute this stat maps to, if it is eligible for a bonus
    pub fn stat_kind(self) -> Option<StatKind> {
        match self {
            ItemStatType::Agility => Some(StatKind::Agility),
            ItemStatType::Strength => Some(StatKind::Strength),
            ItemStatType::Intellect => Some(StatKind::Intellect),
            ItemStatType::Spirit => Some(StatKind::Spirit),
            ItemStatType::Stamina => Some(StatKind::Stamina),
            ItemStatType::Other(_) => None,
        }
    }
}

impl From<StatKind> for ItemStatType {
    fn from(kind: StatKind) -> Self {
        match kind {
            StatKind::Agility => ItemStatType::Agility,
            StatKind::Strength => ItemStatType::Strength,
            StatKind::Intellect => ItemStatType::Intellect,
            StatKind::Spirit => ItemStatType::Spirit,
            StatKind::Stamina => ItemStatType::Stamina,
        }
    }
}

/// One stat line on an item template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStat {
    pub stat_type: ItemStatType,
    pub value: i32,
}

impl ItemStat {
    pub fn new(stat_type: impl Into<ItemStatType>, value: i32) -> Self {
        ItemStat {
            stat_type: stat_type.into(),
            value,
        }
    }
}

/// Read-only view of an item template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Template entry id
    pub entry: u32,
    /// Display name
    pub name: String,
    pub quality: ItemQuality,
    pub item_level: u32,
    #[serde(default)]
    pub stats: Vec<ItemStat>,
}

impl ItemTemplate {
    /// Create a template with no stat lines
    pub fn new(entry: u32, name: impl Into<String>, quality: ItemQuality, item_level: u32) -> Self {
        ItemTemplate {
            entry,
            name: name.into(),
            quality,
            item_level,
            stats: Vec::new(),
        }
    }

    /// Add a stat line
    pub fn with_stat(mut self, stat_type: impl Into<ItemStatType>, value: i32) -> Self {
        self.stats.push(ItemStat::new(stat_type, value));
        self
    }
}

/// A creature that died, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureInfo {
    /// Creature template entry, matched against configured bosses
    pub entry: u32,
    pub name: String,
}

impl CreatureInfo {
    pub fn new(entry: u32, name: impl Into<String>) -> Self {
        CreatureInfo {
            entry,
            name: name.into(),
        }
    }
}

/// The unit credited with a kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Combatant {
    /// A player landed the killing blow
    Player { id: PlayerId },
    /// A pet, guardian or charmed unit; `owner` is its controlling player, if any
    Controlled { owner: Option<PlayerId> },
    /// A creature with no player behind it
    Creature,
}

/// Resolve the player that should be credited for a combatant's kill
pub fn resolve_acting_player(combatant: &Combatant) -> Option<PlayerId> {
    match *combatant {
        Combatant::Player { id } => Some(id),
        Combatant::Controlled { owner } => owner,
        Combatant::Creature => None,
    }
}
