//! Scenario files: an item catalogue plus a list of host events to replay

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use upgrade_core::{Combatant, EquipmentSlot, ItemTemplate, PlayerId};

/// A scripted session
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Items referenced by key from `equip` steps
    #[serde(default)]
    pub items: BTreeMap<String, ItemTemplate>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One host event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Login {
        player: PlayerId,
    },
    Logout {
        player: PlayerId,
    },
    Equip {
        player: PlayerId,
        slot: EquipmentSlot,
        item: String,
    },
    Unequip {
        player: PlayerId,
        slot: EquipmentSlot,
    },
    Kill {
        boss: u32,
        name: String,
        killer: Combatant,
    },
    /// Re-read settings; `config` defaults to the file given on the command line
    Reload {
        #[serde(default)]
        config: Option<PathBuf>,
    },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.check_items()?;
        Ok(scenario)
    }

    /// Every `equip` step must name a catalogue item
    fn check_items(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Equip { item, .. } = step {
                if !self.items.contains_key(item) {
                    anyhow::bail!("step {}: unknown item `{}`", index + 1, item);
                }
            }
        }
        Ok(())
    }
}
