//! Coordinator - Drives the ledger from host events
//!
//! Per (player, slot) the lifecycle is `Unbonused` ⇄ `Bonused`:
//! - login clears the player and applies every occupied slot
//! - equip removes the slot's bonus, then applies for the new item
//! - unequip removes the slot's bonus
//! - logout forgets the player without touching the host
//! - a configured boss kill raises the stored threshold, then refreshes every
//!   equipped epic item
//!
//! Nothing here returns an error to the host. Missing data is a no-op and
//! store failures are logged and treated as "no kill record".

mod events;

pub use events::{EventKind, HostEvent};

use crate::config::UpgradeSettings;
use crate::host::{HostServices, StatModifiers};
use crate::ledger::{ApplyOutcome, BonusLedger};
use crate::store::KillRecordStore;
use crate::types::{
    resolve_acting_player, Combatant, CreatureInfo, EquipmentSlot, ItemTemplate, PlayerId,
};
use tracing::{debug, info, trace, warn};

/// What a recognised boss kill did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossKill {
    pub player: PlayerId,
    pub boss: u32,
    /// Threshold configured for this boss
    pub threshold_level: u32,
    /// Highest threshold across all of the player's kills after recording
    pub unlocked_level: Option<u32>,
    /// Equipped epic slots that were refreshed
    pub refreshed_slots: usize,
    pub announced: bool,
}

/// Owns the ledger, the settings and the kill store for one serialized
/// game-logic context
pub struct Coordinator<S> {
    settings: UpgradeSettings,
    ledger: BonusLedger,
    store: S,
}

impl<S: KillRecordStore> Coordinator<S> {
    pub fn new(settings: UpgradeSettings, store: S) -> Self {
        Coordinator {
            settings,
            ledger: BonusLedger::new(),
            store,
        }
    }

    /// Hooks the host has to forward to [`Coordinator::handle`]
    pub fn subscriptions() -> &'static [EventKind] {
        EventKind::all()
    }

    pub fn settings(&self) -> &UpgradeSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &BonusLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Dispatch one host event
    pub fn handle<H>(&mut self, host: &mut H, event: HostEvent)
    where
        H: HostServices + ?Sized,
    {
        trace!(kind = ?event.kind(), "host event");
        match event {
            HostEvent::Login { player } => self.on_login(host, player),
            HostEvent::Logout { player } => self.on_logout(player),
            HostEvent::Equip { player, slot, item } => {
                self.on_equip(host, player, slot, &item);
            }
            HostEvent::Unequip { player, slot } => {
                self.on_unequip(host, player, slot);
            }
            HostEvent::CreatureDied { creature, killer } => {
                self.on_creature_died(host, &creature, &killer);
            }
            HostEvent::ConfigReloaded(settings) => self.reload(settings),
        }
    }

    /// Swap in freshly loaded settings
    ///
    /// Bonuses already granted keep their old deltas until the slot is next
    /// refreshed; removal always uses the recorded values.
    pub fn reload(&mut self, settings: UpgradeSettings) {
        info!(
            enabled = settings.enabled,
            announce_on_kill = settings.announce_on_kill,
            multiplier = settings.formula.multiplier,
            bosses = settings.bosses.len(),
            "upgrade settings reloaded"
        );
        self.settings = settings;
    }

    /// Highest threshold the player has unlocked; store failures read as none
    pub fn unlocked_threshold(&self, player: PlayerId) -> Option<u32> {
        match self.store.max_threshold(player) {
            Ok(level) => level,
            Err(err) => {
                warn!(%player, error = %err, "kill record lookup failed");
                None
            }
        }
    }

    /// Query the player's threshold and apply bonuses for one slot
    pub fn apply_bonuses<H>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        slot: EquipmentSlot,
        item: &ItemTemplate,
    ) -> ApplyOutcome
    where
        H: StatModifiers + ?Sized,
    {
        if !item.quality.is_upgradable() {
            return ApplyOutcome::NotEpic;
        }
        let threshold = self.unlocked_threshold(player);
        self.ledger
            .apply_bonuses(host, player, slot, item, threshold, &self.settings.formula)
    }

    pub fn remove_bonuses<H>(&mut self, host: &mut H, player: PlayerId, slot: EquipmentSlot) -> bool
    where
        H: StatModifiers + ?Sized,
    {
        self.ledger.remove_bonuses(host, player, slot)
    }

    pub fn on_login<H>(&mut self, host: &mut H, player: PlayerId)
    where
        H: HostServices + ?Sized,
    {
        let stale = self.ledger.clear_player(player);
        if stale > 0 {
            warn!(%player, stale, "dropped bonus entries left over from a previous session");
        }
        if !self.settings.enabled {
            return;
        }

        let equipped: Vec<(EquipmentSlot, ItemTemplate)> = EquipmentSlot::all()
            .iter()
            .filter_map(|&slot| host.equipped_item(player, slot).map(|item| (slot, item)))
            .collect();
        if !equipped.iter().any(|(_, item)| item.quality.is_upgradable()) {
            return;
        }

        // One store round-trip for the whole login
        let threshold = self.unlocked_threshold(player);
        let mut bonused = 0;
        for (slot, item) in &equipped {
            let outcome = self.ledger.apply_bonuses(
                host,
                player,
                *slot,
                item,
                threshold,
                &self.settings.formula,
            );
            if outcome.is_applied() {
                bonused += 1;
            }
        }
        debug!(%player, bonused, "login bonuses applied");
    }

    /// Forget the player's bonuses; the host is tearing down its stats anyway
    pub fn on_logout(&mut self, player: PlayerId) {
        let dropped = self.ledger.clear_player(player);
        trace!(%player, dropped, "player logged out");
    }

    pub fn on_equip<H>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        slot: EquipmentSlot,
        item: &ItemTemplate,
    ) -> ApplyOutcome
    where
        H: StatModifiers + ?Sized,
    {
        // The old item's bonus must be gone before the new one is computed
        self.ledger.remove_bonuses(host, player, slot);
        if !self.settings.enabled {
            return ApplyOutcome::Disabled;
        }
        self.apply_bonuses(host, player, slot, item)
    }

    pub fn on_unequip<H>(&mut self, host: &mut H, player: PlayerId, slot: EquipmentSlot) -> bool
    where
        H: StatModifiers + ?Sized,
    {
        self.ledger.remove_bonuses(host, player, slot)
    }

    /// Record a boss kill and refresh the killer's epic items
    ///
    /// Returns `None` when the module is disabled, no player can be
    /// credited, or the creature is not a configured boss.
    pub fn on_creature_died<H>(
        &mut self,
        host: &mut H,
        creature: &CreatureInfo,
        killer: &Combatant,
    ) -> Option<BossKill>
    where
        H: HostServices + ?Sized,
    {
        if !self.settings.enabled {
            return None;
        }
        let Some(threshold_level) = self.settings.bosses.threshold_for(creature.entry) else {
            trace!(entry = creature.entry, "not a configured boss");
            return None;
        };
        let Some(player) = resolve_acting_player(killer) else {
            debug!(boss = creature.entry, ?killer, "boss kill with no player to credit");
            return None;
        };

        match self.store.record_kill(player, creature.entry, threshold_level) {
            Ok(()) => info!(%player, boss = creature.entry, threshold_level, "boss kill recorded"),
            Err(err) => warn!(%player, boss = creature.entry, error = %err, "failed to record boss kill"),
        }

        let announced = self.settings.announce_on_kill;
        if announced {
            host.send_notice(player, &kill_notice(&creature.name, threshold_level));
        }

        let unlocked_level = self.unlocked_threshold(player);
        let mut refreshed_slots = 0;
        for &slot in EquipmentSlot::all() {
            let Some(item) = host.equipped_item(player, slot) else {
                continue;
            };
            if !item.quality.is_upgradable() {
                continue;
            }
            self.ledger.remove_bonuses(host, player, slot);
            self.ledger.apply_bonuses(
                host,
                player,
                slot,
                &item,
                unlocked_level,
                &self.settings.formula,
            );
            refreshed_slots += 1;
        }

        Some(BossKill {
            player,
            boss: creature.entry,
            threshold_level,
            unlocked_level,
            refreshed_slots,
            announced,
        })
    }
}

/// Chat text sent after a qualifying kill
pub fn kill_notice(boss_name: &str, threshold_level: u32) -> String {
    format!(
        "You have defeated {boss_name}! Your epic items up to item level {threshold_level} will receive stat upgrades."
    )
}
