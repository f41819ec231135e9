//! Integration test: Login -> Equip -> Boss kill -> Unequip -> Logout
//!
//! Drives the coordinator against a recording host and checks that the
//! host's stat totals always match what the ledger says was granted.

use std::collections::HashMap;
use upgrade_core::{
    ApplyOutcome, BossConfig, Combatant, Coordinator, CreatureInfo, EquipmentLookup,
    EquipmentSlot, HostEvent, InMemoryKillStore, ItemQuality, ItemTemplate, KillRecord,
    KillRecordStore, ModifierOp, Notifier, PlayerId, SlotState, SqliteKillStore, StatFormula,
    StatKind, StatModifiers, StoreError, UpgradeSettings,
};

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const KELTHUZAD: u32 = 15990;
const ONYXIA: u32 = 10184;

/// Host double that keeps equipment, stat totals and notices
#[derive(Default)]
struct FakeHost {
    equipment: HashMap<(PlayerId, EquipmentSlot), ItemTemplate>,
    totals: HashMap<(PlayerId, StatKind), i64>,
    modifier_calls: Vec<(PlayerId, StatKind, i32, ModifierOp)>,
    recomputes: HashMap<PlayerId, usize>,
    notices: Vec<(PlayerId, String)>,
}

impl FakeHost {
    fn total(&self, player: PlayerId, stat: StatKind) -> i64 {
        self.totals.get(&(player, stat)).copied().unwrap_or(0)
    }

    fn equip(&mut self, player: PlayerId, slot: EquipmentSlot, item: ItemTemplate) {
        self.equipment.insert((player, slot), item);
    }

    fn recomputes(&self, player: PlayerId) -> usize {
        self.recomputes.get(&player).copied().unwrap_or(0)
    }
}

impl EquipmentLookup for FakeHost {
    fn equipped_item(&self, player: PlayerId, slot: EquipmentSlot) -> Option<ItemTemplate> {
        self.equipment.get(&(player, slot)).cloned()
    }
}

impl StatModifiers for FakeHost {
    fn modify_stat(&mut self, player: PlayerId, stat: StatKind, amount: i32, op: ModifierOp) {
        *self.totals.entry((player, stat)).or_insert(0) += op.signed(amount);
        self.modifier_calls.push((player, stat, amount, op));
    }

    fn update_all_stats(&mut self, player: PlayerId) {
        *self.recomputes.entry(player).or_insert(0) += 1;
    }
}

impl Notifier for FakeHost {
    fn send_notice(&mut self, player: PlayerId, text: &str) {
        self.notices.push((player, text.to_string()));
    }
}

/// Store whose backend is always down
struct OfflineStore;

impl KillRecordStore for OfflineStore {
    fn max_threshold(&self, _player: PlayerId) -> Result<Option<u32>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn threshold(&self, _player: PlayerId, _source: u32) -> Result<Option<u32>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn record_kill(&mut self, _player: PlayerId, _source: u32, _level: u32) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn records(&self, _player: PlayerId) -> Result<Vec<KillRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn settings() -> UpgradeSettings {
    UpgradeSettings {
        bosses: BossConfig::from_entries([(KELTHUZAD, 200), (ONYXIA, 170)]),
        ..UpgradeSettings::default()
    }
}

fn coordinator() -> Coordinator<InMemoryKillStore> {
    Coordinator::new(settings(), InMemoryKillStore::new())
}

fn kelthuzad() -> CreatureInfo {
    CreatureInfo::new(KELTHUZAD, "Kel'Thuzad")
}

/// Epic ilvl 150: 100 str, 60 sta, 0 agi
fn epic_helm() -> ItemTemplate {
    ItemTemplate::new(1001, "Self-Forged Helm", ItemQuality::Epic, 150)
        .with_stat(StatKind::Strength, 100)
        .with_stat(StatKind::Stamina, 60)
        .with_stat(StatKind::Agility, 0)
}

/// Epic ilvl 170: 45 agi, 30 sta
fn epic_circlet() -> ItemTemplate {
    ItemTemplate::new(1002, "Self-Forged Circlet", ItemQuality::Epic, 170)
        .with_stat(StatKind::Agility, 45)
        .with_stat(StatKind::Stamina, 30)
}

fn rare_cloak() -> ItemTemplate {
    ItemTemplate::new(1003, "Plain Cloak", ItemQuality::Rare, 150).with_stat(StatKind::Stamina, 60)
}

#[test]
fn test_end_to_end_kill_unlocks_bonus() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();

    coord.on_login(&mut host, ALICE);
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    let outcome = coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());

    // No kill history yet
    assert_eq!(outcome, ApplyOutcome::NoThreshold);
    assert!(host.modifier_calls.is_empty());
    assert_eq!(coord.ledger().slot_state(ALICE, EquipmentSlot::Head), SlotState::Unbonused);

    let kill = coord
        .on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE })
        .expect("configured boss");
    assert_eq!(kill.threshold_level, 200);
    assert_eq!(kill.unlocked_level, Some(200));
    assert_eq!(kill.refreshed_slots, 1);
    assert!(kill.announced);

    // 100 × 1.0109^50 = 171.95, 60 × 1.0109^50 = 103.17
    let bonus = coord.ledger().bonus(ALICE, EquipmentSlot::Head).expect("bonused");
    assert_eq!(bonus.get(StatKind::Strength), Some(71));
    assert_eq!(bonus.get(StatKind::Stamina), Some(43));
    assert_eq!(bonus.get(StatKind::Agility), None);
    assert_eq!(host.total(ALICE, StatKind::Strength), 71);
    assert_eq!(host.total(ALICE, StatKind::Stamina), 43);
    assert_eq!(
        host.modifier_calls,
        vec![
            (ALICE, StatKind::Strength, 71, ModifierOp::Apply),
            (ALICE, StatKind::Stamina, 43, ModifierOp::Apply),
        ]
    );

    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].0, ALICE);
    assert_eq!(
        host.notices[0].1,
        "You have defeated Kel'Thuzad! Your epic items up to item level 200 will receive stat upgrades."
    );
}

#[test]
fn test_equip_replaces_previous_bonus() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();

    coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());
    assert_eq!(host.total(ALICE, StatKind::Strength), 71);

    let outcome = coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_circlet());
    assert_eq!(outcome, ApplyOutcome::Applied(2));

    // Helm bonus fully gone, circlet bonus present: 45 → 62, 30 → 41
    assert_eq!(host.total(ALICE, StatKind::Strength), 0);
    assert_eq!(host.total(ALICE, StatKind::Agility), 17);
    assert_eq!(host.total(ALICE, StatKind::Stamina), 11);

    let bonus = coord.ledger().bonus(ALICE, EquipmentSlot::Head).unwrap();
    assert_eq!(bonus.get(StatKind::Strength), None);
    assert_eq!(bonus.get(StatKind::Agility), Some(17));
    assert_eq!(bonus.get(StatKind::Stamina), Some(11));
}

#[test]
fn test_equip_ineligible_item_clears_slot() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();

    coord.on_equip(&mut host, ALICE, EquipmentSlot::Back, &epic_helm());
    let outcome = coord.on_equip(&mut host, ALICE, EquipmentSlot::Back, &rare_cloak());

    assert_eq!(outcome, ApplyOutcome::NotEpic);
    assert_eq!(coord.ledger().slot_state(ALICE, EquipmentSlot::Back), SlotState::Unbonused);
    for &stat in StatKind::all() {
        assert_eq!(host.total(ALICE, stat), 0);
    }
}

#[test]
fn test_unequip_restores_totals() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();

    coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());
    coord.on_equip(&mut host, ALICE, EquipmentSlot::Chest, &epic_circlet());

    assert!(coord.on_unequip(&mut host, ALICE, EquipmentSlot::Head));
    assert_eq!(host.total(ALICE, StatKind::Strength), 0);
    assert_eq!(host.total(ALICE, StatKind::Stamina), 11);

    // Second unequip is a no-op
    let calls = host.modifier_calls.len();
    assert!(!coord.on_unequip(&mut host, ALICE, EquipmentSlot::Head));
    assert_eq!(host.modifier_calls.len(), calls);
    assert_eq!(coord.ledger().slot_state(ALICE, EquipmentSlot::Head), SlotState::Unbonused);
}

#[test]
fn test_login_applies_every_occupied_slot() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();

    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    host.equip(ALICE, EquipmentSlot::Chest, epic_circlet());
    host.equip(ALICE, EquipmentSlot::Back, rare_cloak());

    coord.on_login(&mut host, ALICE);

    assert_eq!(
        coord.ledger().bonused_slots(ALICE),
        vec![EquipmentSlot::Head, EquipmentSlot::Chest]
    );
    assert_eq!(host.total(ALICE, StatKind::Stamina), 43 + 11);
    assert_eq!(coord.ledger().total_for(ALICE, StatKind::Stamina), 54);
    assert_eq!(host.recomputes(ALICE), 2);
}

#[test]
fn test_login_resets_stale_ledger() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();

    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    coord.on_login(&mut host, ALICE);

    // Unclean session end: the host lost its stats but no logout arrived
    host.totals.clear();
    host.equipment.clear();
    host.equip(ALICE, EquipmentSlot::Chest, epic_circlet());
    coord.on_login(&mut host, ALICE);

    assert_eq!(coord.ledger().bonused_slots(ALICE), vec![EquipmentSlot::Chest]);
    assert_eq!(host.total(ALICE, StatKind::Strength), 0);
    assert_eq!(host.total(ALICE, StatKind::Agility), 17);
}

#[test]
fn test_logout_forgets_without_host_calls() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    coord.on_login(&mut host, ALICE);

    let calls = host.modifier_calls.len();
    let recomputes = host.recomputes(ALICE);
    coord.on_logout(ALICE);

    assert!(!coord.ledger().is_tracking(ALICE));
    assert_eq!(host.modifier_calls.len(), calls);
    assert_eq!(host.recomputes(ALICE), recomputes);
}

#[test]
fn test_pet_kill_credits_owner() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();

    let kill = coord.on_creature_died(
        &mut host,
        &kelthuzad(),
        &Combatant::Controlled { owner: Some(BOB) },
    );
    assert_eq!(kill.map(|k| k.player), Some(BOB));
    assert_eq!(coord.store().threshold(BOB, KELTHUZAD).unwrap(), Some(200));
}

#[test]
fn test_kill_without_player_or_boss_is_ignored() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();

    let ownerless = coord.on_creature_died(
        &mut host,
        &kelthuzad(),
        &Combatant::Controlled { owner: None },
    );
    assert!(ownerless.is_none());

    let by_creature = coord.on_creature_died(&mut host, &kelthuzad(), &Combatant::Creature);
    assert!(by_creature.is_none());

    let trash = CreatureInfo::new(12345, "Plagued Rat");
    let not_boss = coord.on_creature_died(&mut host, &trash, &Combatant::Player { id: ALICE });
    assert!(not_boss.is_none());

    assert!(coord.store().is_empty());
    assert!(host.notices.is_empty());
}

#[test]
fn test_lower_boss_does_not_lower_unlock() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    let player = Combatant::Player { id: ALICE };

    coord.on_creature_died(&mut host, &kelthuzad(), &player);
    let onyxia = CreatureInfo::new(ONYXIA, "Onyxia");
    let kill = coord.on_creature_died(&mut host, &onyxia, &player).unwrap();

    assert_eq!(kill.threshold_level, 170);
    assert_eq!(kill.unlocked_level, Some(200));

    // Config later lowers Kel'Thuzad; the stored record keeps its value
    let mut lowered = settings();
    lowered.bosses = BossConfig::from_entries([(KELTHUZAD, 120)]);
    coord.reload(lowered);
    coord.on_creature_died(&mut host, &kelthuzad(), &player);
    assert_eq!(coord.store().threshold(ALICE, KELTHUZAD).unwrap(), Some(200));
}

#[test]
fn test_boss_kill_refreshes_only_epic_items() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    host.equip(ALICE, EquipmentSlot::Back, rare_cloak());
    coord.on_login(&mut host, ALICE);

    let onyxia = CreatureInfo::new(ONYXIA, "Onyxia");
    let kill = coord
        .on_creature_died(&mut host, &onyxia, &Combatant::Player { id: ALICE })
        .unwrap();
    assert_eq!(kill.refreshed_slots, 1);
    // 100 × 1.0109^20 = 124.2
    assert_eq!(host.total(ALICE, StatKind::Strength), 24);

    // Raising the unlock replaces the bonus instead of stacking it
    coord.on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE });
    assert_eq!(host.total(ALICE, StatKind::Strength), 71);
    assert_eq!(coord.ledger().total_for(ALICE, StatKind::Strength), 71);
    assert_eq!(coord.ledger().slot_state(ALICE, EquipmentSlot::Back), SlotState::Unbonused);
}

#[test]
fn test_announcement_can_be_disabled() {
    let mut host = FakeHost::default();
    let mut coord = Coordinator::new(
        UpgradeSettings {
            announce_on_kill: false,
            ..settings()
        },
        InMemoryKillStore::new(),
    );

    let kill = coord
        .on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE })
        .unwrap();
    assert!(!kill.announced);
    assert!(host.notices.is_empty());
    assert_eq!(coord.store().max_threshold(ALICE).unwrap(), Some(200));
}

#[test]
fn test_disabled_module_still_removes() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();
    coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());

    coord.reload(UpgradeSettings {
        enabled: false,
        ..settings()
    });

    assert_eq!(
        coord.on_equip(&mut host, ALICE, EquipmentSlot::Chest, &epic_circlet()),
        ApplyOutcome::Disabled
    );
    assert!(coord
        .on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE })
        .is_none());

    assert!(coord.on_unequip(&mut host, ALICE, EquipmentSlot::Head));
    for &stat in StatKind::all() {
        assert_eq!(host.total(ALICE, stat), 0);
    }
}

#[test]
fn test_offline_store_means_no_bonus() {
    let mut host = FakeHost::default();
    let mut coord = Coordinator::new(settings(), OfflineStore);
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());

    coord.on_login(&mut host, ALICE);
    let outcome = coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());
    assert_eq!(outcome, ApplyOutcome::NoThreshold);

    // The kill is still announced even though recording failed
    let kill = coord
        .on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE })
        .unwrap();
    assert_eq!(kill.unlocked_level, None);
    assert_eq!(host.notices.len(), 1);
    assert!(host.modifier_calls.is_empty());
}

#[test]
fn test_reload_changes_multiplier_for_next_apply() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    coord.store_mut().record_kill(ALICE, KELTHUZAD, 200).unwrap();
    coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());

    coord.reload(UpgradeSettings {
        formula: StatFormula::new(1.0),
        ..settings()
    });

    // Removal hands back the recorded delta, then nothing new is granted
    let outcome = coord.on_equip(&mut host, ALICE, EquipmentSlot::Head, &epic_helm());
    assert_eq!(outcome, ApplyOutcome::NoPositiveDelta);
    assert_eq!(host.total(ALICE, StatKind::Strength), 0);
}

#[test]
fn test_handle_dispatches_events() {
    let mut host = FakeHost::default();
    let mut coord = coordinator();
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());

    coord.handle(&mut host, HostEvent::Login { player: ALICE });
    coord.handle(
        &mut host,
        HostEvent::CreatureDied {
            creature: kelthuzad(),
            killer: Combatant::Player { id: ALICE },
        },
    );
    assert_eq!(host.total(ALICE, StatKind::Strength), 71);

    host.equip(ALICE, EquipmentSlot::Head, epic_circlet());
    coord.handle(
        &mut host,
        HostEvent::Equip {
            player: ALICE,
            slot: EquipmentSlot::Head,
            item: epic_circlet(),
        },
    );
    assert_eq!(host.total(ALICE, StatKind::Strength), 0);
    assert_eq!(host.total(ALICE, StatKind::Agility), 17);

    coord.handle(
        &mut host,
        HostEvent::Unequip {
            player: ALICE,
            slot: EquipmentSlot::Head,
        },
    );
    assert_eq!(host.total(ALICE, StatKind::Agility), 0);

    coord.handle(&mut host, HostEvent::Logout { player: ALICE });
    coord.handle(&mut host, HostEvent::ConfigReloaded(UpgradeSettings::default()));
    assert!(coord.settings().bosses.is_empty());
    assert!(!coord.ledger().is_tracking(ALICE));
}

#[test]
fn test_sqlite_backed_coordinator() {
    let mut host = FakeHost::default();
    let store = SqliteKillStore::open_in_memory().unwrap();
    let mut coord = Coordinator::new(settings(), store);
    host.equip(ALICE, EquipmentSlot::Head, epic_helm());
    coord.on_login(&mut host, ALICE);

    coord.on_creature_died(&mut host, &kelthuzad(), &Combatant::Player { id: ALICE });
    assert_eq!(host.total(ALICE, StatKind::Stamina), 43);

    let records = coord.store().records(ALICE).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, KELTHUZAD);
    assert_eq!(records[0].threshold_level, 200);
}
