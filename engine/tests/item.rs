mod common;

use common::*;
use engine::algorithm::Item;
use engine::database::ItemKind;
use engine::{Action, Battle, BattlerId, Dice, ItemDef, Pose, StateEffect, StateEffectKind};

fn medicine(id: u32, name: &str) -> ItemDef {
    ItemDef {
        id,
        name: name.into(),
        kind: ItemKind::Medicine,
        ..Default::default()
    }
}

fn potion() -> ItemDef {
    ItemDef {
        recover_hp: 50,
        ..medicine(1, "Potion")
    }
}

fn phoenix() -> ItemDef {
    ItemDef {
        recover_hp_rate: 25,
        ko_only: true,
        state_set: vec![true],
        ..medicine(3, "Phoenix Feather")
    }
}

fn use_item(battle: &mut Battle, target: BattlerId, item: ItemDef) -> Item {
    let mut algo = Item::new(ally(0), target, item);
    algo.start(battle);
    assert!(algo.execute(battle, &mut Dice::from_seed(9)));
    algo.apply_all(battle);
    algo
}

#[test]
fn potion_heals() {
    let mut battle = battle();
    let algo = use_item(&mut battle, ally(1), potion());
    assert!(algo.base().is_positive());
    assert_eq!(hp(&battle, ally(1)), 150);
    assert_eq!(algo.source_pose(), Pose::Item);
}

#[test]
fn recovery_rates_scale_with_max() {
    let mut battle = battle();
    let tonic = ItemDef {
        recover_hp: 5,
        recover_hp_rate: 10,
        recover_sp: 10,
        recover_sp_rate: 20,
        ..medicine(2, "Tonic")
    };
    let algo = use_item(&mut battle, ally(1), tonic);
    assert_eq!(algo.base().affected_hp(), 25);
    assert_eq!(algo.base().affected_sp(), 30);
    assert_eq!(battle.battler(ally(1)).unwrap().sp(), 80);
}

#[test]
fn ko_only_item_ignores_living_targets() {
    let mut battle = battle();
    let algo = use_item(&mut battle, ally(1), phoenix());
    assert!(algo.base().is_success());
    assert!(!algo.base().is_affect_hp());
    assert!(algo.base().state_effects().is_empty());
    assert_eq!(hp(&battle, ally(1)), 100);
}

#[test]
fn revival_item_raises_the_dead() {
    let mut battle = battle();
    battle.battler_mut(ally(1)).unwrap().kill();
    let algo = Item::new(ally(0), ally(1), phoenix());
    assert!(algo.is_target_valid(&battle, ally(1)));

    let algo = use_item(&mut battle, ally(1), phoenix());
    assert_eq!(
        algo.base().state_effects(),
        &[StateEffect::new(1, StateEffectKind::Healed)]
    );
    assert!(algo.base().is_revived());
    assert_eq!(hp(&battle, ally(1)), 50);
}

#[test]
fn sp_recovery_is_recorded_on_the_dead() {
    let mut battle = battle();
    battle.battler_mut(ally(1)).unwrap().kill();
    let ether = ItemDef {
        recover_sp: 20,
        recover_sp_rate: 100,
        ..medicine(2, "Ether")
    };
    for ko_only in [false, true] {
        let mut algo = Item::new(ally(0), ally(1), ItemDef { ko_only, ..ether.clone() });
        algo.start(&battle);
        assert!(algo.execute(&battle, &mut Dice::from_seed(2)));
        assert!(algo.base().is_affect_sp());
        assert_eq!(algo.base().affected_sp(), 120);
        assert!(!algo.base().is_affect_hp());
    }
}

#[test]
fn huge_recovery_rate_fills_to_max() {
    let mut battle = battle();
    let elixir = ItemDef {
        recover_hp_rate: 20_000_000,
        ..medicine(8, "Elixir")
    };
    let algo = use_item(&mut battle, ally(1), elixir);
    assert_eq!(algo.base().affected_hp(), 40_000_000);
    assert_eq!(hp(&battle, ally(1)), 200);
}

#[test]
fn plain_medicine_cannot_target_the_dead() {
    let mut battle = battle();
    battle.battler_mut(ally(1)).unwrap().kill();
    battle.battler_mut(ally(2)).unwrap().set_hidden(true);
    let algo = Item::new(ally(0), ally(1), potion());
    assert!(!algo.is_target_valid(&battle, ally(1)));
    assert!(!algo.is_target_valid(&battle, ally(2)));
    assert!(algo.is_target_valid(&battle, ally(3)));
}

#[test]
fn antidote_cures_only_present_states() {
    let mut battle = battle();
    battle.battler_mut(ally(1)).unwrap().add_state(POISON);
    let antidote = ItemDef {
        state_set: vec![false, true, true],
        ..medicine(4, "Antidote")
    };
    let algo = use_item(&mut battle, ally(1), antidote.clone());
    assert_eq!(
        algo.base().state_effects(),
        &[StateEffect::new(POISON, StateEffectKind::Healed)]
    );
    assert!(!battle.battler(ally(1)).unwrap().has_state(POISON));

    let algo = use_item(&mut battle, ally(2), antidote);
    assert!(algo.base().state_effects().is_empty());
}

#[test]
fn switch_item_turns_switch_on() {
    let mut battle = battle();
    let bell = ItemDef {
        id: 5,
        name: "Silver Bell".into(),
        kind: ItemKind::Switch,
        switch_id: 9,
        ..Default::default()
    };
    let algo = use_item(&mut battle, ally(0), bell);
    assert_eq!(algo.base().affected_switch(), Some(9));
    assert!(battle.switches.get(9));
}

#[test]
fn equipment_cannot_be_used() {
    let battle = battle();
    let sword = ItemDef {
        id: 7,
        kind: ItemKind::Weapon,
        ..Default::default()
    };
    let mut algo = Item::new(ally(0), ally(1), sword);
    assert!(!algo.is_target_valid(&battle, ally(1)));
    algo.start(&battle);
    assert!(!algo.execute(&battle, &mut Dice::from_seed(1)));
}

#[test]
fn inventory_gates_and_is_consumed() {
    let mut battle = battle();
    let algo = Item::new(ally(0), ally(1), potion());
    assert!(!algo.action_is_possible(&battle));
    battle.inventory.add_item(1, 2);
    assert!(algo.action_is_possible(&battle));
    algo.apply_source_cost(&mut battle);
    assert_eq!(battle.inventory.count(1), 1);
    insta::assert_snapshot!(algo.start_message(&battle).unwrap(), @"Alex uses Potion!");
}
