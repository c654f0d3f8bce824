mod common;

use common::*;
use engine::algorithm::{Normal, Skill};
use engine::database::SkillScope;
use engine::{Action, ActionType, AlgorithmBase, SkillDef, Side, TargetSpec};

#[test]
fn single_target_is_only_valid_after_start() {
    let battle = battle();
    let mut algo = Normal::new(ally(0), enemy(1));
    let base = algo.base();
    assert_eq!(base.original_single_target(), Some(enemy(1)));
    assert_eq!(base.original_party_target(), None);
    assert_eq!(base.original_targets(), &[enemy(1)]);
    assert!(!base.is_current_target_valid());
    assert_eq!(base.target(), None);

    algo.start(&battle);
    assert_eq!(algo.target(), Some(enemy(1)));
    assert!(!algo.target_next());
    assert!(!algo.target_next());
    assert_eq!(algo.target(), None);
}

#[test]
fn list_targets_iterate_in_order() {
    let battle = battle();
    let mut algo = Normal::new(ally(0), vec![enemy(2), enemy(0)]);
    assert_eq!(algo.base().original_single_target(), None);
    assert_eq!(algo.base().original_party_target(), None);

    algo.start(&battle);
    assert_eq!(algo.target(), Some(enemy(2)));
    assert!(algo.target_next());
    assert_eq!(algo.target(), Some(enemy(0)));
    assert!(!algo.target_next());
}

#[test]
fn party_snapshot_is_taken_at_start() {
    let mut battle = battle();
    let mut algo = Normal::new(ally(0), Side::Enemies);
    assert_eq!(algo.base().original_party_target(), Some(Side::Enemies));
    assert!(algo.base().original_targets().is_empty());

    battle.battler_mut(enemy(2)).unwrap().set_hidden(true);
    battle.battler_mut(enemy(3)).unwrap().kill();
    algo.start(&battle);
    // Dead members stay in the snapshot, hidden ones do not.
    let expected = vec![enemy(0), enemy(1), enemy(3)];
    assert_eq!(algo.base().original_targets(), expected.as_slice());
    assert_eq!(algo.base().targets(), expected.as_slice());
    assert!(!algo.is_target_valid(&battle, enemy(3)));
}

#[test]
fn add_target_appends_or_jumps() {
    let battle = battle();
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.start(&battle);

    base.add_target(enemy(2), false);
    assert_eq!(base.target(), Some(enemy(0)));
    assert!(base.target_next());
    assert_eq!(base.target(), Some(enemy(2)));

    base.add_target(enemy(3), true);
    assert_eq!(base.target(), Some(enemy(3)));
    assert!(!base.target_next());
    assert_eq!(base.original_targets(), &[enemy(0)]);
}

#[test]
fn add_targets_takes_whole_party() {
    let battle = battle();
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.start(&battle);
    base.add_targets(&battle, Side::Allies, true);
    assert_eq!(base.target(), Some(ally(0)));
    assert_eq!(base.targets().len(), 5);

    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.start(&battle);
    base.add_targets(&battle, Side::Allies, false);
    assert_eq!(base.target(), Some(enemy(0)));
    assert!(base.target_next());
    assert_eq!(base.target(), Some(ally(0)));
}

fn reflecting_battle() -> engine::Battle {
    let mut battle = battle();
    battle.battler_mut(enemy(1)).unwrap().add_state(REFLECT);
    battle
}

#[test]
fn reflect_single_target_returns_to_source() {
    let battle = reflecting_battle();
    let mut algo = Skill::new(ally(0), enemy(1), fire(), None);
    algo.start(&battle);
    assert!(algo.reflect_targets(&battle));
    assert_eq!(algo.base().reflect_target(), Some(enemy(1)));
    assert_eq!(algo.base().targets(), &[ally(0)]);
    assert_eq!(algo.target(), Some(ally(0)));
    assert_eq!(algo.base().original_targets(), &[enemy(1)]);
}

#[test]
fn reflect_list_collapses_to_source() {
    let battle = reflecting_battle();
    let mut algo = Skill::new(ally(0), vec![enemy(0), enemy(1), enemy(2)], fire(), None);
    algo.start(&battle);
    assert!(algo.reflect_targets(&battle));
    assert_eq!(algo.base().reflect_target(), Some(enemy(1)));
    assert_eq!(algo.base().targets(), &[ally(0)]);
}

#[test]
fn reflect_keeps_targets_already_hit() {
    let battle = reflecting_battle();
    let mut algo = Skill::new(ally(0), vec![enemy(0), enemy(1)], fire(), None);
    algo.start(&battle);
    algo.target_next();
    assert!(algo.reflect_targets(&battle));
    assert_eq!(algo.base().targets(), &[enemy(0), ally(0)]);
    assert_eq!(algo.target(), Some(ally(0)));
}

#[test]
fn reflect_party_hits_source_party() {
    let battle = reflecting_battle();
    let mut algo = Skill::new(ally(2), Side::Enemies, fire(), None);
    algo.start(&battle);
    assert!(algo.reflect_targets(&battle));
    assert_eq!(algo.base().reflect_target(), Some(enemy(1)));
    assert_eq!(
        algo.base().targets(),
        &[ally(0), ally(1), ally(2), ally(3)]
    );
}

#[test]
fn start_clears_reflection() {
    let battle = reflecting_battle();
    let mut algo = Skill::new(ally(0), enemy(1), fire(), None);
    algo.start(&battle);
    algo.reflect_targets(&battle);
    algo.start(&battle);
    assert_eq!(algo.base().reflect_target(), None);
    assert_eq!(algo.target(), Some(enemy(1)));
}

#[test]
fn only_hostile_magic_is_reflected() {
    let battle = reflecting_battle();
    let physical = SkillDef {
        physical_rate: 10,
        ..fire()
    };
    let mut algo = Skill::new(ally(0), enemy(1), physical, None);
    algo.start(&battle);
    assert!(!algo.reflect_targets(&battle));

    let healing = SkillDef {
        scope: SkillScope::Ally,
        ..fire()
    };
    let mut algo = Skill::new(ally(0), enemy(1), healing, None);
    algo.start(&battle);
    assert!(!algo.reflect_targets(&battle));

    let mut algo = Normal::new(ally(0), enemy(1));
    algo.start(&battle);
    assert!(!algo.reflect_targets(&battle));
    assert_eq!(algo.base().reflect_target(), None);
}

#[test]
fn base_reflection_uses_given_predicate() {
    let battle = battle();
    let mut base = AlgorithmBase::new(
        ActionType::Skill,
        enemy(0),
        TargetSpec::List(vec![ally(0), ally(1)]),
    );
    base.start(&battle);
    assert!(!base.reflect_targets(&battle, |_| false));
    assert!(base.reflect_targets(&battle, |id| id == ally(1)));
    assert_eq!(base.targets(), &[enemy(0)]);
}
