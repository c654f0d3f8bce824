mod common;

use common::*;
use engine::{ActionType, AlgorithmBase, BattlerId};

fn two_targets() -> AlgorithmBase {
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), vec![enemy(0), enemy(1)]);
    base.set_repeat(3);
    base
}

#[test]
fn repeat_first_order_hits_each_target_fully() {
    let battle = battle();
    let mut base = two_targets();
    base.start(&battle);

    let mut hits: Vec<BattlerId> = Vec::new();
    while base.is_current_target_valid() {
        loop {
            hits.push(base.target().unwrap());
            if !base.repeat_next(true) {
                break;
            }
        }
        base.target_next();
    }
    assert_eq!(
        hits,
        vec![enemy(0), enemy(0), enemy(0), enemy(1), enemy(1), enemy(1)]
    );
    assert_eq!(base.current_repeat(), 0);
}

#[test]
fn target_first_order_cycles_the_list() {
    let battle = battle();
    let mut base = two_targets();
    base.start(&battle);

    let mut hits: Vec<BattlerId> = Vec::new();
    loop {
        while base.is_current_target_valid() {
            hits.push(base.target().unwrap());
            base.target_next();
        }
        if !base.repeat_next(false) {
            break;
        }
        base.start(&battle);
    }
    assert_eq!(
        hits,
        vec![enemy(0), enemy(1), enemy(0), enemy(1), enemy(0), enemy(1)]
    );
}

#[test]
fn combo_multiplies_the_cap() {
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.set_repeat(2);
    base.apply_combo_hits_multiplier(3);
    assert_eq!(base.repeat(), 6);

    let mut extra = 0;
    while base.repeat_next(false) {
        extra += 1;
    }
    assert_eq!(extra, 5);
}

#[test]
fn repeat_needs_a_valid_target_when_asked() {
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.set_repeat(3);
    // Not started: no current target.
    assert!(!base.repeat_next(true));
    assert_eq!(base.current_repeat(), 0);
    assert!(base.repeat_next(false));
    assert_eq!(base.current_repeat(), 1);
}

#[test]
fn start_keeps_repeat_counter() {
    let battle = battle();
    let mut base = two_targets();
    assert!(base.repeat_next(false));
    base.start(&battle);
    assert_eq!(base.current_repeat(), 1);
}

#[test]
fn zero_repeat_acts_once() {
    let mut base = AlgorithmBase::new(ActionType::Normal, ally(0), enemy(0));
    base.set_repeat(0);
    assert_eq!(base.repeat(), 1);
    assert!(!base.repeat_next(false));
}
