use super::{
    Action, ActionType, AlgorithmBase, Pose, StateEffect, StateEffectKind, TargetSpec,
    source_and_target,
};
use crate::Dice;
use crate::battle::Battle;
use crate::database::{DEATH_STATE, ItemDef, ItemKind};
use crate::formulas::recover_amount;
use crate::party::BattlerId;

/// Uses a medicine or switch item from the party inventory.
/// Special items that invoke a skill are resolved as a [`super::Skill`] instead.
#[derive(Debug, Clone)]
pub struct Item {
    base: AlgorithmBase,
    item: ItemDef,
}

impl Item {
    pub fn new(source: BattlerId, target: impl Into<TargetSpec>, item: ItemDef) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Item, source, target),
            item,
        }
    }

    pub fn item(&self) -> &ItemDef {
        &self.item
    }

    fn medicine(&mut self, battle: &Battle) -> bool {
        let Some((_, target)) = source_and_target(&self.base, battle) else {
            return self.base.set_is_failure();
        };
        let item = &self.item;
        self.base.set_is_positive(true);
        self.base.set_is_success();

        let dead = target.is_dead();
        if item.ko_only && !dead {
            return true;
        }

        let revives = !dead || item.cures_state(DEATH_STATE);
        if revives && (item.recover_hp != 0 || item.recover_hp_rate != 0) {
            let hp = recover_amount(item.recover_hp, item.recover_hp_rate, target.max_hp());
            self.base.set_affected_hp(hp);
        }
        // SP is recorded on the dead too.
        if item.recover_sp != 0 || item.recover_sp_rate != 0 {
            let sp = recover_amount(item.recover_sp, item.recover_sp_rate, target.max_sp());
            self.base.set_affected_sp(sp);
        }

        for state in item.states() {
            if target.has_state(state) {
                self.base
                    .add_affected_state(StateEffect::new(state, StateEffectKind::Healed));
            }
        }
        true
    }
}

impl Action for Item {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn action_is_possible(&self, battle: &Battle) -> bool {
        battle.inventory.has(self.item.id)
    }

    fn source_pose(&self) -> Pose {
        Pose::Item
    }

    fn is_target_valid(&self, battle: &Battle, target: BattlerId) -> bool {
        if !matches!(self.item.kind, ItemKind::Medicine | ItemKind::Switch) {
            return false;
        }
        let Some(b) = battle.battler(target) else {
            return false;
        };
        if b.is_hidden() {
            return false;
        }
        !b.is_dead() || self.item.cures_state(DEATH_STATE)
    }

    fn execute(&mut self, battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        match self.item.kind {
            ItemKind::Medicine => self.medicine(battle),
            ItemKind::Switch => {
                self.base.set_affected_switch(self.item.switch_id);
                self.base.set_is_success()
            }
            _ => self.base.set_is_failure(),
        }
    }

    fn apply_source_cost(&self, battle: &mut Battle) {
        battle.inventory.remove_item(self.item.id);
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!(
            "{} uses {}!",
            battle.name_of(self.base.source()),
            self.item.name
        ))
    }
}
