use tracing::debug;

use super::{
    Action, ActionType, AlgorithmBase, release_states_by_damage, source_and_target,
};
use crate::Dice;
use crate::battle::Battle;
use crate::formulas::{ATTACK_VARIANCE, adjust_for_defend, apply_variance, self_destruct_effect};
use crate::party::{BattlerId, Side};

/// Explodes against a whole party. The source leaves the battle once it hits.
#[derive(Debug, Clone)]
pub struct SelfDestruct {
    base: AlgorithmBase,
}

impl SelfDestruct {
    pub fn new(source: BattlerId, target: Side) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::SelfDestruct, source, target),
        }
    }
}

impl Action for SelfDestruct {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn execute(&mut self, battle: &Battle, dice: &mut Dice) -> bool {
        self.base.reset();
        let Some((source, target)) = source_and_target(&self.base, battle) else {
            return self.base.set_is_failure();
        };

        let effect = self_destruct_effect(source.atk(), target.def());
        let effect = apply_variance(dice, effect, ATTACK_VARIANCE);
        let effect = adjust_for_defend(effect, target).min(battle.db.limits.max_damage);

        self.base.set_affected_hp(-effect);
        if effect > 0 {
            release_states_by_damage(&mut self.base, battle, target, dice);
        }
        self.base.set_is_success()
    }

    fn apply_custom_effect(&mut self, battle: &mut Battle) {
        if let Some(source) = battle.battler_mut(self.base.source()) {
            if !source.is_hidden() {
                source.set_hidden(true);
                debug!(source = ?self.base.source(), "self-destructed");
            }
        }
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!(
            "{} self-destructs!",
            battle.name_of(self.base.source())
        ))
    }
}
