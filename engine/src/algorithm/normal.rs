use super::{
    Action, ActionType, AlgorithmBase, Pose, TargetSpec, release_states_by_damage,
    source_and_target,
};
use crate::Dice;
use crate::battle::Battle;
use crate::formulas::{
    ATTACK_VARIANCE, CHARGE_MULTIPLIER, CRITICAL_MULTIPLIER, adjust_for_defend, apply_variance,
    normal_attack_effect, normal_attack_to_hit,
};
use crate::party::BattlerId;

/// A plain weapon attack.
#[derive(Debug, Clone)]
pub struct Normal {
    base: AlgorithmBase,
}

impl Normal {
    pub fn new(source: BattlerId, target: impl Into<TargetSpec>) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Normal, source, target),
        }
    }
}

impl Action for Normal {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn source_pose(&self) -> Pose {
        Pose::AttackRight
    }

    // Rolls in a fixed order: hit, critical, variance, then one per releasable state.
    fn execute(&mut self, battle: &Battle, dice: &mut Dice) -> bool {
        self.base.reset();
        let Some((source, target)) = source_and_target(&self.base, battle) else {
            return self.base.set_is_failure();
        };

        let to_hit = normal_attack_to_hit(source.hit_rate(), source.agi(), target.agi());
        if !dice.percent(to_hit) {
            return self.base.set_is_failure();
        }
        let critical = self
            .base
            .set_is_critical_hit(dice.percent(source.critical_rate()));

        let mut effect = normal_attack_effect(source.atk(), target.def());
        effect = apply_variance(dice, effect, ATTACK_VARIANCE);
        if critical {
            effect = effect.saturating_mul(CRITICAL_MULTIPLIER);
        }
        if source.is_charged() {
            effect = effect.saturating_mul(CHARGE_MULTIPLIER);
        }
        effect = adjust_for_defend(effect, target).min(battle.db.limits.max_damage);

        self.base.set_affected_hp(-effect);
        if effect > 0 {
            release_states_by_damage(&mut self.base, battle, target, dice);
        }
        self.base.set_is_success()
    }

    fn apply_custom_effect(&mut self, battle: &mut Battle) {
        if let Some(source) = battle.battler_mut(self.base.source()) {
            source.set_charged(false);
        }
    }

    // A missed swing still spends the charge.
    fn apply_miss_effect(&mut self, battle: &mut Battle) {
        self.apply_custom_effect(battle);
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!("{} attacks!", battle.name_of(self.base.source())))
    }
}
