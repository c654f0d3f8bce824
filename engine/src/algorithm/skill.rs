use tracing::debug;

use super::{
    Action, ActionType, AlgorithmBase, AttributeEffect, Pose, StateEffect, StateEffectKind,
    TargetSpec, release_states_by_damage, source_and_target,
};
use crate::Dice;
use crate::battle::Battle;
use crate::battler::Stat;
use crate::database::{DEATH_STATE, ItemDef, SkillDef, SkillKind};
use crate::formulas::{adjust_for_defend, apply_variance, skill_effect, sp_cost};
use crate::party::BattlerId;

/// A skill, cast with SP or invoked through a special item.
#[derive(Debug, Clone)]
pub struct Skill {
    base: AlgorithmBase,
    skill: SkillDef,
    item: Option<ItemDef>,
}

impl Skill {
    pub fn new(
        source: BattlerId,
        target: impl Into<TargetSpec>,
        skill: SkillDef,
        item: Option<ItemDef>,
    ) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Skill, source, target),
            skill,
            item,
        }
    }

    pub fn skill(&self) -> &SkillDef {
        &self.skill
    }

    pub fn item(&self) -> Option<&ItemDef> {
        self.item.as_ref()
    }

    fn heals_states(&self) -> bool {
        self.skill.scope.is_ally_side() != self.skill.reverse_state_effect
    }

    fn stat_flags(&self) -> [(Stat, bool); 6] {
        let s = &self.skill;
        [
            (Stat::Hp, s.affect_hp),
            (Stat::Sp, s.affect_sp),
            (Stat::Atk, s.affect_atk),
            (Stat::Def, s.affect_def),
            (Stat::Spi, s.affect_spi),
            (Stat::Agi, s.affect_agi),
        ]
    }
}

impl Action for Skill {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn action_is_possible(&self, battle: &Battle) -> bool {
        match &self.item {
            Some(item) => battle.inventory.has(item.id),
            None => battle
                .battler(self.base.source())
                .is_some_and(|source| source.sp() >= sp_cost(&self.skill, source)),
        }
    }

    fn source_pose(&self) -> Pose {
        Pose::Skill
    }

    fn is_target_valid(&self, battle: &Battle, target: BattlerId) -> bool {
        let Some(b) = battle.battler(target) else {
            return false;
        };
        if b.is_hidden() {
            return false;
        }
        if b.is_dead() {
            return self.skill.scope.is_ally_side() && self.skill.affects_state(DEATH_STATE);
        }
        true
    }

    fn is_reflected(&self, battle: &Battle, target: BattlerId) -> bool {
        if !self.skill.is_magical()
            || self.skill.scope.is_ally_side()
            || target.side == self.base.source().side
        {
            return false;
        }
        battle.battler(target).is_some_and(|b| {
            b.states()
                .any(|id| battle.db.state(id).is_some_and(|s| s.reflect_magic))
        })
    }

    fn execute(&mut self, battle: &Battle, dice: &mut Dice) -> bool {
        self.base.reset();
        let Some((source, target)) = source_and_target(&self.base, battle) else {
            return self.base.set_is_failure();
        };

        if self.skill.kind == SkillKind::Switch {
            self.base.set_affected_switch(self.skill.switch_id);
            return self.base.set_is_success();
        }

        let positive = self.base.set_is_positive(self.skill.scope.is_ally_side());
        if !positive && !dice.percent(self.skill.hit) {
            return self.base.set_is_failure();
        }

        let mut effect = skill_effect(&self.skill, source, target, positive);
        effect = apply_variance(dice, effect, self.skill.variance);
        if !positive {
            if self.skill.physical_rate > 0 {
                effect = adjust_for_defend(effect, target);
            }
            effect = effect.min(battle.db.limits.max_damage);
        }

        let heals = self.heals_states();
        let revives = heals && target.is_dead() && self.skill.affects_state(DEATH_STATE);
        if !target.is_dead() || revives {
            for (stat, affected) in self.stat_flags() {
                if !affected {
                    continue;
                }
                if positive {
                    self.base.set_affected(stat, effect);
                } else {
                    self.base.set_affected(stat, -effect);
                    self.base.set_absorb(stat, self.skill.absorb);
                }
                self.base.set_is_success();
            }
            if !positive && self.skill.affect_hp && self.skill.physical_rate > 0 && effect > 0 {
                release_states_by_damage(&mut self.base, battle, target, dice);
            }
        }

        for state in self.skill.states() {
            if heals {
                if target.has_state(state) {
                    self.base
                        .add_affected_state(StateEffect::new(state, StateEffectKind::Healed));
                    self.base.set_is_success();
                }
            } else if target.has_state(state) {
                self.base.add_affected_state(StateEffect::new(
                    state,
                    StateEffectKind::AlreadyInflicted,
                ));
            } else {
                let rate = battle.db.state(state).map_or(100, |s| s.inflict_rate);
                if dice.percent(rate) {
                    self.base
                        .add_affected_state(StateEffect::new(state, StateEffectKind::Inflicted));
                    self.base.set_is_success();
                }
            }
        }

        if self.skill.affect_attr_defence {
            let shift = if positive { 1 } else { -1 };
            for attr in self.skill.attributes() {
                self.base
                    .add_affected_attribute(AttributeEffect::new(attr, shift));
                self.base.set_is_success();
            }
        }

        self.base.is_success()
    }

    fn apply_source_cost(&self, battle: &mut Battle) {
        match &self.item {
            Some(item) => {
                battle.inventory.remove_item(item.id);
            }
            None => {
                let source = self.base.source();
                if let Some(b) = battle.battler_mut(source) {
                    let cost = sp_cost(&self.skill, b);
                    b.change_sp(-cost);
                    debug!(source = ?source, cost, "sp paid");
                }
            }
        }
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        let source = battle.name_of(self.base.source());
        Some(match &self.item {
            Some(item) => format!("{} uses {}!", source, item.name),
            None => format!("{} casts {}!", source, self.skill.name),
        })
    }
}
