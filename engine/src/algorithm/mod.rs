//! Resolution of a single battle action.
//!
//! [`AlgorithmBase`] owns everything that is shared by every kind of action:
//! the target list and its cursor, repeat counting, reflection and the
//! recorded effects together with the code that commits them to battlers.
//! Each action kind is a struct implementing [`Action`], which fills the
//! recorded effects for the current target in [`Action::execute`].
//!
//! The caller drives the state machine:
//!
//! ```text
//! start -> (execute -> apply_all -> target_next)* -> process_post_action_switches
//! ```
//!
//! Calling `execute` without a current target is a caller bug; it is
//! asserted in debug builds and reported as a failure otherwise.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Dice;
use crate::battle::Battle;
use crate::battler::{Battler, Stat};
use crate::database::SwitchId;
use crate::party::{BattlerId, Side};

mod effects;
pub mod item;
pub mod normal;
pub mod self_destruct;
pub mod simple;
pub mod skill;

pub use effects::{AttributeEffect, StateEffect, StateEffectKind};
pub use item::Item;
pub use normal::Normal;
pub use self_destruct::SelfDestruct;
pub use simple::{Charge, Defend, Escape, NoAction, Observe, Transform};
pub use skill::Skill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    None,
    Normal,
    Skill,
    Item,
    Defend,
    Observe,
    Charge,
    SelfDestruct,
    Escape,
    Transform,
}

/// Animation pose the source takes while acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    Idle,
    AttackRight,
    Skill,
    Defend,
    WalkRight,
    Item,
}

/// Who an action was aimed at when it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    Single(BattlerId),
    List(Vec<BattlerId>),
    Party(Side),
}

impl From<BattlerId> for TargetSpec {
    fn from(id: BattlerId) -> Self {
        TargetSpec::Single(id)
    }
}

impl From<Vec<BattlerId>> for TargetSpec {
    fn from(ids: Vec<BattlerId>) -> Self {
        TargetSpec::List(ids)
    }
}

impl From<Side> for TargetSpec {
    fn from(side: Side) -> Self {
        TargetSpec::Party(side)
    }
}

/// Shared state of one action: targets, repeats and the effects recorded for the current target.
#[derive(Debug, Clone)]
pub struct AlgorithmBase {
    kind: ActionType,
    source: BattlerId,
    spec: TargetSpec,
    original_targets: Vec<BattlerId>,
    targets: Vec<BattlerId>,
    current: usize,
    reflect_target: Option<BattlerId>,
    repeat: u32,
    cur_repeat: u32,
    affected: [Option<i32>; 6],
    absorb: [bool; 6],
    states: Vec<StateEffect>,
    attributes: Vec<AttributeEffect>,
    success: bool,
    critical_hit: bool,
    positive: bool,
    revived: bool,
    affected_switch: Option<SwitchId>,
    switch_enable: Option<SwitchId>,
    switch_disable: Option<SwitchId>,
}

impl AlgorithmBase {
    pub fn new(kind: ActionType, source: BattlerId, target: impl Into<TargetSpec>) -> Self {
        let spec = target.into();
        let original_targets = match &spec {
            TargetSpec::Single(id) => vec![*id],
            TargetSpec::List(ids) => ids.clone(),
            TargetSpec::Party(_) => Vec::new(),
        };
        Self {
            kind,
            source,
            spec,
            original_targets,
            targets: Vec::new(),
            current: 0,
            reflect_target: None,
            repeat: 1,
            cur_repeat: 0,
            affected: [None; 6],
            absorb: [false; 6],
            states: Vec::new(),
            attributes: Vec::new(),
            success: false,
            critical_hit: false,
            positive: false,
            revived: false,
            affected_switch: None,
            switch_enable: None,
            switch_disable: None,
        }
    }

    pub fn kind(&self) -> ActionType {
        self.kind
    }

    pub fn source(&self) -> BattlerId {
        self.source
    }

    pub fn target_spec(&self) -> &TargetSpec {
        &self.spec
    }

    /// Targets as chosen. A party is only expanded by `start`.
    pub fn original_targets(&self) -> &[BattlerId] {
        &self.original_targets
    }

    pub fn original_single_target(&self) -> Option<BattlerId> {
        match self.spec {
            TargetSpec::Single(id) => Some(id),
            _ => None,
        }
    }

    pub fn original_party_target(&self) -> Option<Side> {
        match self.spec {
            TargetSpec::Party(side) => Some(side),
            _ => None,
        }
    }

    pub fn reflect_target(&self) -> Option<BattlerId> {
        self.reflect_target
    }

    /// Builds the working target list and points at its first entry.
    pub fn start(&mut self, battle: &Battle) {
        if let TargetSpec::Party(side) = self.spec {
            self.original_targets = battle.party(side).present();
        }
        self.targets = self.original_targets.clone();
        self.current = 0;
        self.reflect_target = None;
        trace!(source = ?self.source, targets = self.targets.len(), "action started");
    }

    pub fn is_current_target_valid(&self) -> bool {
        self.current < self.targets.len()
    }

    pub fn target(&self) -> Option<BattlerId> {
        self.targets.get(self.current).copied()
    }

    pub fn targets(&self) -> &[BattlerId] {
        &self.targets
    }

    pub fn target_next(&mut self) -> bool {
        if self.current < self.targets.len() {
            self.current += 1;
        }
        self.is_current_target_valid()
    }

    /// Appends `target`. With `set_current` it becomes the current target right away.
    pub fn add_target(&mut self, target: BattlerId, set_current: bool) {
        let first = self.targets.len();
        self.targets.push(target);
        if set_current {
            self.current = first;
        }
    }

    /// Appends every present member of `side`. With `set_current` the first of them becomes current.
    pub fn add_targets(&mut self, battle: &Battle, side: Side, set_current: bool) {
        let first = self.targets.len();
        let members = battle.party(side).present();
        if members.is_empty() {
            return;
        }
        self.targets.extend(members);
        if set_current {
            self.current = first;
        }
    }

    /// Position of the first reflected target at or after the current one.
    pub fn first_reflected(&self, is_reflected: impl Fn(BattlerId) -> bool) -> Option<usize> {
        self.targets
            .get(self.current..)?
            .iter()
            .position(|id| is_reflected(*id))
            .map(|offset| self.current + offset)
    }

    /// Sends the rest of the action back at the source's side.
    /// A party-wide action hits the source's whole party, anything else the source alone.
    pub fn redirect_to_source(&mut self, battle: &Battle, reflected: usize) {
        let Some(reflected_id) = self.targets.get(reflected).copied() else {
            return;
        };
        self.reflect_target = Some(reflected_id);
        self.targets.truncate(self.current);
        match self.spec {
            TargetSpec::Party(_) => {
                self.targets.extend(battle.party(self.source.side).present());
            }
            _ => self.targets.push(self.source),
        }
        debug!(reflected = ?reflected_id, source = ?self.source, "action reflected");
    }

    pub fn reflect_targets(
        &mut self,
        battle: &Battle,
        is_reflected: impl Fn(BattlerId) -> bool,
    ) -> bool {
        match self.first_reflected(is_reflected) {
            Some(idx) => {
                self.redirect_to_source(battle, idx);
                true
            }
            None => false,
        }
    }

    pub fn set_repeat(&mut self, repeat: u32) {
        self.repeat = repeat.max(1);
    }

    pub fn apply_combo_hits_multiplier(&mut self, hits: u32) {
        self.repeat = self.repeat.saturating_mul(hits.max(1));
    }

    pub fn current_repeat(&self) -> u32 {
        self.cur_repeat
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Counts one more repetition. Wraps to 0 and returns false once the cap is reached,
    /// or when `require_valid_target` is set and there is no current target.
    pub fn repeat_next(&mut self, require_valid_target: bool) -> bool {
        self.cur_repeat += 1;
        if self.cur_repeat >= self.repeat
            || (require_valid_target && !self.is_current_target_valid())
        {
            self.cur_repeat = 0;
            return false;
        }
        true
    }

    /// Clears every recorded effect. Every `execute` starts with this.
    pub fn reset(&mut self) {
        self.affected = [None; 6];
        self.absorb = [false; 6];
        self.states.clear();
        self.attributes.clear();
        self.success = false;
        self.critical_hit = false;
        self.positive = false;
        self.revived = false;
        self.affected_switch = None;
    }

    pub fn set_affected(&mut self, stat: Stat, value: i32) -> i32 {
        self.affected[stat.index()] = Some(value);
        value
    }

    pub fn affected(&self, stat: Stat) -> i32 {
        self.affected[stat.index()].unwrap_or(0)
    }

    pub fn is_affected(&self, stat: Stat) -> bool {
        self.affected[stat.index()].is_some()
    }

    pub fn set_absorb(&mut self, stat: Stat, absorb: bool) -> bool {
        self.absorb[stat.index()] = absorb;
        absorb
    }

    pub fn is_absorb(&self, stat: Stat) -> bool {
        self.absorb[stat.index()]
    }

    pub fn set_affected_hp(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Hp, value)
    }

    pub fn set_affected_sp(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Sp, value)
    }

    pub fn set_affected_atk(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Atk, value)
    }

    pub fn set_affected_def(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Def, value)
    }

    pub fn set_affected_spi(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Spi, value)
    }

    pub fn set_affected_agi(&mut self, value: i32) -> i32 {
        self.set_affected(Stat::Agi, value)
    }

    pub fn affected_hp(&self) -> i32 {
        self.affected(Stat::Hp)
    }

    pub fn affected_sp(&self) -> i32 {
        self.affected(Stat::Sp)
    }

    pub fn is_affect_hp(&self) -> bool {
        self.is_affected(Stat::Hp)
    }

    pub fn is_affect_sp(&self) -> bool {
        self.is_affected(Stat::Sp)
    }

    pub fn set_is_absorb_hp(&mut self, absorb: bool) -> bool {
        self.set_absorb(Stat::Hp, absorb)
    }

    pub fn set_is_absorb_sp(&mut self, absorb: bool) -> bool {
        self.set_absorb(Stat::Sp, absorb)
    }

    pub fn set_affected_switch(&mut self, id: SwitchId) -> SwitchId {
        self.affected_switch = Some(id);
        id
    }

    pub fn affected_switch(&self) -> Option<SwitchId> {
        self.affected_switch
    }

    pub fn set_is_success(&mut self) -> bool {
        self.success = true;
        true
    }

    pub fn set_is_failure(&mut self) -> bool {
        self.success = false;
        false
    }

    /// Success is sticky: a false condition never clears an earlier success.
    pub fn set_is_success_if(&mut self, cond: bool) -> bool {
        self.success |= cond;
        self.success
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn set_is_critical_hit(&mut self, critical: bool) -> bool {
        self.critical_hit = critical;
        critical
    }

    pub fn is_critical_hit(&self) -> bool {
        self.critical_hit
    }

    pub fn set_is_positive(&mut self, positive: bool) -> bool {
        self.positive = positive;
        positive
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn is_revived(&self) -> bool {
        self.revived
    }

    pub fn add_affected_state(&mut self, effect: StateEffect) {
        self.states.push(effect);
    }

    pub fn state_effects(&self) -> &[StateEffect] {
        &self.states
    }

    pub fn add_affected_attribute(&mut self, effect: AttributeEffect) {
        self.attributes.push(effect);
    }

    pub fn shifted_attributes(&self) -> &[AttributeEffect] {
        &self.attributes
    }

    pub fn set_switch_enable(&mut self, id: SwitchId) {
        self.switch_enable = Some(id);
    }

    pub fn set_switch_disable(&mut self, id: SwitchId) {
        self.switch_disable = Some(id);
    }

    pub fn switch_enable(&self) -> Option<SwitchId> {
        self.switch_enable
    }

    pub fn switch_disable(&self) -> Option<SwitchId> {
        self.switch_disable
    }

    pub fn apply_switch_effect(&self, battle: &mut Battle) -> Option<SwitchId> {
        let id = self.affected_switch?;
        battle.switches.set(id, true);
        debug!(switch = id, "switch turned on");
        Some(id)
    }

    /// Commits the recorded change of `stat` to the current target and returns what actually changed.
    pub fn apply_stat_effect(&self, battle: &mut Battle, stat: Stat) -> i32 {
        let Some(delta) = self.affected[stat.index()] else {
            return 0;
        };
        let Some(target_id) = self.target() else {
            return 0;
        };
        let Some(target) = battle.battler_mut(target_id) else {
            return 0;
        };
        if stat == Stat::Hp && target.is_dead() {
            return 0;
        }
        let applied = target.change_modifier(stat, delta);
        if self.is_absorb(stat) && applied != 0 {
            if let Some(source) = battle.battler_mut(self.source) {
                let drained = source.change_modifier(stat, -applied);
                trace!(stat = stat.label(), drained, "absorbed into source");
            }
        }
        debug!(battler = ?target_id, stat = stat.label(), delta, applied, "stat effect applied");
        applied
    }

    pub fn apply_hp_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Hp)
    }

    pub fn apply_sp_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Sp)
    }

    pub fn apply_atk_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Atk)
    }

    pub fn apply_def_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Def)
    }

    pub fn apply_spi_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Spi)
    }

    pub fn apply_agi_effect(&self, battle: &mut Battle) -> i32 {
        self.apply_stat_effect(battle, Stat::Agi)
    }

    /// Applies one state record to the current target. Returns whether the target changed.
    ///
    /// Lifting death revives with the recorded HP gain, at least 1 HP.
    pub fn apply_state_effect(&mut self, battle: &mut Battle, effect: StateEffect) -> bool {
        let Some(target_id) = self.target() else {
            return false;
        };
        let is_death = battle.db.is_death_state(effect.state_id);
        let revive_hp = self.affected(Stat::Hp).max(1);
        let Some(target) = battle.battler_mut(target_id) else {
            return false;
        };
        let changed = match effect.effect {
            StateEffectKind::Inflicted => target.add_state(effect.state_id),
            StateEffectKind::AlreadyInflicted => false,
            StateEffectKind::Healed | StateEffectKind::HealedByAttack => {
                if is_death && target.is_dead() {
                    let revived = target.revive(revive_hp);
                    self.revived |= revived;
                    revived
                } else {
                    target.remove_state(effect.state_id)
                }
            }
        };
        debug!(battler = ?target_id, state = effect.state_id, effect = ?effect.effect, changed, "state effect applied");
        changed
    }

    /// Applies every state record in insertion order.
    pub fn apply_state_effects(&mut self, battle: &mut Battle) {
        let records = self.states.clone();
        for effect in records {
            self.apply_state_effect(battle, effect);
        }
    }

    /// Applies the attribute record at `index` unless it already landed. Returns the shift made.
    pub fn apply_attribute_shift_effect(&mut self, battle: &mut Battle, index: usize) -> i32 {
        let Some(target_id) = self.target() else {
            return 0;
        };
        let Some(record) = self.attributes.get_mut(index) else {
            return 0;
        };
        if record.applied {
            return 0;
        }
        let Some(target) = battle.battler_mut(target_id) else {
            return 0;
        };
        let shift = target.shift_attribute(record.attr_id, record.shift);
        record.applied = true;
        debug!(battler = ?target_id, attribute = record.attr_id, shift, "attribute shifted");
        shift
    }

    pub fn apply_attribute_shift_effects(&mut self, battle: &mut Battle) {
        for index in 0..self.attributes.len() {
            self.apply_attribute_shift_effect(battle, index);
        }
    }

    /// Commits every recorded effect to the current target.
    /// HP goes before states so that lifting death sees the healed amount.
    pub fn apply_all_effects(&mut self, battle: &mut Battle) {
        self.apply_switch_effect(battle);
        for stat in Stat::ALL {
            self.apply_stat_effect(battle, stat);
        }
        self.apply_state_effects(battle);
        self.apply_attribute_shift_effects(battle);
    }

    /// Runs once per action whether or not it succeeded.
    pub fn process_post_action_switches(&self, battle: &mut Battle) {
        if let Some(id) = self.switch_enable {
            battle.switches.set(id, true);
        }
        if let Some(id) = self.switch_disable {
            battle.switches.set(id, false);
        }
    }
}

/// One kind of battle action.
pub trait Action {
    fn base(&self) -> &AlgorithmBase;

    fn base_mut(&mut self) -> &mut AlgorithmBase;

    /// Whether the source can pay for the action at all.
    fn action_is_possible(&self, _battle: &Battle) -> bool {
        true
    }

    fn source_pose(&self) -> Pose {
        Pose::Idle
    }

    fn is_target_valid(&self, battle: &Battle, target: BattlerId) -> bool {
        battle.battler(target).is_some_and(Battler::can_act)
    }

    fn is_reflected(&self, _battle: &Battle, _target: BattlerId) -> bool {
        false
    }

    /// Records the effect on the current target. Returns whether the action succeeded.
    fn execute(&mut self, battle: &Battle, dice: &mut Dice) -> bool;

    /// Kind-specific change made after the recorded effects.
    fn apply_custom_effect(&mut self, _battle: &mut Battle) {}

    /// Change made to the source when `execute` fails on a target.
    fn apply_miss_effect(&mut self, _battle: &mut Battle) {}

    /// Pays what the action costs the source. Called once per action, before the first target.
    fn apply_source_cost(&self, _battle: &mut Battle) {}

    fn start_message(&self, _battle: &Battle) -> Option<String> {
        None
    }

    fn start(&mut self, battle: &Battle) {
        self.base_mut().start(battle);
    }

    fn target_next(&mut self) -> bool {
        self.base_mut().target_next()
    }

    fn target(&self) -> Option<BattlerId> {
        self.base().target()
    }

    fn reflect_targets(&mut self, battle: &Battle) -> bool {
        let found = self
            .base()
            .first_reflected(|target| self.is_reflected(battle, target));
        match found {
            Some(idx) => {
                self.base_mut().redirect_to_source(battle, idx);
                true
            }
            None => false,
        }
    }

    fn apply_all(&mut self, battle: &mut Battle) {
        self.base_mut().apply_all_effects(battle);
        self.apply_custom_effect(battle);
    }

    fn process_post_action_switches(&self, battle: &mut Battle) {
        self.base().process_post_action_switches(battle);
    }
}

/// Records a `HealedByAttack` for each state on `target` that damage shakes off.
pub(crate) fn release_states_by_damage(
    base: &mut AlgorithmBase,
    battle: &Battle,
    target: &Battler,
    dice: &mut Dice,
) {
    for state in target.states() {
        let Some(def) = battle.db.state(state) else {
            continue;
        };
        if def.release_by_damage > 0 && dice.percent(def.release_by_damage) {
            base.add_affected_state(StateEffect::new(state, StateEffectKind::HealedByAttack));
        }
    }
}

/// Current source and target of `base`, asserting in debug builds that `start` ran.
pub(crate) fn source_and_target<'a>(
    base: &AlgorithmBase,
    battle: &'a Battle,
) -> Option<(&'a Battler, &'a Battler)> {
    debug_assert!(
        base.is_current_target_valid(),
        "execute called without a current target"
    );
    let source = battle.battler(base.source())?;
    let target = battle.battler(base.target()?)?;
    Some((source, target))
}
