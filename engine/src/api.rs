use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithm::{
    Action, ActionType, AttributeEffect, Charge, Defend, Escape, Item, NoAction, Normal, Observe,
    SelfDestruct, Skill, StateEffect, StateEffectKind, TargetSpec, Transform,
};
use crate::battle::Battle;
use crate::battler::{BaseStats, Battler, Stat};
use crate::content::{builtin_databases, builtin_scenarios};
use crate::database::{
    parse_config, Database, EngineError, EnemyId, ItemId, ItemKind, SkillId, StateId, SwitchId,
};
use crate::party::{BattlerId, Side};
use crate::Dice;

/// How a repeated action walks its targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatOrder {
    /// Every repeat against one target before moving on.
    #[default]
    RepeatFirst,
    /// One hit per target, then the whole list again.
    TargetFirst,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BattlerSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: u32,
    /// Takes name and stats from the database enemy with this id.
    #[serde(default)]
    pub enemy_id: Option<EnemyId>,
    #[serde(default)]
    pub stats: Option<BaseStats>,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub sp: Option<i32>,
    #[serde(default)]
    pub states: Vec<StateId>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub defending: bool,
    #[serde(default)]
    pub charged: bool,
    #[serde(default)]
    pub hit_rate: Option<i32>,
    #[serde(default)]
    pub critical_rate: Option<i32>,
}

impl BattlerSpec {
    fn build(&self, side: Side, slot: usize, db: &Database) -> Result<Battler, EngineError> {
        let enemy = self.enemy_id.map(|id| db.enemy(id)).transpose()?;
        let id = enemy.map_or(self.id, |e| e.id);
        let name = match (&self.name, enemy) {
            (Some(name), _) => name.clone(),
            (None, Some(e)) => e.name.clone(),
            (None, None) => match side {
                Side::Allies => format!("Ally {}", slot + 1),
                Side::Enemies => format!("Enemy {}", slot + 1),
            },
        };
        let stats = self
            .stats
            .or_else(|| enemy.map(|e| e.stats))
            .unwrap_or_default();

        let mut b = Battler::with_limits(side, id, name, stats, db.limits);
        if let Some(hp) = self.hp {
            b.set_hp(hp);
        }
        if let Some(sp) = self.sp {
            b.set_sp(sp);
        }
        if let Some(rate) = self.hit_rate {
            b.set_hit_rate(rate);
        }
        if let Some(rate) = self.critical_rate {
            b.set_critical_rate(rate);
        }
        for state in &self.states {
            b.add_state(*state);
        }
        // A battler configured with 0 HP starts out dead.
        if b.hp() == 0 && !b.is_dead() {
            b.kill();
        }
        b.set_hidden(self.hidden);
        b.set_defending(self.defending);
        b.set_charged(self.charged);
        Ok(b)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionConfig {
    None {
        source: BattlerId,
    },
    Observe {
        source: BattlerId,
    },
    Defend {
        source: BattlerId,
    },
    Charge {
        source: BattlerId,
    },
    Escape {
        source: BattlerId,
    },
    Transform {
        source: BattlerId,
        into: EnemyId,
    },
    Normal {
        source: BattlerId,
        target: TargetSpec,
    },
    Skill {
        source: BattlerId,
        target: TargetSpec,
        skill_id: SkillId,
    },
    Item {
        source: BattlerId,
        target: TargetSpec,
        item_id: ItemId,
    },
    SelfDestruct {
        source: BattlerId,
        target: Side,
    },
}

impl ActionConfig {
    fn source(&self) -> BattlerId {
        match self {
            ActionConfig::None { source }
            | ActionConfig::Observe { source }
            | ActionConfig::Defend { source }
            | ActionConfig::Charge { source }
            | ActionConfig::Escape { source }
            | ActionConfig::Transform { source, .. }
            | ActionConfig::Normal { source, .. }
            | ActionConfig::Skill { source, .. }
            | ActionConfig::Item { source, .. }
            | ActionConfig::SelfDestruct { source, .. } => *source,
        }
    }

    fn target(&self) -> Option<&TargetSpec> {
        match self {
            ActionConfig::Normal { target, .. }
            | ActionConfig::Skill { target, .. }
            | ActionConfig::Item { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PostSwitches {
    #[serde(default)]
    pub enable: Option<SwitchId>,
    #[serde(default)]
    pub disable: Option<SwitchId>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub database: Option<Database>,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub allies: Vec<BattlerSpec>,
    #[serde(default)]
    pub enemies: Vec<BattlerSpec>,
    #[serde(default)]
    pub inventory: IndexMap<ItemId, u32>,
    /// Switches that start out on.
    #[serde(default)]
    pub switches: Vec<SwitchId>,
    pub action: ActionConfig,
    #[serde(default = "one")]
    pub repeat: u32,
    #[serde(default = "one")]
    pub combo: u32,
    #[serde(default)]
    pub order: RepeatOrder,
    #[serde(default)]
    pub post_switches: PostSwitches,
    #[serde(default)]
    pub seed: u64,
    /// Fixed dice results replayed in order instead of a seeded generator.
    #[serde(default)]
    pub rolls: Option<Vec<i32>>,
}

/// Outcome of one execute/apply step against one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HitReport {
    pub target: BattlerId,
    pub target_name: String,
    pub success: bool,
    pub critical: bool,
    /// HP actually gained or lost by the target.
    pub hp: i32,
    pub sp: i32,
    pub states: Vec<StateEffect>,
    pub attributes: Vec<AttributeEffect>,
    pub switch: Option<SwitchId>,
    pub revived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActionReport {
    pub kind: ActionType,
    pub source: BattlerId,
    pub possible: bool,
    /// At least one hit succeeded.
    pub success: bool,
    pub reflected: Option<BattlerId>,
    pub hits: Vec<HitReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioReport {
    pub name: String,
    pub action: ActionReport,
    pub allies: Vec<Battler>,
    pub enemies: Vec<Battler>,
    pub switches_on: Vec<SwitchId>,
    pub log: Vec<String>,
}

/// Drives one action from start to post-action switches, the way a battle scheduler does.
///
/// Targets the action rejects are skipped; reflection is checked after every start.
pub fn resolve_action(
    algo: &mut dyn Action,
    battle: &mut Battle,
    dice: &mut Dice,
    order: RepeatOrder,
    mut log: impl FnMut(String),
) -> ActionReport {
    let source = algo.base().source();
    let mut report = ActionReport {
        kind: algo.base().kind(),
        source,
        possible: algo.action_is_possible(battle),
        success: false,
        reflected: None,
        hits: Vec::new(),
    };

    if !report.possible {
        log(format!(
            "[MISS][{}] cannot perform {:?}",
            battle.name_of(source),
            report.kind
        ));
        algo.process_post_action_switches(battle);
        log_switches(algo, &mut log);
        log(format!("[END] {:?} not possible", report.kind));
        return report;
    }

    if let Some(msg) = algo.start_message(battle) {
        log(format!("[START] {}", msg));
    }
    algo.apply_source_cost(battle);
    start_and_reflect(algo, battle, &mut report, &mut log);

    match order {
        RepeatOrder::RepeatFirst => {
            while algo.base().is_current_target_valid() {
                loop {
                    hit_current(algo, battle, dice, &mut report, &mut log);
                    if !algo.base_mut().repeat_next(true) {
                        break;
                    }
                }
                algo.target_next();
            }
        }
        RepeatOrder::TargetFirst => loop {
            while algo.base().is_current_target_valid() {
                hit_current(algo, battle, dice, &mut report, &mut log);
                algo.target_next();
            }
            if !algo.base_mut().repeat_next(false) {
                break;
            }
            start_and_reflect(algo, battle, &mut report, &mut log);
        },
    }

    algo.process_post_action_switches(battle);
    log_switches(algo, &mut log);
    log(format!(
        "[END] {:?} {}",
        report.kind,
        if report.success { "succeeded" } else { "failed" }
    ));
    report
}

fn start_and_reflect(
    algo: &mut dyn Action,
    battle: &Battle,
    report: &mut ActionReport,
    log: &mut impl FnMut(String),
) {
    algo.start(battle);
    if algo.reflect_targets(battle) {
        let reflected = algo.base().reflect_target();
        if let Some(id) = reflected {
            log(format!(
                "[REFLECT][{}] bounces the action back at {}",
                battle.name_of(id),
                battle.name_of(algo.base().source())
            ));
        }
        report.reflected = reflected;
    }
}

fn hit_current(
    algo: &mut dyn Action,
    battle: &mut Battle,
    dice: &mut Dice,
    report: &mut ActionReport,
    log: &mut impl FnMut(String),
) {
    let Some(target) = algo.target() else {
        return;
    };
    let name = battle.name_of(target);
    if !algo.is_target_valid(battle, target) {
        debug!(battler = ?target, "target skipped");
        return;
    }
    log(format!(
        "[TARGET] {} -> {}",
        battle.name_of(algo.base().source()),
        name
    ));

    let (hp_before, sp_before) = battle
        .battler(target)
        .map_or((0, 0), |b| (b.hp(), b.sp()));
    let success = algo.execute(battle, dice);
    if success {
        algo.apply_all(battle);
    } else {
        algo.apply_miss_effect(battle);
    }
    let (hp_after, sp_after) = battle
        .battler(target)
        .map_or((0, 0), |b| (b.hp(), b.sp()));

    let base = algo.base();
    let hit = HitReport {
        target,
        target_name: name,
        success,
        critical: base.is_critical_hit(),
        hp: hp_after - hp_before,
        sp: sp_after - sp_before,
        states: base.state_effects().to_vec(),
        attributes: base.shifted_attributes().to_vec(),
        switch: base.affected_switch(),
        revived: base.is_revived(),
    };
    log_hit(&hit, battle, base.is_affected(Stat::Hp), log);
    report.success |= success;
    report.hits.push(hit);
}

fn log_hit(hit: &HitReport, battle: &Battle, affects_hp: bool, log: &mut impl FnMut(String)) {
    if !hit.success {
        log(format!("[MISS][{}] unaffected", hit.target_name));
        return;
    }
    if let Some(id) = hit.switch {
        log(format!("[SWITCH] {} on", id));
    }
    if affects_hp {
        let (hp, max) = battle
            .battler(hit.target)
            .map_or((0, 0), |b| (b.hp(), b.max_hp()));
        log(format!(
            "[HP][{}] {:+}{} ({}/{})",
            hit.target_name,
            hit.hp,
            if hit.critical { " critical" } else { "" },
            hp,
            max
        ));
    }
    for effect in &hit.states {
        let verb = match effect.effect {
            StateEffectKind::Inflicted => "inflicted",
            StateEffectKind::AlreadyInflicted => "already inflicted",
            StateEffectKind::Healed => "healed",
            StateEffectKind::HealedByAttack => "shaken off",
        };
        log(format!(
            "[STATE][{}] {} {}",
            hit.target_name,
            battle.db.state_name(effect.state_id),
            verb
        ));
    }
    if hit.revived {
        log(format!("[STATE][{}] revived", hit.target_name));
    }
    for attr in &hit.attributes {
        log(format!(
            "[ATTR][{}] attribute {} {:+}",
            hit.target_name, attr.attr_id, attr.shift
        ));
    }
}

fn log_switches(algo: &dyn Action, log: &mut impl FnMut(String)) {
    let base = algo.base();
    if let Some(id) = base.switch_enable() {
        log(format!("[SWITCH] {} on after action", id));
    }
    if let Some(id) = base.switch_disable() {
        log(format!("[SWITCH] {} off after action", id));
    }
}

/// Builds the battle a scenario describes.
pub fn build_battle(scenario: &Scenario) -> Result<Battle> {
    let db = match (&scenario.database, &scenario.database_id) {
        (Some(db), _) => db.clone(),
        (None, Some(id)) => builtin_database(id)?,
        (None, None) => return Err(EngineError::MissingDatabase.into()),
    };
    let mut battle = Battle::new(db);
    for (side, specs) in [
        (Side::Allies, &scenario.allies),
        (Side::Enemies, &scenario.enemies),
    ] {
        for (slot, spec) in specs.iter().enumerate() {
            let b = spec
                .build(side, slot, &battle.db)
                .with_context(|| format!("invalid {} slot {}", side.label(), slot))?;
            battle.add(b);
        }
    }
    for (id, count) in &scenario.inventory {
        battle.inventory.add_item(*id, *count);
    }
    for id in &scenario.switches {
        battle.switches.set(*id, true);
    }
    Ok(battle)
}

fn check_battler(battle: &Battle, id: BattlerId) -> Result<(), EngineError> {
    match battle.battler(id) {
        Some(_) => Ok(()),
        None => Err(EngineError::MissingBattler {
            side: id.side.label(),
            index: id.index,
        }),
    }
}

/// Creates the action a scenario asks for, with repeats and post-action switches set.
pub fn build_action(scenario: &Scenario, battle: &mut Battle) -> Result<Box<dyn Action>> {
    let cfg = &scenario.action;
    check_battler(battle, cfg.source())?;
    match cfg.target() {
        Some(TargetSpec::Single(id)) => check_battler(battle, *id)?,
        Some(TargetSpec::List(ids)) => {
            for id in ids {
                check_battler(battle, *id)?;
            }
        }
        _ => {}
    }

    let mut algo: Box<dyn Action> = match cfg {
        ActionConfig::None { source } => Box::new(NoAction::new(*source)),
        ActionConfig::Observe { source } => Box::new(Observe::new(*source)),
        ActionConfig::Defend { source } => Box::new(Defend::new(battle, *source)),
        ActionConfig::Charge { source } => Box::new(Charge::new(*source)),
        ActionConfig::Escape { source } => Box::new(Escape::new(*source)),
        ActionConfig::Transform { source, into } => Box::new(Transform::new(*source, *into)),
        ActionConfig::Normal { source, target } => Box::new(Normal::new(*source, target.clone())),
        ActionConfig::Skill {
            source,
            target,
            skill_id,
        } => {
            let skill = battle.db.skill(*skill_id)?.clone();
            Box::new(Skill::new(*source, target.clone(), skill, None))
        }
        ActionConfig::Item {
            source,
            target,
            item_id,
        } => {
            let item = battle.db.item(*item_id)?.clone();
            if item.kind == ItemKind::Special {
                let skill = battle.db.skill(item.skill_id)?.clone();
                Box::new(Skill::new(*source, target.clone(), skill, Some(item)))
            } else {
                Box::new(Item::new(*source, target.clone(), item))
            }
        }
        ActionConfig::SelfDestruct { source, target } => {
            Box::new(SelfDestruct::new(*source, *target))
        }
    };

    let base = algo.base_mut();
    base.set_repeat(scenario.repeat);
    base.apply_combo_hits_multiplier(scenario.combo);
    if let Some(id) = scenario.post_switches.enable {
        base.set_switch_enable(id);
    }
    if let Some(id) = scenario.post_switches.disable {
        base.set_switch_disable(id);
    }
    Ok(algo)
}

pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioReport> {
    let mut battle = build_battle(scenario)?;
    let mut algo = build_action(scenario, &mut battle)?;
    let mut dice = match &scenario.rolls {
        Some(rolls) => Dice::from_scripted(rolls.clone()),
        None => Dice::from_seed(scenario.seed),
    };
    info!(scenario = %scenario.name, kind = ?algo.base().kind(), "resolving scenario");

    let mut log = Vec::new();
    let action = resolve_action(
        algo.as_mut(),
        &mut battle,
        &mut dice,
        scenario.order,
        |line| log.push(line),
    );

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        action,
        allies: battle.allies.iter().map(|(_, b)| b.clone()).collect(),
        enemies: battle.enemies.iter().map(|(_, b)| b.clone()).collect(),
        switches_on: battle.switches.on(),
        log,
    })
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    crate::database::load_config(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))
}

/// Parse a scenario from text; YAML when `name` ends in `.yaml`/`.yml`, JSON otherwise.
pub fn parse_scenario(name: &str, text: &str) -> Result<Scenario> {
    let scenario = parse_config(name, text)?;
    Ok(scenario)
}

pub fn builtin_scenario(id: &str) -> Result<Scenario> {
    let text = builtin_scenarios()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownBuiltin {
            kind: "scenario",
            id: id.to_string(),
        })?;
    parse_scenario(&format!("{}.json", id), text)
        .with_context(|| format!("failed to parse builtin scenario '{}'", id))
}

pub fn builtin_database(id: &str) -> Result<Database> {
    let text = builtin_databases()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownBuiltin {
            kind: "database",
            id: id.to_string(),
        })?;
    let db = Database::parse(&format!("{}.json", id), text)
        .with_context(|| format!("failed to parse builtin database '{}'", id))?;
    Ok(db)
}

/// Ids of the bundled scenarios, sorted.
pub fn builtin_scenario_ids() -> Vec<&'static str> {
    let mut ids: Vec<_> = builtin_scenarios().keys().copied().collect();
    ids.sort_unstable();
    ids
}
