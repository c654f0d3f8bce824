use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battler::BaseStats;

pub type StateId = u32;
pub type SkillId = u32;
pub type ItemId = u32;
pub type EnemyId = u32;
pub type AttributeId = u32;
pub type SwitchId = u32;

/// State id 1 always represents death.
pub const DEATH_STATE: StateId = 1;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown skill id {0}")]
    UnknownSkill(SkillId),
    #[error("unknown item id {0}")]
    UnknownItem(ItemId),
    #[error("unknown enemy id {0}")]
    UnknownEnemy(EnemyId),
    #[error("no builtin {kind} named '{id}'")]
    UnknownBuiltin { kind: &'static str, id: String },
    #[error("{side} slot {index} is empty")]
    MissingBattler { side: &'static str, index: usize },
    #[error("scenario needs either `database` or `database_id`")]
    MissingDatabase,
    #[error("failed to parse {0}: {1}")]
    Parse(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLimits {
    pub max_hp: i32,
    pub max_sp: i32,
    pub max_stat: i32,
    pub max_damage: i32,
}

impl Default for StatLimits {
    fn default() -> Self {
        Self {
            max_hp: 9999,
            max_sp: 999,
            max_stat: 999,
            max_damage: 9999,
        }
    }
}

fn default_rate() -> i32 {
    100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    pub id: StateId,
    pub name: String,
    /// Higher priority states are reported first.
    #[serde(default)]
    pub priority: i32,
    /// Percent chance that taking damage clears the state.
    #[serde(default)]
    pub release_by_damage: i32,
    /// Percent chance an inflicting skill lands the state.
    #[serde(default = "default_rate")]
    pub inflict_rate: i32,
    #[serde(default)]
    pub reflect_magic: bool,
}

impl StateDef {
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            priority: 0,
            release_by_damage: 0,
            inflict_rate: 100,
            reflect_magic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    #[default]
    Normal,
    Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillScope {
    #[default]
    Enemy,
    Enemies,
    Myself,
    Ally,
    Party,
}

impl SkillScope {
    /// Scopes aimed at the user's own side count as positive actions.
    pub fn is_ally_side(self) -> bool {
        matches!(self, SkillScope::Myself | SkillScope::Ally | SkillScope::Party)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    pub kind: SkillKind,
    pub scope: SkillScope,
    pub sp_cost: i32,
    /// When set, `sp_cost` is a percentage of the user's max SP.
    pub sp_percent: bool,
    pub power: i32,
    pub physical_rate: i32,
    pub magical_rate: i32,
    pub variance: i32,
    pub hit: i32,
    pub affect_hp: bool,
    pub affect_sp: bool,
    pub affect_atk: bool,
    pub affect_def: bool,
    pub affect_spi: bool,
    pub affect_agi: bool,
    pub absorb: bool,
    pub ignore_defense: bool,
    /// Bit `i` refers to state `i + 1`.
    pub state_effects: Vec<bool>,
    pub reverse_state_effect: bool,
    /// Bit `i` refers to attribute `i + 1`.
    pub attribute_effects: Vec<bool>,
    pub affect_attr_defence: bool,
    pub switch_id: SwitchId,
}

impl Default for SkillDef {
    fn default() -> Self {
        Self {
            id: 1,
            name: String::new(),
            kind: SkillKind::Normal,
            scope: SkillScope::Enemy,
            sp_cost: 0,
            sp_percent: false,
            power: 0,
            physical_rate: 0,
            magical_rate: 3,
            variance: 4,
            hit: 100,
            affect_hp: true,
            affect_sp: false,
            affect_atk: false,
            affect_def: false,
            affect_spi: false,
            affect_agi: false,
            absorb: false,
            ignore_defense: false,
            state_effects: Vec::new(),
            reverse_state_effect: false,
            attribute_effects: Vec::new(),
            affect_attr_defence: false,
            switch_id: 0,
        }
    }
}

impl SkillDef {
    pub fn affects_state(&self, state: StateId) -> bool {
        bit(&self.state_effects, state)
    }

    /// States named by the skill, in id order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        set_bits(&self.state_effects)
    }

    pub fn attributes(&self) -> impl Iterator<Item = AttributeId> + '_ {
        set_bits(&self.attribute_effects)
    }

    pub fn is_magical(&self) -> bool {
        self.physical_rate == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Normal,
    Weapon,
    Shield,
    Armor,
    Helmet,
    Accessory,
    Medicine,
    Book,
    Material,
    Special,
    Switch,
}

impl ItemKind {
    pub const ALL: [ItemKind; 11] = [
        ItemKind::Normal,
        ItemKind::Weapon,
        ItemKind::Shield,
        ItemKind::Armor,
        ItemKind::Helmet,
        ItemKind::Accessory,
        ItemKind::Medicine,
        ItemKind::Book,
        ItemKind::Material,
        ItemKind::Special,
        ItemKind::Switch,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub recover_hp: i32,
    pub recover_hp_rate: i32,
    pub recover_sp: i32,
    pub recover_sp_rate: i32,
    /// Only usable on knocked out targets.
    pub ko_only: bool,
    /// Bit `i` refers to state `i + 1`.
    pub state_set: Vec<bool>,
    pub switch_id: SwitchId,
    /// Skill invoked by `Special` items.
    pub skill_id: SkillId,
}

impl ItemDef {
    pub fn cures_state(&self, state: StateId) -> bool {
        bit(&self.state_set, state)
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        set_bits(&self.state_set)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: EnemyId,
    pub name: String,
    pub stats: BaseStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub limits: StatLimits,
    pub states: Vec<StateDef>,
    pub skills: Vec<SkillDef>,
    pub items: Vec<ItemDef>,
    pub enemies: Vec<EnemyDef>,
}

impl Database {
    pub fn state(&self, id: StateId) -> Option<&StateDef> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn skill(&self, id: SkillId) -> Result<&SkillDef, EngineError> {
        self.skills
            .iter()
            .find(|s| s.id == id)
            .ok_or(EngineError::UnknownSkill(id))
    }

    pub fn item(&self, id: ItemId) -> Result<&ItemDef, EngineError> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .ok_or(EngineError::UnknownItem(id))
    }

    pub fn enemy(&self, id: EnemyId) -> Result<&EnemyDef, EngineError> {
        self.enemies
            .iter()
            .find(|e| e.id == id)
            .ok_or(EngineError::UnknownEnemy(id))
    }

    pub fn is_death_state(&self, id: StateId) -> bool {
        id == DEATH_STATE
    }

    pub fn state_name(&self, id: StateId) -> String {
        self.state(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("state #{}", id))
    }

    /// Parse JSON, or YAML when `name` ends in `.yaml`/`.yml`.
    pub fn parse(name: &str, text: &str) -> Result<Self, EngineError> {
        parse_config(name, text)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        load_config(path.as_ref())
    }
}

pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    name: &str,
    text: &str,
) -> Result<T, EngineError> {
    let lower = name.to_lowercase();
    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(text).map_err(|e| EngineError::Parse(name.to_string(), e.to_string()))
    } else {
        serde_json::from_str(text).map_err(|e| EngineError::Parse(name.to_string(), e.to_string()))
    }
}

pub(crate) fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    use anyhow::Context;

    let name = path.to_string_lossy().into_owned();
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", name))?;
    let value = parse_config(&name, &text)?;
    Ok(value)
}

fn bit(bits: &[bool], id: u32) -> bool {
    id >= 1 && bits.get(id as usize - 1).copied().unwrap_or(false)
}

fn set_bits(bits: &[bool]) -> impl Iterator<Item = u32> + '_ {
    bits.iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .map(|(i, _)| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitsets_are_one_based() {
        let skill = SkillDef {
            state_effects: vec![false, true, true],
            ..Default::default()
        };
        assert!(!skill.affects_state(1));
        assert!(skill.affects_state(2));
        assert!(!skill.affects_state(0));
        assert!(!skill.affects_state(9));
        assert_eq!(skill.states().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn yaml_and_json_both_parse() {
        let json = r#"{ "states": [{ "id": 1, "name": "Dead" }] }"#;
        let yaml = "states:\n  - id: 1\n    name: Dead\n";
        let a = Database::parse("db.json", json).unwrap();
        let b = Database::parse("db.yaml", yaml).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.limits, StatLimits::default());
        assert_eq!(a.state(1).unwrap().inflict_rate, 100);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let db = Database::default();
        assert!(matches!(db.skill(4), Err(EngineError::UnknownSkill(4))));
        assert!(matches!(db.item(2), Err(EngineError::UnknownItem(2))));
    }
}
