use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::database::{AttributeId, Database, StatLimits, StateId, DEATH_STATE};
use crate::party::Side;

/// The six numeric stats an action can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Hp,
    Sp,
    Atk,
    Def,
    Spi,
    Agi,
}

impl Stat {
    pub const ALL: [Stat; 6] = [Stat::Hp, Stat::Sp, Stat::Atk, Stat::Def, Stat::Spi, Stat::Agi];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Sp => "SP",
            Stat::Atk => "ATK",
            Stat::Def => "DEF",
            Stat::Spi => "SPI",
            Stat::Agi => "AGI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_hp: i32,
    pub max_sp: i32,
    pub atk: i32,
    pub def: i32,
    pub spi: i32,
    pub agi: i32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            max_sp: 50,
            atk: 20,
            def: 20,
            spi: 20,
            agi: 20,
        }
    }
}

impl BaseStats {
    pub fn new(max_hp: i32, max_sp: i32, atk: i32, def: i32, spi: i32, agi: i32) -> Self {
        Self {
            max_hp,
            max_sp,
            atk,
            def,
            spi,
            agi,
        }
    }

    fn clamped(self, limits: &StatLimits) -> Self {
        Self {
            max_hp: self.max_hp.clamp(1, limits.max_hp),
            max_sp: self.max_sp.clamp(0, limits.max_sp),
            atk: self.atk.clamp(1, limits.max_stat),
            def: self.def.clamp(1, limits.max_stat),
            spi: self.spi.clamp(1, limits.max_stat),
            agi: self.agi.clamp(1, limits.max_stat),
        }
    }
}

/// One combat participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Battler {
    id: u32,
    name: String,
    side: Side,
    base: BaseStats,
    hp: i32,
    sp: i32,
    /// Battle modifiers for atk, def, spi, agi.
    modifiers: [i32; 4],
    states: IndexSet<StateId>,
    attribute_shifts: IndexMap<AttributeId, i32>,
    hidden: bool,
    defending: bool,
    charged: bool,
    hit_rate: i32,
    critical_rate: i32,
    #[serde(skip)]
    limits: StatLimits,
}

impl Battler {
    pub fn new(side: Side, id: u32, name: impl Into<String>, base: BaseStats) -> Self {
        Self::with_limits(side, id, name, base, StatLimits::default())
    }

    pub fn with_limits(
        side: Side,
        id: u32,
        name: impl Into<String>,
        base: BaseStats,
        limits: StatLimits,
    ) -> Self {
        let base = base.clamped(&limits);
        Self {
            id,
            name: name.into(),
            side,
            base,
            hp: base.max_hp,
            sp: base.max_sp,
            modifiers: [0; 4],
            states: IndexSet::new(),
            attribute_shifts: IndexMap::new(),
            hidden: false,
            defending: false,
            charged: false,
            hit_rate: 90,
            critical_rate: match side {
                Side::Allies => 3,
                Side::Enemies => 0,
            },
            limits,
        }
    }

    pub fn actor(id: u32, name: impl Into<String>, base: BaseStats) -> Self {
        Self::new(Side::Allies, id, name, base)
    }

    pub fn enemy(id: u32, name: impl Into<String>, base: BaseStats) -> Self {
        Self::new(Side::Enemies, id, name, base)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_enemy(&self) -> bool {
        self.side == Side::Enemies
    }

    pub fn base(&self) -> &BaseStats {
        &self.base
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.base.max_hp
    }

    pub fn sp(&self) -> i32 {
        self.sp
    }

    pub fn max_sp(&self) -> i32 {
        self.base.max_sp
    }

    pub fn atk(&self) -> i32 {
        self.effective(Stat::Atk)
    }

    pub fn def(&self) -> i32 {
        self.effective(Stat::Def)
    }

    pub fn spi(&self) -> i32 {
        self.effective(Stat::Spi)
    }

    pub fn agi(&self) -> i32 {
        self.effective(Stat::Agi)
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Sp => self.sp,
            other => self.effective(other),
        }
    }

    fn base_of(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Hp => self.base.max_hp,
            Stat::Sp => self.base.max_sp,
            Stat::Atk => self.base.atk,
            Stat::Def => self.base.def,
            Stat::Spi => self.base.spi,
            Stat::Agi => self.base.agi,
        }
    }

    fn effective(&self, stat: Stat) -> i32 {
        let modifier = self.modifiers[stat.index() - 2];
        (self.base_of(stat) + modifier).clamp(1, self.limits.max_stat)
    }

    pub fn hit_rate(&self) -> i32 {
        self.hit_rate
    }

    pub fn set_hit_rate(&mut self, rate: i32) {
        self.hit_rate = rate.clamp(0, 100);
    }

    pub fn critical_rate(&self) -> i32 {
        self.critical_rate
    }

    pub fn set_critical_rate(&mut self, rate: i32) {
        self.critical_rate = rate.clamp(0, 100);
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.base.max_hp);
    }

    pub fn set_sp(&mut self, sp: i32) {
        self.sp = sp.clamp(0, self.base.max_sp);
    }

    /// Returns the change actually made. Reaching 0 HP kills; dead battlers are unaffected.
    pub fn change_hp(&mut self, delta: i32) -> i32 {
        if self.is_dead() {
            return 0;
        }
        let before = self.hp;
        self.hp = before.saturating_add(delta).clamp(0, self.base.max_hp);
        if self.hp == 0 {
            self.kill();
        }
        self.hp - before
    }

    pub fn change_sp(&mut self, delta: i32) -> i32 {
        let before = self.sp;
        self.sp = before.saturating_add(delta).clamp(0, self.base.max_sp);
        self.sp - before
    }

    /// Battle modifiers stay within `-base/2..=base`; the return value is the change of the effective stat.
    pub fn change_modifier(&mut self, stat: Stat, delta: i32) -> i32 {
        match stat {
            Stat::Hp => self.change_hp(delta),
            Stat::Sp => self.change_sp(delta),
            _ => {
                let base = self.base_of(stat);
                let before = self.effective(stat);
                let slot = &mut self.modifiers[stat.index() - 2];
                *slot = slot.saturating_add(delta).clamp(-base / 2, base);
                self.effective(stat) - before
            }
        }
    }

    pub fn is_dead(&self) -> bool {
        self.states.contains(&DEATH_STATE)
    }

    /// Death clears every other state and leaves exactly 0 HP.
    pub fn kill(&mut self) {
        self.hp = 0;
        self.states.clear();
        self.states.insert(DEATH_STATE);
        self.defending = false;
        self.charged = false;
    }

    /// Lifts death with `hp` clamped to `1..=max_hp`. Returns false when not dead.
    pub fn revive(&mut self, hp: i32) -> bool {
        if !self.states.shift_remove(&DEATH_STATE) {
            return false;
        }
        self.hp = hp.clamp(1, self.base.max_hp);
        true
    }

    pub fn has_state(&self, id: StateId) -> bool {
        self.states.contains(&id)
    }

    /// True when the state was not present before.
    pub fn add_state(&mut self, id: StateId) -> bool {
        if self.states.contains(&id) {
            return false;
        }
        if id == DEATH_STATE {
            self.kill();
        } else {
            self.states.insert(id);
        }
        true
    }

    /// True when the state was present. Removing death this way leaves HP untouched.
    pub fn remove_state(&mut self, id: StateId) -> bool {
        self.states.shift_remove(&id)
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().copied()
    }

    /// The present state with the highest priority, earliest inflicted on ties.
    pub fn significant_state(&self, db: &Database) -> Option<StateId> {
        let mut best: Option<(StateId, i32)> = None;
        for id in self.states() {
            let priority = db.state(id).map(|s| s.priority).unwrap_or(0);
            if best.is_none_or(|(_, p)| priority > p) {
                best = Some((id, priority));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn attribute_shift(&self, attr: AttributeId) -> i32 {
        self.attribute_shifts.get(&attr).copied().unwrap_or(0)
    }

    /// Adds to the cumulative shift and returns the change.
    pub fn shift_attribute(&mut self, attr: AttributeId, shift: i32) -> i32 {
        let slot = self.attribute_shifts.entry(attr).or_insert(0);
        *slot += shift;
        shift
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_defending(&self) -> bool {
        self.defending
    }

    pub fn set_defending(&mut self, defending: bool) {
        self.defending = defending;
    }

    pub fn is_charged(&self) -> bool {
        self.charged
    }

    pub fn set_charged(&mut self, charged: bool) {
        self.charged = charged;
    }

    /// Present in the battle and able to act or be hit.
    pub fn can_act(&self) -> bool {
        !self.hidden && !self.is_dead()
    }

    /// Becomes another enemy. Current HP/SP keep their values within the new maxima.
    pub fn transform(&mut self, id: u32, name: impl Into<String>, base: BaseStats) {
        self.id = id;
        self.name = name.into();
        self.base = base.clamped(&self.limits);
        self.hp = self.hp.min(self.base.max_hp);
        self.sp = self.sp.min(self.base.max_sp);
        self.modifiers = [0; 4];
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> Battler {
        Battler::enemy(1, "Slime", BaseStats::new(200, 100, 200, 200, 200, 200))
    }

    #[test]
    fn modifiers_are_bounded_by_base() {
        let mut b = slime();
        assert_eq!(b.change_modifier(Stat::Atk, 999), 200);
        assert_eq!(b.atk(), 400);
        assert_eq!(b.change_modifier(Stat::Atk, -999), -300);
        assert_eq!(b.atk(), 100);
    }

    #[test]
    fn hp_zero_kills_and_clears_states() {
        let mut b = slime();
        b.add_state(3);
        assert_eq!(b.change_hp(-500), -200);
        assert!(b.is_dead());
        assert!(!b.has_state(3));
        assert_eq!(b.change_hp(50), 0);
    }

    #[test]
    fn revive_clamps_hp() {
        let mut b = slime();
        b.kill();
        assert!(b.revive(0));
        assert_eq!(b.hp(), 1);
        assert!(!b.revive(10));
    }

    #[test]
    fn significant_state_prefers_priority() {
        let mut db = Database::default();
        db.states.push(crate::database::StateDef {
            priority: 5,
            ..crate::database::StateDef::new(4, "Sleep")
        });
        let mut b = slime();
        b.add_state(3);
        b.add_state(4);
        assert_eq!(b.significant_state(&db), Some(4));
    }
}
