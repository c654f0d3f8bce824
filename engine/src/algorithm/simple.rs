//! Self-targeting actions that only flip a flag on their source.

use tracing::debug;

use super::{Action, ActionType, AlgorithmBase, Pose};
use crate::Dice;
use crate::battle::Battle;
use crate::database::EnemyId;
use crate::party::BattlerId;

/// The source does nothing, e.g. it is asleep.
#[derive(Debug, Clone)]
pub struct NoAction {
    base: AlgorithmBase,
}

impl NoAction {
    pub fn new(source: BattlerId) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::None, source, source),
        }
    }
}

impl Action for NoAction {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }
}

#[derive(Debug, Clone)]
pub struct Observe {
    base: AlgorithmBase,
}

impl Observe {
    pub fn new(source: BattlerId) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Observe, source, source),
        }
    }
}

impl Action for Observe {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!(
            "{} is observing the battle.",
            battle.name_of(self.base.source())
        ))
    }
}

/// Choosing to defend raises the flag immediately, before the action resolves.
#[derive(Debug, Clone)]
pub struct Defend {
    base: AlgorithmBase,
}

impl Defend {
    pub fn new(battle: &mut Battle, source: BattlerId) -> Self {
        if let Some(b) = battle.battler_mut(source) {
            b.set_defending(true);
        }
        Self {
            base: AlgorithmBase::new(ActionType::Defend, source, source),
        }
    }
}

impl Action for Defend {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn source_pose(&self) -> Pose {
        Pose::Defend
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!("{} is defending.", battle.name_of(self.base.source())))
    }
}

/// Doubles the damage of the source's next attack.
#[derive(Debug, Clone)]
pub struct Charge {
    base: AlgorithmBase,
}

impl Charge {
    pub fn new(source: BattlerId) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Charge, source, source),
        }
    }
}

impl Action for Charge {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }

    fn apply_custom_effect(&mut self, battle: &mut Battle) {
        if let Some(b) = battle.battler_mut(self.base.source()) {
            b.set_charged(true);
        }
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!(
            "{} is charging up.",
            battle.name_of(self.base.source())
        ))
    }
}

/// Leaves the battle. The source is hidden from then on.
#[derive(Debug, Clone)]
pub struct Escape {
    base: AlgorithmBase,
}

impl Escape {
    pub fn new(source: BattlerId) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Escape, source, source),
        }
    }
}

impl Action for Escape {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn source_pose(&self) -> Pose {
        Pose::WalkRight
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }

    fn apply_custom_effect(&mut self, battle: &mut Battle) {
        if let Some(b) = battle.battler_mut(self.base.source()) {
            b.set_hidden(true);
            debug!(source = ?self.base.source(), "escaped");
        }
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        Some(format!("{} runs away.", battle.name_of(self.base.source())))
    }
}

/// Turns the source into another enemy from the database.
#[derive(Debug, Clone)]
pub struct Transform {
    base: AlgorithmBase,
    into: EnemyId,
}

impl Transform {
    pub fn new(source: BattlerId, into: EnemyId) -> Self {
        Self {
            base: AlgorithmBase::new(ActionType::Transform, source, source),
            into,
        }
    }

    pub fn into_enemy(&self) -> EnemyId {
        self.into
    }
}

impl Action for Transform {
    fn base(&self) -> &AlgorithmBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase {
        &mut self.base
    }

    fn execute(&mut self, _battle: &Battle, _dice: &mut Dice) -> bool {
        self.base.reset();
        self.base.set_is_success()
    }

    fn apply_custom_effect(&mut self, battle: &mut Battle) {
        let def = battle.db.enemy(self.into).ok().cloned();
        let Some(b) = battle.battler_mut(self.base.source()) else {
            return;
        };
        match def {
            Some(def) => b.transform(def.id, def.name, def.stats),
            // Unknown ids keep the current stat block.
            None => b.set_id(self.into),
        }
        debug!(source = ?self.base.source(), into = self.into, "transformed");
    }

    fn start_message(&self, battle: &Battle) -> Option<String> {
        let into = battle
            .db
            .enemy(self.into)
            .map(|e| e.name.clone())
            .unwrap_or_else(|_| format!("enemy #{}", self.into));
        Some(format!(
            "{} transforms into {}.",
            battle.name_of(self.base.source()),
            into
        ))
    }
}
