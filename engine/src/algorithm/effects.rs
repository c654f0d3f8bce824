use serde::{Deserialize, Serialize};

use crate::database::{AttributeId, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateEffectKind {
    Inflicted,
    /// The state was already present. Only used for messages.
    AlreadyInflicted,
    Healed,
    /// Removed because the target took damage.
    HealedByAttack,
}

/// A state change an action wants to make on its current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEffect {
    pub state_id: StateId,
    pub effect: StateEffectKind,
}

impl StateEffect {
    pub fn new(state_id: StateId, effect: StateEffectKind) -> Self {
        Self { state_id, effect }
    }

    pub fn is_heal(&self) -> bool {
        matches!(
            self.effect,
            StateEffectKind::Healed | StateEffectKind::HealedByAttack
        )
    }
}

/// A change to the target's resistance shift for one attribute.
/// Each record lands at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEffect {
    pub attr_id: AttributeId,
    pub shift: i32,
    #[serde(skip)]
    pub(crate) applied: bool,
}

impl AttributeEffect {
    pub fn new(attr_id: AttributeId, shift: i32) -> Self {
        Self {
            attr_id,
            shift,
            applied: false,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }
}
