use serde::{Deserialize, Serialize};

use crate::battler::Battler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Allies,
    Enemies,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Allies => Side::Enemies,
            Side::Enemies => Side::Allies,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Allies => "allies",
            Side::Enemies => "enemies",
        }
    }
}

/// Stable reference to a battler: its side and its slot in that party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattlerId {
    pub side: Side,
    pub index: usize,
}

impl BattlerId {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }

    pub fn ally(index: usize) -> Self {
        Self::new(Side::Allies, index)
    }

    pub fn enemy(index: usize) -> Self {
        Self::new(Side::Enemies, index)
    }
}

/// One side of the battle. Slots never move once the battle starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Party {
    side: Side,
    members: Vec<Battler>,
}

impl Party {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            members: Vec::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn push(&mut self, battler: Battler) -> BattlerId {
        self.members.push(battler);
        BattlerId::new(self.side, self.members.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Battler> {
        self.members.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Battler> {
        self.members.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BattlerId, &Battler)> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(move |(i, b)| (BattlerId::new(self.side, i), b))
    }

    /// Members currently taking part in the battle, dead ones included.
    pub fn present(&self) -> Vec<BattlerId> {
        self.iter()
            .filter(|(_, b)| !b.is_hidden())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn alive(&self) -> Vec<BattlerId> {
        self.iter()
            .filter(|(_, b)| b.can_act())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_defeated(&self) -> bool {
        self.members.iter().all(|b| !b.can_act())
    }
}
