use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::battler::Battler;
use crate::database::{Database, ItemId, SwitchId};
use crate::party::{BattlerId, Party, Side};

/// Global boolean flags shared with the game's event scripts. Unset ids read as off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switches {
    values: IndexMap<SwitchId, bool>,
}

impl Switches {
    pub fn get(&self, id: SwitchId) -> bool {
        self.values.get(&id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: SwitchId, value: bool) {
        self.values.insert(id, value);
    }

    /// Ids switched on, in the order they were first touched.
    pub fn on(&self) -> Vec<SwitchId> {
        self.values
            .iter()
            .filter(|(_, on)| **on)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: IndexMap<ItemId, u32>,
}

impl Inventory {
    pub fn add_item(&mut self, id: ItemId, count: u32) {
        *self.counts.entry(id).or_insert(0) += count;
    }

    pub fn count(&self, id: ItemId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn has(&self, id: ItemId) -> bool {
        self.count(id) > 0
    }

    /// Returns false when none are left.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        match self.counts.get_mut(&id) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Everything an action reads or writes: both parties, the switch table,
/// the allies' inventory and the database.
#[derive(Debug, Clone)]
pub struct Battle {
    pub db: Database,
    pub allies: Party,
    pub enemies: Party,
    pub switches: Switches,
    pub inventory: Inventory,
}

impl Battle {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            allies: Party::new(Side::Allies),
            enemies: Party::new(Side::Enemies),
            switches: Switches::default(),
            inventory: Inventory::default(),
        }
    }

    pub fn party(&self, side: Side) -> &Party {
        match side {
            Side::Allies => &self.allies,
            Side::Enemies => &self.enemies,
        }
    }

    pub fn party_mut(&mut self, side: Side) -> &mut Party {
        match side {
            Side::Allies => &mut self.allies,
            Side::Enemies => &mut self.enemies,
        }
    }

    pub fn add(&mut self, battler: Battler) -> BattlerId {
        let side = battler.side();
        self.party_mut(side).push(battler)
    }

    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        self.party(id.side).get(id.index)
    }

    pub fn battler_mut(&mut self, id: BattlerId) -> Option<&mut Battler> {
        self.party_mut(id.side).get_mut(id.index)
    }

    pub fn name_of(&self, id: BattlerId) -> String {
        self.battler(id)
            .map(|b| b.name().to_string())
            .unwrap_or_else(|| format!("{}#{}", id.side.label(), id.index))
    }
}
