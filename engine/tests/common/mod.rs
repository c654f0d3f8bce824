#![allow(dead_code)]

use engine::database::EnemyDef;
use engine::{BaseStats, Battle, Battler, BattlerId, Database, SkillDef, StateDef};

pub const SLEEP: u32 = 2;
pub const POISON: u32 = 3;
pub const REFLECT: u32 = 4;

pub fn database() -> Database {
    Database {
        states: vec![
            StateDef::new(1, "Death"),
            StateDef {
                release_by_damage: 100,
                ..StateDef::new(SLEEP, "Sleep")
            },
            StateDef::new(POISON, "Poison"),
            StateDef {
                reflect_magic: true,
                ..StateDef::new(REFLECT, "Reflect")
            },
        ],
        enemies: vec![EnemyDef {
            id: 2,
            name: "Dragon".into(),
            stats: BaseStats::new(900, 100, 200, 150, 120, 80),
        }],
        ..Default::default()
    }
}

fn stats() -> BaseStats {
    BaseStats::new(200, 100, 100, 100, 100, 100)
}

/// Four allies and four enemies, each at 100/200 HP and 50/100 SP.
pub fn battle() -> Battle {
    let mut battle = Battle::new(database());
    for (i, name) in ["Alex", "Brian", "Carol", "Dana"].into_iter().enumerate() {
        battle.add(Battler::actor(i as u32 + 1, name, stats()));
    }
    for (i, name) in ["Slime A", "Slime B", "Slime C", "Slime D"]
        .into_iter()
        .enumerate()
    {
        battle.add(Battler::enemy(i as u32 + 1, name, stats()));
    }
    for side in [engine::Side::Allies, engine::Side::Enemies] {
        for index in 0..4 {
            let b = battle.battler_mut(BattlerId::new(side, index)).unwrap();
            b.set_hp(100);
            b.set_sp(50);
        }
    }
    battle
}

pub fn ally(index: usize) -> BattlerId {
    BattlerId::ally(index)
}

pub fn enemy(index: usize) -> BattlerId {
    BattlerId::enemy(index)
}

pub fn hp(battle: &Battle, id: BattlerId) -> i32 {
    battle.battler(id).unwrap().hp()
}

/// Hostile magic: power 30, no variance.
pub fn fire() -> SkillDef {
    SkillDef {
        id: 1,
        name: "Fire".into(),
        power: 30,
        variance: 0,
        ..Default::default()
    }
}
