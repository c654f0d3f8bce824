use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod algorithm;
pub mod api;
pub mod battle;
pub mod battler;
pub mod content;
pub mod database;
pub mod formulas;
pub mod party;

pub use algorithm::{
    Action, ActionType, AlgorithmBase, AttributeEffect, Pose, StateEffect, StateEffectKind,
    TargetSpec,
};
pub use battle::{Battle, Inventory, Switches};
pub use battler::{BaseStats, Battler, Stat};
pub use database::{Database, EngineError, ItemDef, SkillDef, StatLimits, StateDef};
pub use party::{BattlerId, Party, Side};

enum RollSource {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<i32>, next: usize },
}

/// Source of every random decision an action makes.
pub struct Dice {
    source: RollSource,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RollSource::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Replays `values` in order (wrapping around), each clamped into the requested range.
    pub fn from_scripted(values: Vec<i32>) -> Self {
        Self {
            source: RollSource::Scripted { values, next: 0 },
        }
    }

    /// Inclusive roll in `lo..=hi`.
    pub fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match &mut self.source {
            RollSource::Seeded(rng) => rng.gen_range(lo..=hi),
            RollSource::Scripted { values, next } => {
                if values.is_empty() {
                    return lo;
                }
                let value = values[*next % values.len()];
                *next += 1;
                value.clamp(lo, hi)
            }
        }
    }

    /// Percent chance. Certain and impossible outcomes do not consume a roll.
    pub fn percent(&mut self, chance: i32) -> bool {
        if chance >= 100 {
            return true;
        }
        if chance <= 0 {
            return false;
        }
        self.roll(0, 99) < chance
    }
}

/// Install the fmt subscriber used by the command line harness.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_rolls_wrap_and_clamp() {
        let mut dice = Dice::from_scripted(vec![5, 500]);
        assert_eq!(dice.roll(0, 99), 5);
        assert_eq!(dice.roll(0, 99), 99);
        assert_eq!(dice.roll(80, 120), 80);
    }

    #[test]
    fn certain_chances_do_not_consume_rolls() {
        let mut dice = Dice::from_scripted(vec![10, 90]);
        assert!(dice.percent(100));
        assert!(!dice.percent(0));
        assert!(dice.percent(50));
        assert!(!dice.percent(50));
    }

    #[test]
    fn seeded_rolls_are_deterministic() {
        let mut a = Dice::from_seed(7);
        let mut b = Dice::from_seed(7);
        for _ in 0..16 {
            let x = a.roll(1, 20);
            assert_eq!(x, b.roll(1, 20));
            assert!((1..=20).contains(&x));
        }
    }
}
