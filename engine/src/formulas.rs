use crate::Dice;
use crate::battler::Battler;
use crate::database::SkillDef;

pub const CRITICAL_MULTIPLIER: i32 = 3;
pub const CHARGE_MULTIPLIER: i32 = 2;
/// Variance level used by plain attacks and self-destruct (±20%).
pub const ATTACK_VARIANCE: i32 = 4;

/// `value * num / den` computed wide and saturated back into `i32`.
fn scale(value: i32, num: i32, den: i32) -> i32 {
    let wide = i64::from(value) * i64::from(num) / i64::from(den.max(1));
    wide.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Chance in percent that a plain attack lands. Faster targets are harder to hit.
pub fn normal_attack_to_hit(hit_rate: i32, source_agi: i32, target_agi: i32) -> i32 {
    let source_agi = source_agi.max(1);
    let miss = 100 - hit_rate.clamp(0, 100);
    100 - scale(
        miss,
        source_agi.saturating_add(target_agi),
        source_agi.saturating_mul(2),
    )
}

/// Unvaried plain attack damage.
pub fn normal_attack_effect(atk: i32, def: i32) -> i32 {
    (atk / 2 - def / 4).max(0)
}

/// Unvaried self-destruct damage.
pub fn self_destruct_effect(atk: i32, def: i32) -> i32 {
    (atk - def / 2).max(0)
}

/// Unvaried skill effect. Positive skills and `ignore_defense` skip the target's defense.
pub fn skill_effect(skill: &SkillDef, source: &Battler, target: &Battler, positive: bool) -> i32 {
    let mut effect = skill
        .power
        .saturating_add(scale(source.atk(), skill.physical_rate, 20))
        .saturating_add(scale(source.spi(), skill.magical_rate, 40));
    if !positive && !skill.ignore_defense {
        effect = effect
            .saturating_sub(scale(target.def(), skill.physical_rate, 40))
            .saturating_sub(scale(target.spi(), skill.magical_rate, 80));
    }
    effect.max(0)
}

/// Scales `effect` by a roll in `100 ± variance * 5` percent. Zero variance or effect does not roll.
pub fn apply_variance(dice: &mut Dice, effect: i32, variance: i32) -> i32 {
    if effect <= 0 || variance <= 0 {
        return effect;
    }
    let spread = variance.min(10) * 5;
    let percent = dice.roll(100 - spread, 100 + spread);
    scale(effect, percent, 100)
}

/// Defending halves incoming damage.
pub fn adjust_for_defend(effect: i32, target: &Battler) -> i32 {
    if target.is_defending() { effect / 2 } else { effect }
}

/// SP spent by the source to cast `skill`.
pub fn sp_cost(skill: &SkillDef, source: &Battler) -> i32 {
    if skill.sp_percent {
        scale(source.max_sp(), skill.sp_cost, 100)
    } else {
        skill.sp_cost
    }
}

/// Amount restored by a medicine: flat part plus a percentage of the stat's maximum.
pub fn recover_amount(flat: i32, rate: i32, max: i32) -> i32 {
    flat.saturating_add(scale(max, rate, 100))
}
