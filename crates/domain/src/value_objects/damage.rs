//! Damage evaluation: crit doubling, exploding dice, countdown dice

use serde::{Deserialize, Serialize};

use crate::value_objects::dice::{DiceFormula, DiceRollResult};

/// Outcome of one damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRollResult {
    /// The formula actually evaluated (doubled when critical)
    pub formula: String,
    pub total: i32,
    pub is_critical: bool,
    /// Individual die results in roll order
    pub rolls: Vec<i32>,
}

/// Roll a damage formula. On a critical hit every dice term's count is
/// doubled; flat terms stay as declared.
pub fn damage_roll<R>(formula: &DiceFormula, is_critical: bool, rng: R) -> DamageRollResult
where
    R: FnMut(i32, i32) -> i32,
{
    let effective = if is_critical {
        formula.doubled()
    } else {
        formula.clone()
    };
    let result: DiceRollResult = effective.roll(rng);

    DamageRollResult {
        formula: effective.to_string(),
        total: result.total,
        is_critical,
        rolls: result.individual_rolls(),
    }
}

/// Outcome of an exploding-dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplodingRollResult {
    pub total: i32,
    /// All die results including explosion dice, in roll order
    pub rolls: Vec<i32>,
    /// How many extra dice were triggered
    pub explosions: u32,
    /// True when the explosion limit cut the chain short
    pub capped: bool,
}

const EXPLODING_DIE_SIZE: i32 = 6;

/// Roll `count` d6; every 6 triggers one extra d6, recursively.
///
/// `limit` bounds the total number of dice rolled so a hot streak (or a
/// rigged roller) cannot loop forever; when the limit is hit the chain is
/// cut and `capped` is set.
pub fn exploding_dice<R>(count: u32, limit: u32, mut rng: R) -> ExplodingRollResult
where
    R: FnMut(i32, i32) -> i32,
{
    let mut rolls = Vec::new();
    let mut total = 0;
    let mut pending = count.min(limit);
    let mut explosions = 0u32;
    let mut capped = count > limit;

    while pending > 0 {
        pending -= 1;
        let roll = rng(1, EXPLODING_DIE_SIZE);
        total += roll;
        rolls.push(roll);
        if roll == EXPLODING_DIE_SIZE {
            if (rolls.len() as u32) + pending < limit {
                pending += 1;
                explosions += 1;
            } else {
                capped = true;
            }
        }
    }

    ExplodingRollResult {
        total,
        rolls,
        explosions,
        capped,
    }
}

/// Outcome of one countdown roll.
///
/// The engine is stateless: the caller persists `next_die` and passes it
/// back on the next invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownResult {
    /// The roll that was made, if any
    pub roll: Option<i32>,
    /// Die size to persist for the next invocation
    pub next_die: i32,
    pub continues: bool,
    pub ended: bool,
}

/// Roll a decaying countdown die.
///
/// A result of 2 or less shrinks the die: 6 becomes 4, 4 becomes 0 (ended).
/// 3 or more keeps the current size. A die size of 0 or below is terminal
/// and returns ended without rolling.
pub fn countdown_roll<R>(die_size: i32, mut rng: R) -> CountdownResult
where
    R: FnMut(i32, i32) -> i32,
{
    if die_size <= 0 {
        return CountdownResult {
            roll: None,
            next_die: 0,
            continues: false,
            ended: true,
        };
    }

    let roll = rng(1, die_size);
    if roll <= 2 {
        let next_die = if die_size > 4 { 4 } else { 0 };
        CountdownResult {
            roll: Some(roll),
            next_die,
            continues: next_die > 0,
            ended: next_die == 0,
        }
    } else {
        CountdownResult {
            roll: Some(roll),
            next_die: die_size,
            continues: true,
            ended: false,
        }
    }
}
