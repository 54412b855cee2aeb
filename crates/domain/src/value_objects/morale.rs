//! Morale checks for non-player combatants
//!
//! Morale is a 2d6-under check: roll at or below the morale score to hold.
//! Group morale uses the weakest member's score as the shared threshold for
//! one roll. Marking a failed subject as broken is the caller's job.

use serde::{Deserialize, Serialize};

/// Outcome of one morale check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoraleResult {
    /// The score the roll was compared against
    pub threshold: i32,
    pub rolls: Vec<i32>,
    pub total: i32,
    /// Total at or below threshold
    pub passed: bool,
}

const MORALE_DICE: u32 = 2;
const MORALE_DIE_SIZE: i32 = 6;

/// Roll morale for a single subject.
pub fn roll_morale<R>(morale_score: i32, mut rng: R) -> MoraleResult
where
    R: FnMut(i32, i32) -> i32,
{
    let rolls: Vec<i32> = (0..MORALE_DICE).map(|_| rng(1, MORALE_DIE_SIZE)).collect();
    let total = rolls.iter().sum();

    MoraleResult {
        threshold: morale_score,
        rolls,
        total,
        passed: total <= morale_score,
    }
}

/// Roll one shared morale check for a group, using the lowest score.
///
/// Returns `None` for an empty group: there is nobody to break.
pub fn roll_group_morale<R>(morale_scores: &[i32], rng: R) -> Option<MoraleResult>
where
    R: FnMut(i32, i32) -> i32,
{
    let weakest = *morale_scores.iter().min()?;
    Some(roll_morale(weakest, rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(values: Vec<i32>) -> impl FnMut(i32, i32) -> i32 {
        let mut values = values.into_iter();
        move |min, max| {
            let v = values.next().expect("script exhausted");
            assert!(v >= min && v <= max, "scripted value out of range");
            v
        }
    }

    #[test]
    fn total_at_or_below_score_passes() {
        let result = roll_morale(7, scripted(vec![3, 4]));
        assert_eq!(result.total, 7);
        assert!(result.passed);
    }

    #[test]
    fn total_above_score_fails() {
        let result = roll_morale(7, scripted(vec![4, 4]));
        assert_eq!(result.total, 8);
        assert!(!result.passed);
    }

    #[test]
    fn group_uses_weakest_score() {
        let result = roll_group_morale(&[9, 7, 12], scripted(vec![4, 4])).unwrap();
        assert_eq!(result.threshold, 7);
        assert!(!result.passed);
    }

    #[test]
    fn empty_group_has_no_check() {
        assert!(roll_group_morale(&[], |_, _| panic!("must not roll")).is_none());
    }
}
