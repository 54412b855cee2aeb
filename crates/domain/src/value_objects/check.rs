//! d20 check evaluation
//!
//! A check rolls one base die, optionally adds or subtracts one bias die
//! (favor/hinder), applies a flat modifier, and compares against a
//! difficulty. Critical and fumble classification comes from the natural
//! base die alone: bias and modifier never influence it.

use serde::{Deserialize, Serialize};

/// Net favor/hinder bias for one roll. Always in {-1, 0, +1}.
pub type Bias = i32;

/// Inputs to a single d20 check.
///
/// `crit_threshold` is expected to already be clamped to [1, 20] by the
/// caller; out-of-range values are a caller error. `difficulty` is
/// unrestricted (negative values guarantee success).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInput {
    pub difficulty: i32,
    pub crit_threshold: i32,
    /// Net bias in {-1, 0, +1}; positive adds a bias die, negative subtracts one
    pub bias: Bias,
    /// Flat modifier added to the total
    pub modifier: i32,
    /// Size of the base die (20 in the standard rules)
    pub check_die: i32,
    /// Size of the favor/hinder die (6 in the standard rules)
    pub favor_die: i32,
}

impl CheckInput {
    pub fn new(difficulty: i32, crit_threshold: i32, bias: Bias, modifier: i32) -> Self {
        Self {
            difficulty,
            crit_threshold,
            bias,
            modifier,
            check_die: 20,
            favor_die: 6,
        }
    }

    /// Evaluate the check. The closure receives an inclusive (min, max)
    /// range and must return a value inside it; the base die is rolled
    /// first, then the bias die if any.
    pub fn resolve<R>(&self, mut rng: R) -> CheckRollResult
    where
        R: FnMut(i32, i32) -> i32,
    {
        let natural_die = rng(1, self.check_die);

        let bias_die = match self.bias.signum() {
            1 => Some(rng(1, self.favor_die)),
            -1 => Some(-rng(1, self.favor_die)),
            _ => None,
        };

        let total = natural_die + bias_die.unwrap_or(0) + self.modifier;

        CheckRollResult {
            formula: self.formula(),
            total,
            natural_die,
            bias_die,
            success: total >= self.difficulty,
            is_critical: natural_die >= self.crit_threshold,
            is_fumble: natural_die == 1,
            difficulty: self.difficulty,
            crit_threshold: self.crit_threshold,
        }
    }

    /// The formula string this check evaluates (e.g., "1d20+1d6+3").
    fn formula(&self) -> String {
        let mut out = format!("1d{}", self.check_die);
        match self.bias.signum() {
            1 => out.push_str(&format!("+1d{}", self.favor_die)),
            -1 => out.push_str(&format!("-1d{}", self.favor_die)),
            _ => {}
        }
        if self.modifier > 0 {
            out.push_str(&format!("+{}", self.modifier));
        } else if self.modifier < 0 {
            out.push_str(&format!("{}", self.modifier));
        }
        out
    }
}

/// Outcome of one d20 check. Immutable; handed to presentation as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRollResult {
    /// The formula that was evaluated
    pub formula: String,
    /// Final total including bias die and modifier
    pub total: i32,
    /// The base die's own result, untouched by bias or modifier
    pub natural_die: i32,
    /// The bias die's result, sign-matched to the bias direction; None when bias = 0
    pub bias_die: Option<i32>,
    /// Whether total met or exceeded difficulty
    pub success: bool,
    /// Natural die at or above the crit threshold, regardless of success
    pub is_critical: bool,
    /// Natural 1 on the base die
    pub is_fumble: bool,
    pub difficulty: i32,
    pub crit_threshold: i32,
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
    fn plain_check_success() {
        let result = CheckInput::new(15, 20, 0, 3).resolve(scripted(vec![14]));
        assert_eq!(result.total, 17);
        assert!(result.success);
        assert!(!result.is_critical);
        assert!(!result.is_fumble);
        assert_eq!(result.bias_die, None);
        assert_eq!(result.formula, "1d20+3");
    }

    #[test]
    fn favor_adds_a_bias_die() {
        let result = CheckInput::new(15, 20, 1, 0).resolve(scripted(vec![10, 4]));
        assert_eq!(result.bias_die, Some(4));
        assert_eq!(result.total, 14);
        assert!(!result.success);
        assert_eq!(result.formula, "1d20+1d6");
    }

    #[test]
    fn hinder_subtracts_a_bias_die() {
        let result = CheckInput::new(10, 20, -1, 2).resolve(scripted(vec![12, 5]));
        assert_eq!(result.bias_die, Some(-5));
        assert_eq!(result.total, 9);
        assert!(!result.success);
        assert_eq!(result.formula, "1d20-1d6+2");
    }

    #[test]
    fn natural_twenty_is_critical_even_when_check_fails() {
        // Heavy hinder and penalty: total fails but the natural die crits.
        let result = CheckInput::new(15, 20, -1, -5).resolve(scripted(vec![20, 6]));
        assert!(result.is_critical);
        assert!(!result.success);
        assert_eq!(result.total, 9);
    }

    #[test]
    fn lowered_crit_threshold_crits_on_nineteen() {
        let result = CheckInput::new(10, 19, 0, 0).resolve(scripted(vec![19]));
        assert!(result.is_critical);
    }

    #[test]
    fn natural_one_is_a_fumble_even_when_total_succeeds() {
        let result = CheckInput::new(5, 20, 0, 10).resolve(scripted(vec![1]));
        assert!(result.is_fumble);
        assert!(result.success);
    }

    #[test]
    fn difficulty_below_the_minimum_total_always_succeeds() {
        // Worst case: natural 1 with a -10 penalty totals -9.
        let result = CheckInput::new(-9, 20, 0, -10).resolve(scripted(vec![1]));
        assert_eq!(result.total, -9);
        assert!(result.success);
        assert!(result.is_fumble);
    }

    #[test]
    fn exact_difficulty_succeeds() {
        let result = CheckInput::new(12, 20, 0, 0).resolve(scripted(vec![12]));
        assert!(result.success);
    }
}
