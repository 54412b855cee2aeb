//! Dice formula parsing and evaluation
//!
//! Supports additive formulas like "1d20+5", "2d6+1d4+3", "1d8-1".
//! Parsing is manual to keep regex out of the domain layer. Evaluation
//! takes the RNG as a closure so the domain stays deterministic under test:
//! `formula.roll(|min, max| ...)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY terms and flat integers joined by +/-
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
    /// Dice terms cannot be subtracted
    #[error("Dice terms cannot be negative: {0}")]
    NegativeDiceTerm(String),
    /// Flat modifiers summed past the representable range
    #[error("Modifier overflow in dice formula")]
    ModifierOverflow,
}

/// One `XdY` term in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceTerm {
    /// Number of dice to roll (X in XdY)
    pub count: u8,
    /// Size of each die (Y in XdY)
    pub size: u8,
}

impl DiceTerm {
    pub fn new(count: u8, size: u8) -> Result<Self, DiceParseError> {
        if count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self { count, size })
    }

    /// The same term with its dice count doubled (critical hits).
    pub fn doubled(self) -> Self {
        Self {
            count: self.count.saturating_mul(2),
            size: self.size,
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.size)
    }
}

/// A parsed dice formula like "2d6+1d4+3".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// The dice terms, in declaration order
    pub terms: Vec<DiceTerm>,
    /// Net flat modifier added after all dice
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(terms: Vec<DiceTerm>, modifier: i32) -> Self {
        Self { terms, modifier }
    }

    /// A single-term formula (the common case).
    pub fn single(count: u8, size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        Ok(Self {
            terms: vec![DiceTerm::new(count, size)?],
            modifier,
        })
    }

    /// Parse a dice formula string.
    ///
    /// Supported pieces, joined by `+` or `-`:
    /// - "XdY" - roll X dice of size Y ("dY" means "1dY")
    /// - "Z"   - a flat integer
    ///
    /// Dice terms must be additive; "-1d4" is rejected.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let mut terms = Vec::new();
        let mut modifier: i32 = 0;
        let mut saw_dice = false;

        // Split into signed tokens by scanning for +/- separators.
        let mut rest = input.as_str();
        let mut sign: i32 = 1;
        while !rest.is_empty() {
            let end = rest
                .char_indices()
                .skip(1)
                .find(|(_, c)| *c == '+' || *c == '-')
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let (token, tail) = rest.split_at(end);
            let token = token.trim();

            if token.is_empty() {
                return Err(DiceParseError::InvalidFormat(input.clone()));
            }

            if let Some(d_pos) = token.find('d') {
                if sign < 0 {
                    return Err(DiceParseError::NegativeDiceTerm(token.to_string()));
                }
                let count_str = &token[..d_pos];
                let count: u8 = if count_str.is_empty() {
                    1 // "d20" means "1d20"
                } else {
                    count_str
                        .parse()
                        .map_err(|_| DiceParseError::InvalidFormat(token.to_string()))?
                };
                let size: u8 = token[d_pos + 1..]
                    .parse()
                    .map_err(|_| DiceParseError::InvalidFormat(token.to_string()))?;
                terms.push(DiceTerm::new(count, size)?);
                saw_dice = true;
            } else {
                let flat: i32 = token
                    .parse()
                    .map_err(|_| DiceParseError::InvalidFormat(token.to_string()))?;
                modifier = flat
                    .checked_mul(sign)
                    .and_then(|signed| modifier.checked_add(signed))
                    .ok_or(DiceParseError::ModifierOverflow)?;
            }

            if tail.is_empty() {
                break;
            }
            sign = if tail.starts_with('-') { -1 } else { 1 };
            rest = &tail[1..];
        }

        if !saw_dice {
            return Err(DiceParseError::InvalidFormat(input));
        }

        Ok(Self { terms, modifier })
    }

    /// The same formula with every dice term doubled; flat terms untouched.
    pub fn doubled(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|t| t.doubled()).collect(),
            modifier: self.modifier,
        }
    }

    /// Roll the formula. The closure receives an inclusive (min, max) range
    /// and must return a value inside it.
    pub fn roll<R>(&self, mut rng: R) -> DiceRollResult
    where
        R: FnMut(i32, i32) -> i32,
    {
        let mut term_rolls = Vec::with_capacity(self.terms.len());
        let mut dice_total: i32 = 0;

        for term in &self.terms {
            let mut rolls = Vec::with_capacity(term.count as usize);
            for _ in 0..term.count {
                let roll = rng(1, term.size as i32);
                dice_total += roll;
                rolls.push(roll);
            }
            term_rolls.push(TermRoll { term: *term, rolls });
        }

        DiceRollResult {
            formula: self.clone(),
            term_rolls,
            dice_total,
            modifier_applied: self.modifier,
            total: dice_total + self.modifier,
        }
    }

    /// Get the minimum possible roll
    pub fn min_roll(&self) -> i32 {
        self.terms.iter().map(|t| t.count as i32).sum::<i32>() + self.modifier
    }

    /// Get the maximum possible roll
    pub fn max_roll(&self) -> i32 {
        self.terms
            .iter()
            .map(|t| t.count as i32 * t.size as i32)
            .sum::<i32>()
            + self.modifier
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", term)?;
        }
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

/// The individual die results for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRoll {
    pub term: DiceTerm,
    pub rolls: Vec<i32>,
}

/// Result of rolling a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    /// The formula that was rolled
    pub formula: DiceFormula,
    /// Individual die results, grouped by term
    pub term_rolls: Vec<TermRoll>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// Modifier that was applied
    pub modifier_applied: i32,
    /// Final total (dice_total + modifier)
    pub total: i32,
}

impl DiceRollResult {
    /// All individual die results, flattened in roll order.
    pub fn individual_rolls(&self) -> Vec<i32> {
        self.term_rolls
            .iter()
            .flat_map(|t| t.rolls.iter().copied())
            .collect()
    }

    /// Format as a breakdown string (e.g., "2d6[4, 5] + 3 = 12").
    pub fn breakdown(&self) -> String {
        let mut out = String::new();
        for (i, term_roll) in self.term_rolls.iter().enumerate() {
            if i > 0 {
                out.push_str(" + ");
            }
            let rolls: Vec<String> = term_roll.rolls.iter().map(|r| r.to_string()).collect();
            out.push_str(&format!("{}[{}]", term_roll.term, rolls.join(", ")));
        }
        if self.modifier_applied > 0 {
            out.push_str(&format!(" + {}", self.modifier_applied));
        } else if self.modifier_applied < 0 {
            out.push_str(&format!(" - {}", -self.modifier_applied));
        }
        out.push_str(&format!(" = {}", self.total));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Roller that returns scripted values in order.
    fn scripted(values: Vec<i32>) -> impl FnMut(i32, i32) -> i32 {
        let mut values = values.into_iter();
        move |min, max| {
            let v = values.next().expect("script exhausted");
            assert!(v >= min && v <= max, "scripted value out of range");
            v
        }
    }

    #[test]
    fn parse_simple_d20() {
        let formula = DiceFormula::parse("1d20").unwrap();
        assert_eq!(formula.terms, vec![DiceTerm::new(1, 20).unwrap()]);
        assert_eq!(formula.modifier, 0);
    }

    #[test]
    fn parse_shorthand_d20() {
        let formula = DiceFormula::parse("d20").unwrap();
        assert_eq!(formula.terms[0].count, 1);
        assert_eq!(formula.terms[0].size, 20);
    }

    #[test]
    fn parse_with_positive_and_negative_modifiers() {
        let formula = DiceFormula::parse("1d20+5-2").unwrap();
        assert_eq!(formula.modifier, 3);
    }

    #[test]
    fn parse_multiple_dice_terms() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        assert_eq!(
            formula.terms,
            vec![DiceTerm::new(2, 6).unwrap(), DiceTerm::new(1, 4).unwrap()]
        );
        assert_eq!(formula.modifier, 3);
    }

    #[test]
    fn parse_case_insensitive_and_whitespace() {
        let formula = DiceFormula::parse("  2D6 + 3 ").unwrap();
        assert_eq!(formula.terms[0].size, 6);
        assert_eq!(formula.modifier, 3);
    }

    #[test]
    fn parse_empty_is_rejected() {
        assert!(matches!(DiceFormula::parse(""), Err(DiceParseError::Empty)));
    }

    #[test]
    fn parse_rejects_flat_only() {
        assert!(matches!(
            DiceFormula::parse("20"),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_zero_dice_and_tiny_dies() {
        assert!(matches!(
            DiceFormula::parse("0d20"),
            Err(DiceParseError::InvalidDiceCount)
        ));
        assert!(matches!(
            DiceFormula::parse("1d1"),
            Err(DiceParseError::InvalidDieSize)
        ));
    }

    #[test]
    fn parse_rejects_overflowing_modifiers() {
        assert!(matches!(
            DiceFormula::parse("1d6+2000000000+2000000000"),
            Err(DiceParseError::ModifierOverflow)
        ));
        assert!(matches!(
            DiceFormula::parse("1d6-2000000000-2000000000"),
            Err(DiceParseError::ModifierOverflow)
        ));
        // Large but representable totals still parse.
        assert_eq!(
            DiceFormula::parse("1d6+2000000000-2000000000")
                .unwrap()
                .modifier,
            0
        );
    }

    #[test]
    fn parse_rejects_negative_dice_terms() {
        assert!(matches!(
            DiceFormula::parse("1d8-1d4"),
            Err(DiceParseError::NegativeDiceTerm(_))
        ));
    }

    #[test]
    fn doubled_doubles_dice_not_flats() {
        let formula = DiceFormula::parse("2d6+3").unwrap();
        let crit = formula.doubled();
        assert_eq!(crit.to_string(), "4d6+3");
    }

    #[test]
    fn doubled_doubles_every_term() {
        let formula = DiceFormula::parse("1d8+2d4+1").unwrap();
        assert_eq!(formula.doubled().to_string(), "2d8+4d4+1");
    }

    #[test]
    fn roll_sums_terms_and_modifier() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        let result = formula.roll(scripted(vec![4, 5, 2]));
        assert_eq!(result.dice_total, 11);
        assert_eq!(result.total, 14);
        assert_eq!(result.individual_rolls(), vec![4, 5, 2]);
    }

    #[test]
    fn roll_range_bounds() {
        let formula = DiceFormula::parse("2d6+3").unwrap();
        assert_eq!(formula.min_roll(), 5);
        assert_eq!(formula.max_roll(), 15);
    }

    #[test]
    fn breakdown_formats_terms_and_modifier() {
        let formula = DiceFormula::parse("2d6+3").unwrap();
        let result = formula.roll(scripted(vec![4, 5]));
        assert_eq!(result.breakdown(), "2d6[4, 5] + 3 = 12");
    }

    #[test]
    fn display_round_trips() {
        for text in ["1d20", "2d6+3", "1d8+2d4-1"] {
            let formula = DiceFormula::parse(text).unwrap();
            assert_eq!(formula.to_string(), text);
        }
    }
}
