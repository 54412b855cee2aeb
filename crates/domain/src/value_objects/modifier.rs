//! Modifier descriptors - the declarative changes a grant makes to a character
//!
//! A grant (class feature, perk, ancestry trait, equipment) declares its
//! mechanical effects as a list of `ModifierDescriptor`s: a dot-path into
//! character state, a combination mode, and a string value. Descriptors are
//! immutable once declared; the effect synchronizer copies them into applied
//! modifiers, and readers fold them over base values with `apply_changes`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// How a modifier value combines with the value already at its key.
///
/// The discriminants are the wire encoding and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ModifierMode {
    /// Host-interpreted; ignored by the numeric fold
    Custom = 0,
    Multiply = 1,
    Add = 2,
    /// Keep the lower of current and value
    Downgrade = 3,
    /// Keep the higher of current and value
    Upgrade = 4,
    Override = 5,
}

impl ModifierMode {
    /// Default application priority when a descriptor declares none.
    ///
    /// Matches the wire convention: mode discriminant x 10, so overrides
    /// land after additive and multiplicative changes.
    pub fn default_priority(&self) -> i32 {
        (*self as i32) * 10
    }
}

impl From<ModifierMode> for u8 {
    fn from(mode: ModifierMode) -> u8 {
        mode as u8
    }
}

impl TryFrom<u8> for ModifierMode {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Custom),
            1 => Ok(Self::Multiply),
            2 => Ok(Self::Add),
            3 => Ok(Self::Downgrade),
            4 => Ok(Self::Upgrade),
            5 => Ok(Self::Override),
            other => Err(DomainError::parse(format!(
                "Unknown modifier mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ModifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Custom => "custom",
            Self::Multiply => "multiply",
            Self::Add => "add",
            Self::Downgrade => "downgrade",
            Self::Upgrade => "upgrade",
            Self::Override => "override",
        };
        write!(f, "{}", name)
    }
}

/// A single declared change to character state.
///
/// This is a data-carrying struct with no invariants to protect beyond what
/// the key/value consumers enforce; any combination of values is storable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierDescriptor {
    /// Dot-path into character state (e.g., "stats.might", "favor.skills.stealth")
    pub key: String,
    /// How the value combines with whatever is already at the key
    pub mode: ModifierMode,
    /// The value, stringly typed on the wire; numeric consumers parse it
    pub value: String,
    /// Application order; lower applies first. None = mode default.
    pub priority: Option<i32>,
}

impl ModifierDescriptor {
    pub fn new(key: impl Into<String>, mode: ModifierMode, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mode,
            value: value.into(),
            priority: None,
        }
    }

    /// Shorthand for a flat additive numeric change.
    pub fn add(key: impl Into<String>, amount: i32) -> Self {
        Self::new(key, ModifierMode::Add, amount.to_string())
    }

    /// Shorthand for an override change.
    pub fn override_with(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, ModifierMode::Override, value)
    }

    /// Shorthand for a boolean flag set to true (favor/hinder signals).
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, ModifierMode::Override, "true")
    }

    /// Effective application priority.
    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| self.mode.default_priority())
    }

    /// The value parsed as an integer, if it is one.
    pub fn numeric_value(&self) -> Option<i32> {
        self.value.trim().parse().ok()
    }
}

/// Fold a set of descriptors over a numeric base value.
///
/// Descriptors are applied in priority order (stable for ties). Non-numeric
/// values and `Custom` changes are skipped: they are host concerns, not
/// arithmetic ones.
pub fn apply_changes(base: i32, changes: &[&ModifierDescriptor]) -> i32 {
    let mut ordered: Vec<&ModifierDescriptor> = changes.to_vec();
    ordered.sort_by_key(|c| c.priority());

    ordered.into_iter().fold(base, |current, change| {
        let Some(value) = change.numeric_value() else {
            return current;
        };
        match change.mode {
            ModifierMode::Custom => current,
            ModifierMode::Multiply => current.saturating_mul(value),
            ModifierMode::Add => current.saturating_add(value),
            ModifierMode::Downgrade => current.min(value),
            ModifierMode::Upgrade => current.max(value),
            ModifierMode::Override => value,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_wire_numbering_is_stable() {
        assert_eq!(u8::from(ModifierMode::Custom), 0);
        assert_eq!(u8::from(ModifierMode::Multiply), 1);
        assert_eq!(u8::from(ModifierMode::Add), 2);
        assert_eq!(u8::from(ModifierMode::Downgrade), 3);
        assert_eq!(u8::from(ModifierMode::Upgrade), 4);
        assert_eq!(u8::from(ModifierMode::Override), 5);
    }

    #[test]
    fn mode_try_from_rejects_out_of_range() {
        assert!(ModifierMode::try_from(6).is_err());
        assert_eq!(ModifierMode::try_from(2).unwrap(), ModifierMode::Add);
    }

    #[test]
    fn add_then_multiply_applies_in_priority_order() {
        // Multiply (prio 10) before Add (prio 20): (4 * 2) + 3 = 11
        let mul = ModifierDescriptor::new("stats.might", ModifierMode::Multiply, "2");
        let add = ModifierDescriptor::add("stats.might", 3);
        assert_eq!(apply_changes(4, &[&add, &mul]), 11);
    }

    #[test]
    fn explicit_priority_beats_mode_default() {
        let mut mul = ModifierDescriptor::new("stats.might", ModifierMode::Multiply, "2");
        mul.priority = Some(99); // after the add now
        let add = ModifierDescriptor::add("stats.might", 3);
        assert_eq!(apply_changes(4, &[&add, &mul]), 14);
    }

    #[test]
    fn override_wins_over_earlier_changes() {
        let add = ModifierDescriptor::add("crit.threshold", -1);
        let over = ModifierDescriptor::override_with("crit.threshold", "19");
        assert_eq!(apply_changes(20, &[&add, &over]), 19);
    }

    #[test]
    fn upgrade_and_downgrade_clamp() {
        let up = ModifierDescriptor::new("stats.grit", ModifierMode::Upgrade, "5");
        assert_eq!(apply_changes(3, &[&up]), 5);
        assert_eq!(apply_changes(8, &[&up]), 8);

        let down = ModifierDescriptor::new("crit.threshold", ModifierMode::Downgrade, "19");
        assert_eq!(apply_changes(20, &[&down]), 19);
        assert_eq!(apply_changes(18, &[&down]), 18);
    }

    #[test]
    fn non_numeric_and_custom_changes_are_skipped() {
        let flag = ModifierDescriptor::flag("favor.attacks");
        let custom = ModifierDescriptor::new("stats.might", ModifierMode::Custom, "7");
        assert_eq!(apply_changes(4, &[&flag, &custom]), 4);
    }

    #[test]
    fn descriptor_serde_uses_camel_case() {
        let d = ModifierDescriptor::add("stats.might", 1);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"key\""));
        assert!(json.contains("\"mode\":\"add\""));
    }
}
