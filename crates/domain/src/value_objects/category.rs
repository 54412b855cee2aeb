//! Roll categories and favor/hinder signals
//!
//! Favor and hinder are boolean flags scoped to a roll category: one skill,
//! the generic attack category, or one save type. On the wire they are
//! dot-path keys (`favor.skills.stealth`, `hinder.attacks`,
//! `favor.saves.will`); internally they are a closed tagged type so the
//! resolver can match exhaustively instead of re-interpolating strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::keys::{SaveType, SkillId};

/// The category a check belongs to, used to scope favor/hinder signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RollCategory {
    Skill { id: SkillId },
    Attack,
    Save { save: SaveType },
}

impl RollCategory {
    pub fn skill(id: SkillId) -> Self {
        Self::Skill { id }
    }

    pub fn save(save: SaveType) -> Self {
        Self::Save { save }
    }

    /// The category's wire path segment (`skills.<id>`, `attacks`, `saves.<type>`).
    fn path_segment(&self) -> String {
        match self {
            Self::Skill { id } => format!("skills.{}", id),
            Self::Attack => "attacks".to_string(),
            Self::Save { save } => format!("saves.{}", save),
        }
    }
}

impl fmt::Display for RollCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Which way a signal pushes the roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Favor,
    Hinder,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favor => "favor",
            Self::Hinder => "hinder",
        }
    }
}

/// A favor or hinder flag scoped to one roll category.
///
/// Signals have no lifecycle of their own: they are parsed out of applied
/// modifier changes on every read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasSignal {
    pub polarity: Polarity,
    pub category: RollCategory,
}

impl BiasSignal {
    pub fn new(polarity: Polarity, category: RollCategory) -> Self {
        Self { polarity, category }
    }

    /// Render as the wire dot-path (`favor.skills.stealth`).
    pub fn to_key(&self) -> String {
        format!("{}.{}", self.polarity.as_str(), self.category)
    }

    /// Parse a wire dot-path into a signal.
    ///
    /// Returns `Ok(None)` for keys that are simply not in the favor/hinder
    /// namespace (most modifier keys); `Err` for keys that start a
    /// favor/hinder path but are malformed.
    pub fn parse_key(key: &str) -> Result<Option<Self>, DomainError> {
        let (polarity, rest) = if let Some(rest) = key.strip_prefix("favor.") {
            (Polarity::Favor, rest)
        } else if let Some(rest) = key.strip_prefix("hinder.") {
            (Polarity::Hinder, rest)
        } else {
            return Ok(None);
        };

        let category = if rest == "attacks" {
            RollCategory::Attack
        } else if let Some(skill) = rest.strip_prefix("skills.") {
            RollCategory::Skill {
                id: SkillId::new(skill)
                    .map_err(|_| DomainError::parse(format!("Bad signal key: {}", key)))?,
            }
        } else if let Some(save) = rest.strip_prefix("saves.") {
            RollCategory::Save {
                save: save
                    .parse()
                    .map_err(|_| DomainError::parse(format!("Bad signal key: {}", key)))?,
            }
        } else {
            return Err(DomainError::parse(format!("Bad signal key: {}", key)));
        };

        Ok(Some(Self { polarity, category }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_keys_round_trip() {
        let keys = [
            "favor.skills.stealth",
            "hinder.attacks",
            "favor.saves.will",
            "hinder.saves.body",
        ];
        for key in keys {
            let signal = BiasSignal::parse_key(key).unwrap().expect("signal key");
            assert_eq!(signal.to_key(), key);
        }
    }

    #[test]
    fn non_signal_keys_parse_to_none() {
        assert_eq!(BiasSignal::parse_key("stats.might").unwrap(), None);
        assert_eq!(BiasSignal::parse_key("resources.mana").unwrap(), None);
    }

    #[test]
    fn malformed_signal_keys_error() {
        assert!(BiasSignal::parse_key("favor.luck").is_err());
        assert!(BiasSignal::parse_key("hinder.saves.luck").is_err());
        assert!(BiasSignal::parse_key("favor.skills.").is_err());
    }

    #[test]
    fn skill_categories_match_on_exact_id() {
        let stealth = RollCategory::skill(SkillId::new("stealth").unwrap());
        let lore = RollCategory::skill(SkillId::new("lore").unwrap());
        assert_ne!(stealth, lore);
        assert_eq!(
            stealth,
            RollCategory::skill(SkillId::new("stealth").unwrap())
        );
    }
}
