//! Validated key newtypes for rules lookups
//!
//! Skills and features are content-defined, so their identifiers are slugs
//! rather than UUIDs. These newtypes ensure keys are valid by construction:
//! non-empty, trimmed, lowercase, and free of path separators (keys are
//! embedded in dot-path modifier keys, so a `.` inside one would corrupt
//! the path).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

const MAX_KEY_LENGTH: usize = 64;

fn validate_slug(kind: &'static str, raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} key cannot be empty", kind)));
    }
    if trimmed.len() > MAX_KEY_LENGTH {
        return Err(DomainError::validation(format!(
            "{} key cannot exceed {} characters",
            kind, MAX_KEY_LENGTH
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::validation(format!(
            "{} key '{}' may only contain alphanumerics, '_' and '-'",
            kind, trimmed
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

// ============================================================================
// SkillId
// ============================================================================

/// A validated skill identifier (e.g., "stealth", "lore").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillId(String);

impl SkillId {
    /// Create a new validated skill id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the key is empty, too long, or
    /// contains characters outside `[a-z0-9_-]`.
    pub fn new(key: impl AsRef<str>) -> Result<Self, DomainError> {
        validate_slug("Skill", key.as_ref()).map(Self)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SkillId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SkillId> for String {
    fn from(id: SkillId) -> String {
        id.0
    }
}

// ============================================================================
// FeatureId
// ============================================================================

/// A validated feature identifier within a grant (e.g., "rage", "mana_pool_2").
///
/// Together with the grant's `GrantId` this forms the composite identity of
/// an applied modifier; see `EffectKey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureId(String);

impl FeatureId {
    /// Create a new validated feature id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the key is empty, too long, or
    /// contains characters outside `[a-z0-9_-]`.
    pub fn new(key: impl AsRef<str>) -> Result<Self, DomainError> {
        validate_slug("Feature", key.as_ref()).map(Self)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FeatureId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FeatureId> for String {
    fn from(id: FeatureId) -> String {
        id.0
    }
}

// ============================================================================
// SaveType
// ============================================================================

/// The three saving-throw categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveType {
    Body,
    Reflex,
    Will,
}

impl SaveType {
    /// All save types, in sheet order.
    pub const ALL: [SaveType; 3] = [SaveType::Body, SaveType::Reflex, SaveType::Will];

    /// Wire key used inside favor/hinder paths (`saves.<key>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Reflex => "reflex",
            Self::Will => "will",
        }
    }
}

impl fmt::Display for SaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SaveType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body" => Ok(Self::Body),
            "reflex" => Ok(Self::Reflex),
            "will" => Ok(Self::Will),
            _ => Err(DomainError::parse(format!("Unknown save type: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_id_lowercases_and_trims() {
        let id = SkillId::new("  Stealth ").unwrap();
        assert_eq!(id.as_str(), "stealth");
    }

    #[test]
    fn skill_id_rejects_empty() {
        assert!(SkillId::new("   ").is_err());
    }

    #[test]
    fn skill_id_rejects_path_separators() {
        assert!(SkillId::new("favor.skills").is_err());
        assert!(SkillId::new("two words").is_err());
    }

    #[test]
    fn feature_id_allows_underscores_and_hyphens() {
        assert!(FeatureId::new("mana_pool-2").is_ok());
    }

    #[test]
    fn save_type_round_trips_through_str() {
        for save in SaveType::ALL {
            let parsed: SaveType = save.as_str().parse().unwrap();
            assert_eq!(parsed, save);
        }
    }

    #[test]
    fn save_type_rejects_unknown() {
        assert!("luck".parse::<SaveType>().is_err());
    }

    #[test]
    fn skill_id_serde_round_trip() {
        let id = SkillId::new("lore").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lore\"");
        let back: SkillId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
