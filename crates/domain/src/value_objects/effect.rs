//! Applied modifiers - persistent effects derived from grants
//!
//! An applied modifier is the persistent record that a grant feature is
//! currently affecting a character. It carries a copy of the feature's
//! modifier descriptors plus the composite identity `(origin, feature)`
//! that makes synchronization idempotent: at most one applied modifier may
//! exist per key, and re-running synchronization never duplicates one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{EffectId, GrantId};
use crate::value_objects::category::BiasSignal;
use crate::value_objects::keys::FeatureId;
use crate::value_objects::modifier::ModifierDescriptor;

/// What kind of grant produced an applied modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Class,
    Perk,
    Ancestry,
    Equipment,
}

impl SourceKind {
    /// Equipment effects follow equip state; everything else is always-on.
    pub fn is_equippable(&self) -> bool {
        matches!(self, Self::Equipment)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Perk => "perk",
            Self::Ancestry => "ancestry",
            Self::Equipment => "equipment",
        };
        write!(f, "{}", name)
    }
}

/// Composite identity of an applied modifier: which grant instance created
/// it, and which feature of that grant it represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectKey {
    pub origin: GrantId,
    pub feature: FeatureId,
}

impl EffectKey {
    pub fn new(origin: GrantId, feature: FeatureId) -> Self {
        Self { origin, feature }
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.origin, self.feature)
    }
}

/// Provenance tags carried for display and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectTags {
    pub source_kind: SourceKind,
    /// Display name of the grant (e.g., "Duelist", "Lantern Shield")
    pub source_name: String,
}

/// A persistent modifier bundle currently attached to a character.
///
/// Created, disabled, and deleted exclusively by the effect synchronizer;
/// read by the resolver and the roll pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedModifier {
    pub id: EffectId,
    /// Display name (usually the feature name)
    pub name: String,
    /// Icon path for sheet display
    pub icon: Option<String>,
    /// Composite identity; unique per character
    pub key: EffectKey,
    /// Copied from the feature's declaration; immutable
    pub changes: Vec<ModifierDescriptor>,
    /// Disabled effects are retained but contribute nothing
    pub disabled: bool,
    pub tags: EffectTags,
}

impl AppliedModifier {
    pub fn new(
        name: impl Into<String>,
        key: EffectKey,
        changes: Vec<ModifierDescriptor>,
        tags: EffectTags,
    ) -> Self {
        Self {
            id: EffectId::new(),
            name: name.into(),
            icon: None,
            key,
            changes,
            disabled: false,
            tags,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Whether this modifier currently contributes to the character.
    pub fn is_active(&self) -> bool {
        !self.disabled
    }

    /// The favor/hinder signals this modifier asserts.
    ///
    /// A signal counts only when its flag value is truthy. Keys outside the
    /// favor/hinder namespace, malformed signal keys, and false flags are
    /// all skipped; a bad key in stored data must not poison rolls.
    pub fn signals(&self) -> Vec<BiasSignal> {
        self.changes
            .iter()
            .filter(|change| {
                matches!(change.value.trim(), "true" | "1")
            })
            .filter_map(|change| BiasSignal::parse_key(&change.key).ok().flatten())
            .collect()
    }

    /// All changes targeting one character-state path.
    ///
    /// The key is copied in, so the iterator outlives the borrow the
    /// caller looked it up with.
    pub fn changes_for_key<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a ModifierDescriptor> {
        let key = key.to_owned();
        self.changes.iter().filter(move |c| c.key == key)
    }
}
