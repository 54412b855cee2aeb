//! Grants - the items that give characters their mechanics
//!
//! A grant is a class, perk, ancestry trait, or piece of equipment owned by
//! a character. It declares features (bundles of modifier descriptors,
//! optionally gated by level or by a player choice) and, for classes,
//! level-scaled resource pool progressions. Grants are read-only inputs to
//! the effect synchronizer; synchronization never mutates them.

use serde::{Deserialize, Serialize};

use crate::ids::GrantId;
use crate::value_objects::{FeatureId, ModifierDescriptor, SourceKind};

/// One feature a grant declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    /// Minimum character level for class features; ignored for other kinds
    pub level: u8,
    /// The changes this feature applies when active
    pub changes: Vec<ModifierDescriptor>,
    /// Choice-gated features are never auto-applied; the player picks first
    pub requires_choice: bool,
}

impl Feature {
    pub fn new(id: FeatureId, name: impl Into<String>, level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            changes: Vec::new(),
            requires_choice: false,
        }
    }

    pub fn with_changes(mut self, changes: Vec<ModifierDescriptor>) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_choice(mut self) -> Self {
        self.requires_choice = true;
        self
    }
}

/// A level-scaled resource pool a class grants (e.g., mana per level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolProgression {
    /// Resource key on the character (e.g., "mana")
    pub resource: String,
    /// Points gained at each level; index 0 is level 1
    pub per_level: Vec<i32>,
}

impl PoolProgression {
    /// Cumulative pool size at a level: the sum of all gains up to and
    /// including it.
    pub fn total_at(&self, level: u8) -> i32 {
        self.per_level.iter().take(level as usize).sum()
    }
}

/// An item owned by a character that grants features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantItem {
    pub id: GrantId,
    pub name: String,
    pub kind: SourceKind,
    pub icon: Option<String>,
    pub features: Vec<Feature>,
    /// Pool progressions; only meaningful for class grants
    pub pools: Vec<PoolProgression>,
}

impl GrantItem {
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: GrantId::new(),
            name: name.into(),
            kind,
            icon: None,
            features: Vec::new(),
            pools: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_pools(mut self, pools: Vec<PoolProgression>) -> Self {
        self.pools = pools;
        self
    }

    /// Features currently granted at a character level. Class features are
    /// gated by level; perks, ancestry traits, and equipment grant
    /// everything they declare.
    pub fn granted_features(&self, character_level: u8) -> impl Iterator<Item = &Feature> {
        let gated = self.kind == SourceKind::Class;
        self.features
            .iter()
            .filter(move |f| !gated || f.level <= character_level)
    }

    /// Features newly unlocked by a level change. Only classes unlock by
    /// level; every other kind returns nothing.
    pub fn features_gained(&self, old_level: u8, new_level: u8) -> impl Iterator<Item = &Feature> {
        let is_class = self.kind == SourceKind::Class;
        self.features
            .iter()
            .filter(move |f| is_class && old_level < f.level && f.level <= new_level)
    }
}
