//! Character aggregate
//!
//! The character owns its applied modifiers and resource pools. All
//! derived numbers (effective stats, skill difficulties, crit threshold)
//! are computed fresh from base values plus active modifiers; nothing
//! derived is stored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::value_objects::{apply_changes, AppliedModifier, ModifierDescriptor, SkillId};

/// A depletable pool (mana, stamina, uses-per-day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

impl ResourcePool {
    /// A full pool.
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Try to pay a cost. Insufficient funds is a normal outcome for the
    /// caller to branch on, not an error.
    pub fn spend(&mut self, cost: i32) -> SpendOutcome {
        if cost > self.current {
            return SpendOutcome::Insufficient {
                available: self.current,
                cost,
            };
        }
        self.current -= cost;
        SpendOutcome::Spent {
            remaining: self.current,
        }
    }

    /// Restore up to `amount`, capped at max.
    pub fn restore(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Resize the pool (level change). Current is clamped into the new
    /// bounds but otherwise preserved; spent points stay spent.
    pub fn resize(&mut self, new_max: i32) {
        self.max = new_max;
        self.current = self.current.clamp(0, new_max);
    }
}

/// Result of attempting to spend from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SpendOutcome {
    Spent { remaining: i32 },
    Insufficient { available: i32, cost: i32 },
}

impl SpendOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Spent { .. })
    }
}

/// A skill the character knows about: which stat drives it and whether
/// the character is trained in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    /// Name of the governing stat (e.g., "might", "wits")
    pub stat: String,
    pub trained: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub level: u8,
    /// Base stat values by stat name
    pub stats: HashMap<String, i32>,
    pub skills: HashMap<SkillId, SkillEntry>,
    /// Resource pools by resource key (e.g., "mana")
    pub resources: HashMap<String, ResourcePool>,
    /// Applied modifiers, managed by the effect synchronizer
    pub effects: Vec<AppliedModifier>,
}

impl Character {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            level,
            stats: HashMap::new(),
            skills: HashMap::new(),
            resources: HashMap::new(),
            effects: Vec::new(),
        }
    }

    /// The stored stat value, before modifiers. Unknown stats read as 0.
    pub fn base_stat(&self, stat: &str) -> i32 {
        self.stats.get(stat).copied().unwrap_or(0)
    }

    /// All changes from active modifiers targeting one state path.
    pub fn active_changes_for_key(&self, key: &str) -> Vec<&ModifierDescriptor> {
        self.effects
            .iter()
            .filter(|e| e.is_active())
            .flat_map(|e| e.changes_for_key(key))
            .collect()
    }

    /// The stat value after folding in all active modifiers on
    /// `stats.<name>`.
    pub fn effective_stat(&self, stat: &str) -> i32 {
        let key = format!("stats.{}", stat);
        apply_changes(self.base_stat(stat), &self.active_changes_for_key(&key))
    }

    /// The difficulty of a check against one of this character's skills.
    ///
    /// Training counts the governing stat twice: difficulty is
    /// `base - stat` untrained and `base - 2 * stat` trained.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownKey` when the character has no entry
    /// for the skill.
    pub fn skill_difficulty(&self, skill: &SkillId, base: i32) -> Result<i32, DomainError> {
        let entry = self
            .skills
            .get(skill)
            .ok_or_else(|| DomainError::unknown_key("skill", skill.as_str()))?;
        let stat = self.effective_stat(&entry.stat);
        let reduction = if entry.trained { stat * 2 } else { stat };
        Ok(base - reduction)
    }

    /// The crit threshold after active modifiers on `crit.threshold`,
    /// clamped to the die's face range.
    pub fn effective_crit_threshold(&self, default: i32) -> i32 {
        apply_changes(default, &self.active_changes_for_key("crit.threshold")).clamp(1, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::GrantId;
    use crate::value_objects::{EffectKey, EffectTags, FeatureId, ModifierMode, SourceKind};

    fn character_with_skill(stat_value: i32, trained: bool) -> Character {
        let mut character = Character::new("Wren", 3);
        character.stats.insert("wits".to_string(), stat_value);
        character.skills.insert(
            SkillId::new("stealth").unwrap(),
            SkillEntry {
                stat: "wits".to_string(),
                trained,
            },
        );
        character
    }

    fn effect_with(changes: Vec<ModifierDescriptor>) -> AppliedModifier {
        AppliedModifier::new(
            "Test Effect",
            EffectKey::new(GrantId::new(), FeatureId::new("feature").unwrap()),
            changes,
            EffectTags {
                source_kind: SourceKind::Perk,
                source_name: "Test".to_string(),
            },
        )
    }

    #[test]
    fn untrained_skill_difficulty() {
        let character = character_with_skill(4, false);
        let difficulty = character
            .skill_difficulty(&SkillId::new("stealth").unwrap(), 20)
            .unwrap();
        assert_eq!(difficulty, 16);
    }

    #[test]
    fn trained_skill_counts_stat_twice() {
        let character = character_with_skill(4, true);
        let difficulty = character
            .skill_difficulty(&SkillId::new("stealth").unwrap(), 20)
            .unwrap();
        assert_eq!(difficulty, 12);
    }

    #[test]
    fn unknown_skill_names_the_key() {
        let character = Character::new("Wren", 1);
        let err = character
            .skill_difficulty(&SkillId::new("haggling").unwrap(), 20)
            .unwrap_err();
        assert!(err.to_string().contains("haggling"));
    }

    #[test]
    fn effective_stat_folds_active_modifiers() {
        let mut character = character_with_skill(4, false);
        character
            .effects
            .push(effect_with(vec![ModifierDescriptor::add("stats.wits", 2)]));
        assert_eq!(character.effective_stat("wits"), 6);

        // And the boosted stat feeds skill difficulty.
        let difficulty = character
            .skill_difficulty(&SkillId::new("stealth").unwrap(), 20)
            .unwrap();
        assert_eq!(difficulty, 14);
    }

    #[test]
    fn disabled_modifiers_do_not_touch_stats() {
        let mut character = character_with_skill(4, false);
        let mut effect = effect_with(vec![ModifierDescriptor::add("stats.wits", 2)]);
        effect.disabled = true;
        character.effects.push(effect);
        assert_eq!(character.effective_stat("wits"), 4);
    }

    #[test]
    fn crit_threshold_can_be_lowered_but_stays_in_range() {
        let mut character = Character::new("Wren", 1);
        assert_eq!(character.effective_crit_threshold(20), 20);

        character.effects.push(effect_with(vec![ModifierDescriptor::new(
            "crit.threshold",
            ModifierMode::Downgrade,
            "19",
        )]));
        assert_eq!(character.effective_crit_threshold(20), 19);

        character.effects.push(effect_with(vec![ModifierDescriptor::add(
            "crit.threshold",
            -100,
        )]));
        assert_eq!(character.effective_crit_threshold(20), 1);
    }

    #[test]
    fn spend_within_pool_succeeds() {
        let mut pool = ResourcePool::new(5);
        let outcome = pool.spend(3);
        assert_eq!(outcome, SpendOutcome::Spent { remaining: 2 });
        assert!(outcome.succeeded());
    }

    #[test]
    fn overspend_is_a_guard_not_an_error() {
        let mut pool = ResourcePool::new(2);
        let outcome = pool.spend(3);
        assert_eq!(
            outcome,
            SpendOutcome::Insufficient {
                available: 2,
                cost: 3
            }
        );
        assert_eq!(pool.current, 2);
    }

    #[test]
    fn restore_caps_at_max() {
        let mut pool = ResourcePool::new(5);
        pool.spend(4);
        pool.restore(10);
        assert_eq!(pool.current, 5);
    }

    #[test]
    fn resize_preserves_spent_points() {
        let mut pool = ResourcePool::new(5);
        pool.spend(2);
        pool.resize(8);
        assert_eq!(pool.current, 3);
        assert_eq!(pool.max, 8);

        pool.resize(1);
        assert_eq!(pool.current, 1);
    }
}
