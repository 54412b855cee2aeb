//! In-memory document store.
//!
//! Backs the repository ports with concurrent maps. A character that has
//! been removed surfaces as `RepoError::Gone` from effect operations, the
//! same shape a real document store produces when a teardown race deletes
//! the parent record.

use async_trait::async_trait;
use dashmap::DashMap;
use wayfarer_domain::{
    AppliedModifier, Character, CharacterId, EffectId, GrantItem, ResourcePool,
};

use crate::infrastructure::ports::{CharacterRepo, EffectRepo, RepoError};

#[derive(Default)]
pub struct InMemoryStore {
    characters: DashMap<CharacterId, Character>,
    grants: DashMap<CharacterId, Vec<GrantItem>>,
    effects: DashMap<CharacterId, Vec<AppliedModifier>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_character(&self, character: Character) {
        self.characters.insert(character.id, character);
    }

    pub fn add_grant(&self, character_id: CharacterId, grant: GrantItem) {
        self.grants.entry(character_id).or_default().push(grant);
    }

    pub fn remove_grant(&self, character_id: CharacterId, grant_id: wayfarer_domain::GrantId) {
        if let Some(mut grants) = self.grants.get_mut(&character_id) {
            grants.retain(|g| g.id != grant_id);
        }
    }

    /// Delete a character record outright (teardown).
    pub fn remove_character(&self, character_id: CharacterId) {
        self.characters.remove(&character_id);
        self.grants.remove(&character_id);
        self.effects.remove(&character_id);
    }

    fn ensure_character(&self, character_id: CharacterId) -> Result<(), RepoError> {
        if self.characters.contains_key(&character_id) {
            Ok(())
        } else {
            Err(RepoError::gone("Character", character_id))
        }
    }
}

#[async_trait]
impl CharacterRepo for InMemoryStore {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(&id).map(|c| c.clone()))
    }

    async fn list_grants(&self, id: CharacterId) -> Result<Vec<GrantItem>, RepoError> {
        self.ensure_character(id)?;
        Ok(self.grants.get(&id).map(|g| g.clone()).unwrap_or_default())
    }

    async fn set_resource_pool(
        &self,
        id: CharacterId,
        resource: &str,
        pool: ResourcePool,
    ) -> Result<(), RepoError> {
        let mut character = self
            .characters
            .get_mut(&id)
            .ok_or_else(|| RepoError::gone("Character", id))?;
        character.resources.insert(resource.to_string(), pool);
        Ok(())
    }
}

#[async_trait]
impl EffectRepo for InMemoryStore {
    async fn list(&self, character: CharacterId) -> Result<Vec<AppliedModifier>, RepoError> {
        self.ensure_character(character)?;
        Ok(self
            .effects
            .get(&character)
            .map(|e| e.clone())
            .unwrap_or_default())
    }

    async fn create(
        &self,
        character: CharacterId,
        effect: &AppliedModifier,
    ) -> Result<(), RepoError> {
        self.ensure_character(character)?;
        self.effects
            .entry(character)
            .or_default()
            .push(effect.clone());
        Ok(())
    }

    async fn delete(&self, character: CharacterId, effect: EffectId) -> Result<(), RepoError> {
        self.ensure_character(character)?;
        let mut effects = self
            .effects
            .get_mut(&character)
            .ok_or_else(|| RepoError::not_found("Effect", effect))?;
        let before = effects.len();
        effects.retain(|e| e.id != effect);
        if effects.len() == before {
            return Err(RepoError::not_found("Effect", effect));
        }
        Ok(())
    }

    async fn set_disabled(
        &self,
        character: CharacterId,
        effect: EffectId,
        disabled: bool,
    ) -> Result<(), RepoError> {
        self.ensure_character(character)?;
        let mut effects = self
            .effects
            .get_mut(&character)
            .ok_or_else(|| RepoError::not_found("Effect", effect))?;
        let target = effects
            .iter_mut()
            .find(|e| e.id == effect)
            .ok_or_else(|| RepoError::not_found("Effect", effect))?;
        target.disabled = disabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::RandomPort;
    use crate::use_cases::{EffectSync, RollService};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use wayfarer_domain::{
        Feature, FeatureId, ModifierDescriptor, RulesConfig, SkillEntry, SkillId, SourceKind,
    };

    struct ScriptedRandom(Mutex<VecDeque<i32>>);

    impl RandomPort for ScriptedRandom {
        fn gen_range(&self, min: i32, max: i32) -> i32 {
            let v = self
                .0
                .lock()
                .expect("script lock")
                .pop_front()
                .expect("script exhausted");
            assert!(v >= min && v <= max);
            v
        }
    }

    fn scripted(values: &[i32]) -> Arc<ScriptedRandom> {
        Arc::new(ScriptedRandom(Mutex::new(values.iter().copied().collect())))
    }

    fn seeded_store() -> (Arc<InMemoryStore>, CharacterId) {
        let store = Arc::new(InMemoryStore::new());
        let mut character = Character::new("Wren", 3);
        character.stats.insert("wits".to_string(), 4);
        character.skills.insert(
            SkillId::new("stealth").unwrap(),
            SkillEntry {
                stat: "wits".to_string(),
                trained: false,
            },
        );
        let id = character.id;
        store.insert_character(character);
        (store, id)
    }

    fn cloak() -> GrantItem {
        GrantItem::new("Stealth Cloak", SourceKind::Equipment).with_features(vec![Feature::new(
            FeatureId::new("shadow-weave").unwrap(),
            "Shadow Weave",
            1,
        )
        .with_changes(vec![ModifierDescriptor::flag("favor.skills.stealth")])])
    }

    #[tokio::test]
    async fn equipment_lifecycle_end_to_end() {
        let (store, character_id) = seeded_store();
        let sync = EffectSync::new(store.clone(), store.clone());
        let item = cloak();
        store.add_grant(character_id, item.clone());

        // Added: the cloak's favor shows up on stealth checks.
        let report = sync.on_item_added(character_id, &item).await.unwrap();
        assert_eq!(report.created, vec!["Shadow Weave"]);

        let stealth = SkillId::new("stealth").unwrap();
        let rolls = RollService::new(
            store.clone(),
            store.clone(),
            scripted(&[10, 4]),
            RulesConfig::default(),
        );
        let outcome = rolls.skill_check(character_id, &stealth, 0).await.unwrap();
        assert_eq!(outcome.roll.bias_die, Some(4));

        // Re-adding is idempotent.
        let report = sync.on_item_added(character_id, &item).await.unwrap();
        assert!(report.created.is_empty());
        assert_eq!(EffectRepo::list(&*store, character_id).await.unwrap().len(), 1);

        // Unequipped: same effect identity, no contribution.
        sync.on_equipped_changed(character_id, &item, false)
            .await
            .unwrap();
        let rolls = RollService::new(
            store.clone(),
            store.clone(),
            scripted(&[10]),
            RulesConfig::default(),
        );
        let outcome = rolls.skill_check(character_id, &stealth, 0).await.unwrap();
        assert_eq!(outcome.roll.bias_die, None);

        // Removed: effect deleted by origin.
        let deleted = sync.on_item_removed(character_id, item.id).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(EffectRepo::list(&*store, character_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn teardown_mid_sync_is_swallowed() {
        let (store, character_id) = seeded_store();
        let sync = EffectSync::new(store.clone(), store.clone());

        store.remove_character(character_id);
        let report = sync
            .on_item_added(character_id, &cloak())
            .await
            .unwrap();
        assert!(report.created.is_empty());
    }

    #[tokio::test]
    async fn effect_ops_against_a_gone_character_report_gone() {
        let (store, character_id) = seeded_store();
        store.remove_character(character_id);
        let err = EffectRepo::list(&*store, character_id).await.unwrap_err();
        assert!(err.is_gone());
    }
}
