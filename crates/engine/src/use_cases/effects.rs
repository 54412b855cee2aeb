//! Effect synchronization use cases.
//!
//! Keeps a character's applied modifiers in step with the grants they own.
//! The reconciliation is a diff against the composite `(origin, feature)`
//! key: only missing keys are created, so every operation here is safe to
//! retry. A partial failure leaves the already-created modifiers in place;
//! the retry's diff skips them.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use wayfarer_domain::{
    AppliedModifier, CharacterId, EffectKey, EffectTags, Feature, FeatureId, GrantId, GrantItem,
    ModifierDescriptor, ResourcePool,
};

use crate::infrastructure::ports::{CharacterRepo, EffectRepo, RepoError};

/// A choice-gated feature waiting on player input.
///
/// Surfaced to the choice-collection layer instead of being auto-applied;
/// the selection comes back through [`EffectSync::apply_choice`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChoice {
    pub origin: GrantId,
    pub feature: FeatureId,
    pub name: String,
}

/// What one synchronization pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Names of the applied modifiers created by this pass
    pub created: Vec<String>,
    /// Choice-gated features that need player input before applying
    pub pending_choices: Vec<PendingChoice>,
}

/// Derives and maintains applied modifiers from grant lifecycle events.
///
/// Operations are serialized per character: the diff-then-create sequence
/// must not interleave with another writer's, or the dedupe key check is
/// worthless. Cross-process writers still need arbitration by the host.
pub struct EffectSync {
    characters: Arc<dyn CharacterRepo>,
    effects: Arc<dyn EffectRepo>,
    write_locks: DashMap<CharacterId, Arc<Mutex<()>>>,
}

impl EffectSync {
    pub fn new(characters: Arc<dyn CharacterRepo>, effects: Arc<dyn EffectRepo>) -> Self {
        Self {
            characters,
            effects,
            write_locks: DashMap::new(),
        }
    }

    /// Take the character's write lock. The returned guard evicts the
    /// map entry on drop once nothing else holds the mutex, so the map
    /// tracks only characters with in-flight writes.
    async fn write_lock(&self, character_id: CharacterId) -> CharacterWriteGuard<'_> {
        let lock = self.write_locks.entry(character_id).or_default().clone();
        CharacterWriteGuard {
            locks: &self.write_locks,
            character_id,
            _guard: lock.lock_owned().await,
        }
    }

    /// React to a grant being added to a character.
    ///
    /// Computes the features the grant currently gives (class features are
    /// level-gated), diffs against existing applied modifiers by key, and
    /// creates only the missing ones. Choice-gated features are reported,
    /// not applied.
    pub async fn on_item_added(
        &self,
        character_id: CharacterId,
        item: &GrantItem,
    ) -> Result<SyncReport, RepoError> {
        let _guard = self.write_lock(character_id).await;

        let Some(character) = self.characters.get(character_id).await? else {
            tracing::warn!(character = %character_id, "effect sync skipped: character is gone");
            return Ok(SyncReport::default());
        };

        let existing = self.existing_keys(character_id).await?;
        let mut report = SyncReport::default();

        for feature in item.granted_features(character.level) {
            let key = EffectKey::new(item.id, feature.id.clone());
            if existing.contains(&key) {
                continue;
            }
            if feature.requires_choice {
                report.pending_choices.push(PendingChoice {
                    origin: item.id,
                    feature: feature.id.clone(),
                    name: feature.name.clone(),
                });
                continue;
            }
            if !self
                .create_effect(character_id, build_modifier(item, feature), &mut report)
                .await?
            {
                return Ok(report);
            }
        }

        tracing::debug!(character = %character_id, grant = %item.name,
            created = report.created.len(), pending = report.pending_choices.len(),
            "grant sync complete");
        Ok(report)
    }

    /// React to a character's level changing.
    ///
    /// Creates applied modifiers for class features unlocked in the window
    /// `old_level < feature level <= new_level` and recomputes every
    /// level-scaled resource pool to its cumulative total at the new level.
    pub async fn on_level_changed(
        &self,
        character_id: CharacterId,
        old_level: u8,
        new_level: u8,
    ) -> Result<SyncReport, RepoError> {
        let _guard = self.write_lock(character_id).await;

        let Some(character) = self.characters.get(character_id).await? else {
            tracing::warn!(character = %character_id, "level sync skipped: character is gone");
            return Ok(SyncReport::default());
        };

        let grants = self.characters.list_grants(character_id).await?;
        let existing = self.existing_keys(character_id).await?;
        let mut report = SyncReport::default();

        for grant in &grants {
            for feature in grant.features_gained(old_level, new_level) {
                let key = EffectKey::new(grant.id, feature.id.clone());
                if existing.contains(&key) {
                    continue;
                }
                if feature.requires_choice {
                    report.pending_choices.push(PendingChoice {
                        origin: grant.id,
                        feature: feature.id.clone(),
                        name: feature.name.clone(),
                    });
                    continue;
                }
                if !self
                    .create_effect(character_id, build_modifier(grant, feature), &mut report)
                    .await?
                {
                    return Ok(report);
                }
            }
        }

        for grant in &grants {
            for progression in &grant.pools {
                let total = progression.total_at(new_level);
                let pool = match character.resources.get(&progression.resource) {
                    Some(current) => {
                        let mut resized = *current;
                        resized.resize(total);
                        resized
                    }
                    None => ResourcePool::new(total),
                };
                match self
                    .characters
                    .set_resource_pool(character_id, &progression.resource, pool)
                    .await
                {
                    Ok(()) => {}
                    Err(e) if e.is_gone() => {
                        tracing::warn!(character = %character_id, error = %e,
                            "pool sync stopped: character deleted mid-update");
                        return Ok(report);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(report)
    }

    /// React to a grant being removed: delete every applied modifier whose
    /// origin is the removed grant, and nothing else. Returns how many were
    /// deleted.
    pub async fn on_item_removed(
        &self,
        character_id: CharacterId,
        item_id: GrantId,
    ) -> Result<usize, RepoError> {
        let _guard = self.write_lock(character_id).await;

        let effects = match self.effects.list(character_id).await {
            Ok(effects) => effects,
            Err(e) if e.is_gone() => {
                tracing::warn!(character = %character_id, "removal sync skipped: character is gone");
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let mut deleted = 0;
        for effect in effects.iter().filter(|e| e.key.origin == item_id) {
            match self.effects.delete(character_id, effect.id).await {
                Ok(()) => deleted += 1,
                // Already gone: a retry or a teardown race, both fine.
                Err(e) if e.is_gone() || e.is_not_found() => {
                    tracing::warn!(effect = %effect.id, error = %e, "effect already removed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(deleted)
    }

    /// React to an equippable grant's equip state changing: applied
    /// modifiers from that grant are disabled while unequipped, never
    /// deleted, so re-equipping restores the exact same identities.
    /// Returns how many were toggled.
    pub async fn on_equipped_changed(
        &self,
        character_id: CharacterId,
        item: &GrantItem,
        equipped: bool,
    ) -> Result<usize, RepoError> {
        if !item.kind.is_equippable() {
            tracing::warn!(grant = %item.name, kind = %item.kind,
                "equip toggle ignored: grant kind is always-on");
            return Ok(0);
        }

        let _guard = self.write_lock(character_id).await;

        let effects = match self.effects.list(character_id).await {
            Ok(effects) => effects,
            Err(e) if e.is_gone() => {
                tracing::warn!(character = %character_id, "equip sync skipped: character is gone");
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let mut toggled = 0;
        for effect in effects.iter().filter(|e| e.key.origin == item.id) {
            match self
                .effects
                .set_disabled(character_id, effect.id, !equipped)
                .await
            {
                Ok(()) => toggled += 1,
                Err(e) if e.is_gone() || e.is_not_found() => {
                    tracing::warn!(effect = %effect.id, error = %e, "effect vanished during equip toggle");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(toggled)
    }

    /// Apply the player's selection for a choice-gated feature. The chosen
    /// descriptors replace the feature's declared ones; the same dedupe key
    /// applies, so re-submitting a choice never duplicates. Returns whether
    /// a modifier was created.
    pub async fn apply_choice(
        &self,
        character_id: CharacterId,
        item: &GrantItem,
        feature: &Feature,
        chosen: Vec<ModifierDescriptor>,
    ) -> Result<bool, RepoError> {
        let _guard = self.write_lock(character_id).await;

        let existing = self.existing_keys(character_id).await?;
        let key = EffectKey::new(item.id, feature.id.clone());
        if existing.contains(&key) {
            return Ok(false);
        }

        let mut effect = build_modifier(item, feature);
        effect.changes = chosen;
        match self.effects.create(character_id, &effect).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_gone() => {
                tracing::warn!(character = %character_id, error = %e,
                    "choice discarded: character is gone");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn existing_keys(
        &self,
        character_id: CharacterId,
    ) -> Result<HashSet<EffectKey>, RepoError> {
        Ok(self
            .effects
            .list(character_id)
            .await?
            .into_iter()
            .map(|e| e.key)
            .collect())
    }

    /// Create one effect, recording it in the report. Returns false when a
    /// teardown race ended the batch early.
    async fn create_effect(
        &self,
        character_id: CharacterId,
        effect: AppliedModifier,
        report: &mut SyncReport,
    ) -> Result<bool, RepoError> {
        match self.effects.create(character_id, &effect).await {
            Ok(()) => {
                report.created.push(effect.name);
                Ok(true)
            }
            Err(e) if e.is_gone() => {
                tracing::warn!(character = %character_id, error = %e,
                    "effect sync stopped: character deleted mid-batch");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Holds one character's write lock; on release, drops the map entry when
/// no other task holds or awaits the same mutex.
struct CharacterWriteGuard<'a> {
    locks: &'a DashMap<CharacterId, Arc<Mutex<()>>>,
    character_id: CharacterId,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for CharacterWriteGuard<'_> {
    fn drop(&mut self) {
        // Two strong refs = the map entry plus our own guard; anything more
        // means another writer has a handle, so the entry must stay.
        self.locks
            .remove_if(&self.character_id, |_, lock| Arc::strong_count(lock) == 2);
    }
}

/// Build the applied modifier for one feature of a grant.
fn build_modifier(item: &GrantItem, feature: &Feature) -> AppliedModifier {
    let effect = AppliedModifier::new(
        feature.name.clone(),
        EffectKey::new(item.id, feature.id.clone()),
        feature.changes.clone(),
        EffectTags {
            source_kind: item.kind,
            source_name: item.name.clone(),
        },
    );
    match &item.icon {
        Some(icon) => effect.with_icon(icon.clone()),
        None => effect,
    }
}
