//! Repository port traits for the document store.

use async_trait::async_trait;
use wayfarer_domain::{
    AppliedModifier, Character, CharacterId, EffectId, GrantItem, ResourcePool,
};

use super::error::RepoError;

/// Character records and the grants they own.
///
/// `get` returns the character without its applied modifiers hydrated;
/// callers that need effects load them through [`EffectRepo`] so every
/// read sees the current set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;

    /// All grants (classes, perks, ancestry traits, equipment) the
    /// character currently owns.
    async fn list_grants(&self, id: CharacterId) -> Result<Vec<GrantItem>, RepoError>;

    /// Persist a resource pool after a spend or a level-driven resize.
    async fn set_resource_pool(
        &self,
        id: CharacterId,
        resource: &str,
        pool: ResourcePool,
    ) -> Result<(), RepoError>;
}

/// Applied modifier storage, keyed by owning character.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EffectRepo: Send + Sync {
    async fn list(&self, character: CharacterId) -> Result<Vec<AppliedModifier>, RepoError>;
    async fn create(
        &self,
        character: CharacterId,
        effect: &AppliedModifier,
    ) -> Result<(), RepoError>;
    async fn delete(&self, character: CharacterId, effect: EffectId) -> Result<(), RepoError>;
    async fn set_disabled(
        &self,
        character: CharacterId,
        effect: EffectId,
        disabled: bool,
    ) -> Result<(), RepoError>;
}
