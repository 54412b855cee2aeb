//! Entities - objects with identity and lifecycle

mod character;
mod grant;

pub use character::{Character, ResourcePool, SkillEntry, SpendOutcome};
pub use grant::{Feature, GrantItem, PoolProgression};
