//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Ports exist for:
//! - Document store access (could swap the in-memory store for a database)
//! - Randomness (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{CharacterRepo, EffectRepo};
pub use testing::RandomPort;

#[cfg(test)]
pub use repos::{MockCharacterRepo, MockEffectRepo};
