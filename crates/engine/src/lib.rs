//! Application layer for the Wayfarer rules engine.
//!
//! Owns the effect synchronizer and the roll pipeline, wired to the pure
//! rules in `wayfarer-domain` through repository and randomness ports.

pub mod infrastructure;
pub mod use_cases;

pub use infrastructure::memory::InMemoryStore;
pub use infrastructure::ports::{CharacterRepo, EffectRepo, RandomPort, RepoError};
pub use infrastructure::random::ThreadRandom;
pub use use_cases::{CheckOutcome, EffectSync, PendingChoice, RollError, RollService, SyncReport};
