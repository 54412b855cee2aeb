//! Pure rules for the Wayfarer tabletop system
//!
//! Everything in this crate is deterministic: randomness enters only
//! through caller-supplied roller closures, and persistence lives behind
//! the engine crate's ports. The crate covers the modifier model (grants,
//! features, applied modifiers), favor/hinder resolution, and the
//! check/damage/morale engines.

pub mod config;
pub mod entities;
pub mod error;
pub mod ids;
pub mod resolver;
pub mod value_objects;

pub use config::RulesConfig;
pub use entities::{Character, Feature, GrantItem, PoolProgression, ResourcePool, SkillEntry, SpendOutcome};
pub use error::DomainError;
pub use ids::{CharacterId, EffectId, GrantId};
pub use resolver::{resolve, ResolvedBias};
pub use value_objects::{
    apply_changes, countdown_roll, damage_roll, exploding_dice, roll_group_morale, roll_morale,
    AppliedModifier, Bias, BiasSignal, CheckInput, CheckRollResult, CountdownResult,
    DamageRollResult, DiceFormula, DiceParseError, DiceRollResult, DiceTerm, EffectKey,
    EffectTags, ExplodingRollResult, FeatureId, ModifierDescriptor, ModifierMode, MoraleResult,
    Polarity, RollCategory, SaveType, SkillId, SourceKind, TermRoll,
};
