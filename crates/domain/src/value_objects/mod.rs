//! Value objects - Immutable objects defined by their attributes

mod category;
mod check;
mod damage;
mod dice;
mod effect;
mod keys;
mod modifier;
mod morale;

pub use category::{BiasSignal, Polarity, RollCategory};
pub use check::{Bias, CheckInput, CheckRollResult};
pub use damage::{
    countdown_roll, damage_roll, exploding_dice, CountdownResult, DamageRollResult,
    ExplodingRollResult,
};
pub use dice::{DiceFormula, DiceParseError, DiceRollResult, DiceTerm, TermRoll};
pub use effect::{AppliedModifier, EffectKey, EffectTags, SourceKind};
pub use keys::{FeatureId, SaveType, SkillId};
pub use modifier::{apply_changes, ModifierDescriptor, ModifierMode};
pub use morale::{roll_group_morale, roll_morale, MoraleResult};
