//! Favor/hinder resolution
//!
//! Scans a character's active applied modifiers for favor/hinder signals
//! matching one roll category and reduces them to a single net bias.
//! Favor and hinder cancel one-for-one and the net never exceeds magnitude
//! 1 no matter how many sources are active: this is a deliberate
//! anti-stacking rule. Resolution carries no state and must run fresh on
//! every roll, because modifiers can be disabled between rolls.

use serde::{Deserialize, Serialize};

use crate::value_objects::{AppliedModifier, Polarity, RollCategory};

/// Net bias for one roll, with the sources that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBias {
    /// Always in {-1, 0, +1}
    pub net: i32,
    /// Names of active modifiers asserting favor for this category
    pub favor_source_names: Vec<String>,
    /// Names of active modifiers asserting hinder for this category
    pub hinder_source_names: Vec<String>,
}

impl ResolvedBias {
    pub fn neutral() -> Self {
        Self {
            net: 0,
            favor_source_names: Vec::new(),
            hinder_source_names: Vec::new(),
        }
    }
}

/// Resolve the net favor/hinder bias for one roll category.
///
/// Each active modifier counts as at most one source per polarity, even if
/// it declares the same signal several times. Disabled modifiers contribute
/// nothing.
pub fn resolve(effects: &[AppliedModifier], category: &RollCategory) -> ResolvedBias {
    let mut favor_source_names = Vec::new();
    let mut hinder_source_names = Vec::new();

    for effect in effects.iter().filter(|e| e.is_active()) {
        let mut favors = false;
        let mut hinders = false;
        for signal in effect.signals() {
            if signal.category != *category {
                continue;
            }
            match signal.polarity {
                Polarity::Favor => favors = true,
                Polarity::Hinder => hinders = true,
            }
        }
        if favors {
            favor_source_names.push(effect.name.clone());
        }
        if hinders {
            hinder_source_names.push(effect.name.clone());
        }
    }

    let raw = favor_source_names.len() as i32 - hinder_source_names.len() as i32;

    ResolvedBias {
        net: raw.clamp(-1, 1),
        favor_source_names,
        hinder_source_names,
    }
}
