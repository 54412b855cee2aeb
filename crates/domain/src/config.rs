//! Rules configuration
//!
//! One immutable configuration object, constructed at startup and passed
//! into the engines by reference. Nothing reads configuration from global
//! state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesConfig {
    /// Size of the base check die
    pub check_die: i32,
    /// Size of the favor/hinder die
    pub favor_die: i32,
    /// Crit threshold when no modifier lowers it
    pub default_crit_threshold: i32,
    /// Skill difficulty starts here and drops with stat/training
    pub skill_difficulty_base: i32,
    /// Hard cap on total dice in one exploding-dice chain
    pub explosion_limit: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            check_die: 20,
            favor_die: 6,
            default_crit_threshold: 20,
            skill_difficulty_base: 20,
            explosion_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standard_rules() {
        let config = RulesConfig::default();
        assert_eq!(config.check_die, 20);
        assert_eq!(config.favor_die, 6);
        assert_eq!(config.default_crit_threshold, 20);
        assert_eq!(config.skill_difficulty_base, 20);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RulesConfig = serde_json::from_str(r#"{"explosionLimit": 50}"#).unwrap();
        assert_eq!(config.explosion_limit, 50);
        assert_eq!(config.check_die, 20);
    }
}
