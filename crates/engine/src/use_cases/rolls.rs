//! Roll use cases.
//!
//! Wires the pure check/damage/morale engines to live character state:
//! loads the character, hydrates its applied modifiers, resolves
//! favor/hinder fresh for the requested category, and feeds the injected
//! random port into the domain rollers.

use std::sync::Arc;

use wayfarer_domain::{
    countdown_roll, damage_roll, exploding_dice, resolve, roll_group_morale, roll_morale,
    Character, CharacterId, CheckInput, CheckRollResult, CountdownResult, DamageRollResult,
    DiceFormula, DomainError, ExplodingRollResult, MoraleResult, ResolvedBias, RollCategory,
    RulesConfig, SaveType, SkillId, SpendOutcome,
};

use crate::infrastructure::ports::{CharacterRepo, EffectRepo, RandomPort, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum RollError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A check result together with the bias audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub roll: CheckRollResult,
    pub bias: ResolvedBias,
}

/// Resolves checks, damage, and morale against persisted characters.
pub struct RollService {
    characters: Arc<dyn CharacterRepo>,
    effects: Arc<dyn EffectRepo>,
    random: Arc<dyn RandomPort>,
    config: RulesConfig,
}

impl RollService {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        effects: Arc<dyn EffectRepo>,
        random: Arc<dyn RandomPort>,
        config: RulesConfig,
    ) -> Self {
        Self {
            characters,
            effects,
            random,
            config,
        }
    }

    /// Roll against one of the character's skills. The difficulty is
    /// derived from the governing stat and training; `modifier` is a flat
    /// situational adjustment to the roll itself.
    pub async fn skill_check(
        &self,
        character_id: CharacterId,
        skill: &SkillId,
        modifier: i32,
    ) -> Result<CheckOutcome, RollError> {
        let character = self.load(character_id).await?;
        let difficulty =
            character.skill_difficulty(skill, self.config.skill_difficulty_base)?;
        Ok(self.check(
            &character,
            RollCategory::skill(skill.clone()),
            difficulty,
            modifier,
        ))
    }

    /// Roll an attack against a caller-supplied difficulty.
    pub async fn attack_check(
        &self,
        character_id: CharacterId,
        difficulty: i32,
        modifier: i32,
    ) -> Result<CheckOutcome, RollError> {
        let character = self.load(character_id).await?;
        Ok(self.check(&character, RollCategory::Attack, difficulty, modifier))
    }

    /// Roll a saving throw against a caller-supplied difficulty.
    pub async fn save_check(
        &self,
        character_id: CharacterId,
        save: SaveType,
        difficulty: i32,
        modifier: i32,
    ) -> Result<CheckOutcome, RollError> {
        let character = self.load(character_id).await?;
        Ok(self.check(&character, RollCategory::save(save), difficulty, modifier))
    }

    /// Roll damage from a formula string. Critical hits double every dice
    /// term; flat terms are untouched.
    pub fn damage(&self, formula: &str, is_critical: bool) -> Result<DamageRollResult, RollError> {
        let formula = DiceFormula::parse(formula).map_err(DomainError::from)?;
        Ok(damage_roll(&formula, is_critical, |min, max| {
            self.random.gen_range(min, max)
        }))
    }

    /// Roll exploding d6s, capped by the configured explosion limit.
    pub fn exploding(&self, count: u32) -> ExplodingRollResult {
        exploding_dice(count, self.config.explosion_limit, |min, max| {
            self.random.gen_range(min, max)
        })
    }

    /// Roll a countdown die; the caller persists the returned size.
    pub fn countdown(&self, die_size: i32) -> CountdownResult {
        countdown_roll(die_size, |min, max| self.random.gen_range(min, max))
    }

    pub fn morale(&self, morale_score: i32) -> MoraleResult {
        roll_morale(morale_score, |min, max| self.random.gen_range(min, max))
    }

    /// One shared morale roll for a group, thresholded at the weakest score.
    pub fn group_morale(&self, morale_scores: &[i32]) -> Option<MoraleResult> {
        roll_group_morale(morale_scores, |min, max| self.random.gen_range(min, max))
    }

    /// Spend from a resource pool.
    ///
    /// An unknown resource key is a soft failure: it is logged and the
    /// operation becomes a no-op returning `None`. Insufficient funds comes
    /// back as a normal [`SpendOutcome`] for the caller to branch on.
    pub async fn spend_resource(
        &self,
        character_id: CharacterId,
        resource: &str,
        cost: i32,
    ) -> Result<Option<SpendOutcome>, RollError> {
        let character = self
            .characters
            .get(character_id)
            .await?
            .ok_or(RollError::CharacterNotFound(character_id))?;

        let Some(mut pool) = character.resources.get(resource).copied() else {
            tracing::warn!(character = %character_id, resource,
                "spend ignored: character has no such resource pool");
            return Ok(None);
        };

        let outcome = pool.spend(cost);
        if outcome.succeeded() {
            self.characters
                .set_resource_pool(character_id, resource, pool)
                .await?;
        }
        Ok(Some(outcome))
    }

    async fn load(&self, character_id: CharacterId) -> Result<Character, RollError> {
        let mut character = self
            .characters
            .get(character_id)
            .await?
            .ok_or(RollError::CharacterNotFound(character_id))?;
        // Effects are loaded fresh on every roll; equip toggles between
        // rolls must be visible.
        character.effects = self.effects.list(character_id).await?;
        Ok(character)
    }

    fn check(
        &self,
        character: &Character,
        category: RollCategory,
        difficulty: i32,
        modifier: i32,
    ) -> CheckOutcome {
        let bias = resolve(&character.effects, &category);
        let crit_threshold =
            character.effective_crit_threshold(self.config.default_crit_threshold);

        let input = CheckInput {
            difficulty,
            crit_threshold,
            bias: bias.net,
            modifier,
            check_die: self.config.check_die,
            favor_die: self.config.favor_die,
        };
        let roll = input.resolve(|min, max| self.random.gen_range(min, max));

        CheckOutcome { roll, bias }
    }
}
