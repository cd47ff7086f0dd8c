//! Deterministic scoring pipeline shared by the live preview, history recompute and export paths.
//!
//! The free functions in [`rules`] and [`rating`] are the arithmetic; [`ScoringEngine`] adds the
//! catalog join and the configurable input policy on top. None of it touches I/O or the clock, so
//! identical inputs always produce bit-identical [`ScoreBreakdown`]s.

mod inputs;
mod policy;
mod rating;
mod rules;

pub use inputs::{
    CompetencyLevel, CriterionScore, ProficiencyLevel, ScoringInputError, ScoringInputs,
};
pub use policy::{InputRangePolicy, ScoringPolicy, ACHIEVEMENT_RANGE};
pub use rating::{derive_rating, RatingBand};
pub use rules::{
    compute_competency_result, compute_final_score, compute_kpi_result, level_percentage,
    round_for_display, COMPETENCY_BLEND_WEIGHT, KPI_BLEND_WEIGHT, LEVEL_PERCENTAGES,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{Competency, CompetencyId, Criterion, CriterionId};

/// Output contract returned to every caller. All values are unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub kpi_result: f64,
    pub comp_result: f64,
    pub final_score: f64,
    pub rating: RatingBand,
}

impl ScoreBreakdown {
    pub fn from_results(kpi_result: f64, comp_result: f64) -> Self {
        let final_score = compute_final_score(kpi_result, comp_result);
        Self {
            kpi_result,
            comp_result,
            final_score,
            rating: derive_rating(final_score),
        }
    }

    /// KPI share of the final score.
    pub fn weighted_kpi(&self) -> f64 {
        self.kpi_result * KPI_BLEND_WEIGHT
    }

    /// Competency share of the final score.
    pub fn weighted_competency(&self) -> f64 {
        self.comp_result * COMPETENCY_BLEND_WEIGHT
    }

    pub fn rounded(&self) -> RoundedScores {
        RoundedScores {
            kpi_result: round_for_display(self.kpi_result),
            comp_result: round_for_display(self.comp_result),
            final_score: round_for_display(self.final_score),
            rating: self.rating,
        }
    }
}

/// One-decimal view of a [`ScoreBreakdown`] for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedScores {
    pub kpi_result: f64,
    pub comp_result: f64,
    pub final_score: f64,
    pub rating: RatingBand,
}

/// Stateless evaluator applying the scoring policy to catalog-backed inputs.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, inputs: &ScoringInputs) -> ScoreBreakdown {
        ScoreBreakdown::from_results(
            compute_kpi_result(&inputs.criteria),
            compute_competency_result(&inputs.competencies),
        )
    }

    /// Joins freshly entered values onto the catalog.
    ///
    /// Every catalog criterion is included; one without an entry counts as 0% at full weight.
    /// Every catalog competency is included; one without an entry takes the policy's default
    /// level. Entries for ids outside the catalog are rejected.
    pub fn assemble(
        &self,
        criteria: &[Criterion],
        competencies: &[Competency],
        achievements: &BTreeMap<CriterionId, f64>,
        levels: &BTreeMap<CompetencyId, ProficiencyLevel>,
    ) -> Result<ScoringInputs, ScoringInputError> {
        if let Some(unknown) = achievements
            .keys()
            .find(|id| !criteria.iter().any(|criterion| criterion.id == **id))
        {
            return Err(ScoringInputError::UnknownCriterion(*unknown));
        }
        if let Some(unknown) = levels
            .keys()
            .find(|id| !competencies.iter().any(|competency| competency.id == **id))
        {
            return Err(ScoringInputError::UnknownCompetency(*unknown));
        }

        let mut scores = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            let entered = achievements.get(&criterion.id).copied().unwrap_or(0.0);
            scores.push(CriterionScore {
                criterion_id: criterion.id,
                weight: criterion.weight,
                achieved_percent: self.apply_range(criterion.id, entered)?,
            });
        }

        Ok(ScoringInputs {
            criteria: scores,
            competencies: self.join_levels(competencies, levels),
        })
    }

    /// Joins previously stored values onto the catalog for recomputation.
    ///
    /// Stored values already went through the range policy when they were submitted, so they are
    /// used as-is. Rows whose catalog entry has since disappeared are skipped.
    pub fn assemble_stored(
        &self,
        criteria: &[Criterion],
        competencies: &[Competency],
        achievements: &BTreeMap<CriterionId, f64>,
        levels: &BTreeMap<CompetencyId, ProficiencyLevel>,
    ) -> ScoringInputs {
        for id in achievements.keys() {
            if !criteria.iter().any(|criterion| criterion.id == *id) {
                warn!(criterion_id = %id, "stored criterion no longer in catalog; skipped");
            }
        }
        for id in levels.keys() {
            if !competencies.iter().any(|competency| competency.id == *id) {
                warn!(competency_id = %id, "stored competency no longer in catalog; skipped");
            }
        }

        let scores = criteria
            .iter()
            .map(|criterion| CriterionScore {
                criterion_id: criterion.id,
                weight: criterion.weight,
                achieved_percent: achievements.get(&criterion.id).copied().unwrap_or(0.0),
            })
            .collect();

        ScoringInputs {
            criteria: scores,
            competencies: self.join_levels(competencies, levels),
        }
    }

    fn join_levels(
        &self,
        competencies: &[Competency],
        levels: &BTreeMap<CompetencyId, ProficiencyLevel>,
    ) -> Vec<CompetencyLevel> {
        competencies
            .iter()
            .map(|competency| CompetencyLevel {
                competency_id: competency.id,
                importance_level: competency.importance_level,
                selected_level: levels
                    .get(&competency.id)
                    .copied()
                    .unwrap_or(self.policy.default_competency_level),
            })
            .collect()
    }

    fn apply_range(&self, criterion_id: CriterionId, value: f64) -> Result<f64, ScoringInputError> {
        if !value.is_finite() {
            return Err(ScoringInputError::NonFiniteAchievement(criterion_id));
        }
        if ACHIEVEMENT_RANGE.contains(&value) {
            return Ok(value);
        }

        match self.policy.input_range {
            InputRangePolicy::PassThrough => Ok(value),
            InputRangePolicy::Clamp => {
                let clamped = value.clamp(*ACHIEVEMENT_RANGE.start(), *ACHIEVEMENT_RANGE.end());
                warn!(%criterion_id, entered = value, clamped, "achievement clamped into range");
                Ok(clamped)
            }
            InputRangePolicy::Reject => {
                Err(ScoringInputError::AchievementOutOfRange { criterion_id, value })
            }
        }
    }
}
