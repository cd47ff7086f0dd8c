use super::inputs::{CompetencyLevel, CriterionScore, ProficiencyLevel};

/// Percentage credited for each proficiency level, indexed by `level - 1`.
///
/// This table is the single authoritative copy: preview, history and export all go through
/// [`level_percentage`].
pub const LEVEL_PERCENTAGES: [f64; 5] = [50.0, 80.0, 100.0, 120.0, 150.0];

/// Share of the final score contributed by the KPI result. Fixed organization policy.
pub const KPI_BLEND_WEIGHT: f64 = 0.9;

/// Share of the final score contributed by the competency result. Fixed organization policy.
pub const COMPETENCY_BLEND_WEIGHT: f64 = 0.1;

pub fn level_percentage(level: ProficiencyLevel) -> f64 {
    LEVEL_PERCENTAGES[usize::from(level.get()) - 1]
}

/// Weighted average achievement across all criteria, or `0` when the total weight is zero.
pub fn compute_kpi_result(scores: &[CriterionScore]) -> f64 {
    let total_weight: f64 = scores.iter().map(|score| score.weight).sum();
    if total_weight == 0.0 {
        return 0.0;
    }

    let weighted: f64 = scores
        .iter()
        .map(|score| score.achieved_percent * score.weight)
        .sum();

    weighted / total_weight
}

/// Importance-weighted competency percentage, or `0` when no importance weight is present.
pub fn compute_competency_result(levels: &[CompetencyLevel]) -> f64 {
    let total_importance_weight: f64 = levels
        .iter()
        .map(|level| f64::from(level.importance_level) * 100.0)
        .sum();
    if total_importance_weight == 0.0 {
        return 0.0;
    }

    let comp_score_sum: f64 = levels.iter().map(CompetencyLevel::contribution).sum();

    comp_score_sum / total_importance_weight * 100.0
}

pub fn compute_final_score(kpi_result: f64, comp_result: f64) -> f64 {
    kpi_result * KPI_BLEND_WEIGHT + comp_result * COMPETENCY_BLEND_WEIGHT
}

/// Rounds a score to the single decimal place used on screens and in exports.
pub fn round_for_display(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
