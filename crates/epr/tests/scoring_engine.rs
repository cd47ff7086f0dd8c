//! Worked examples for the scoring engine through the crate's public API.

use epr::catalog::{CompetencyId, CriterionId};
use epr::scoring::{
    compute_competency_result, compute_final_score, compute_kpi_result, derive_rating,
    level_percentage, round_for_display, CompetencyLevel, CriterionScore, ProficiencyLevel,
    RatingBand, ScoreBreakdown, ScoringEngine, ScoringInputs, ScoringPolicy,
};

fn criterion(id: u32, weight: f64, achieved_percent: f64) -> CriterionScore {
    CriterionScore {
        criterion_id: CriterionId(id),
        weight,
        achieved_percent,
    }
}

fn competency(id: u32, importance_level: u8, level: u8) -> CompetencyLevel {
    CompetencyLevel {
        competency_id: CompetencyId(id),
        importance_level,
        selected_level: ProficiencyLevel::new(level).expect("valid level"),
    }
}

#[test]
fn degenerate_inputs_score_zero() {
    assert_eq!(compute_kpi_result(&[]), 0.0);
    assert_eq!(compute_competency_result(&[]), 0.0);
    assert_eq!(derive_rating(compute_final_score(0.0, 0.0)), RatingBand::C);
}

#[test]
fn kpi_result_is_weighted_average() {
    let scores = [
        criterion(1, 30.0, 100.0),
        criterion(2, 20.0, 80.0),
        criterion(3, 20.0, 100.0),
        criterion(4, 30.0, 100.0),
    ];

    assert_eq!(compute_kpi_result(&scores), 96.0);
}

#[test]
fn competency_result_weights_levels_by_importance() {
    assert_eq!(
        compute_competency_result(&[competency(1, 3, 5), competency(2, 1, 1)]),
        125.0
    );
    assert_eq!(
        compute_competency_result(&[competency(1, 1, 4), competency(2, 1, 2)]),
        100.0
    );
}

#[test]
fn level_table_is_fixed() {
    let table: Vec<f64> = (1..=5)
        .map(|raw| level_percentage(ProficiencyLevel::new(raw).expect("valid level")))
        .collect();
    assert_eq!(table, vec![50.0, 80.0, 100.0, 120.0, 150.0]);
    assert!(ProficiencyLevel::new(0).is_err());
    assert!(ProficiencyLevel::new(6).is_err());
}

#[test]
fn rating_boundaries_belong_to_higher_band() {
    let cases = [
        (135.0, RatingBand::APlusPlus),
        (134.99, RatingBand::APlus),
        (120.0, RatingBand::APlus),
        (119.99, RatingBand::A),
        (100.0, RatingBand::A),
        (99.99, RatingBand::B),
        (80.0, RatingBand::B),
        (79.99, RatingBand::C),
        (-5.0, RatingBand::C),
        (f64::INFINITY, RatingBand::APlusPlus),
        (f64::NAN, RatingBand::C),
    ];

    for (score, expected) in cases {
        assert_eq!(derive_rating(score), expected, "score {score}");
    }
}

#[test]
fn engine_blends_ninety_ten_and_keeps_full_precision() {
    let engine = ScoringEngine::new(ScoringPolicy::default());
    let inputs = ScoringInputs {
        criteria: vec![criterion(1, 50.0, 130.0), criterion(2, 50.0, 130.0)],
        competencies: vec![competency(1, 3, 5), competency(2, 1, 1)],
    };

    let breakdown = engine.score(&inputs);

    assert_eq!(breakdown.kpi_result, 130.0);
    assert_eq!(breakdown.comp_result, 125.0);
    assert_eq!(breakdown.final_score, 129.5);
    assert_eq!(breakdown.rating, RatingBand::APlus);
    assert_eq!(engine.score(&inputs), breakdown);
}

#[test]
fn display_rounding_happens_outside_the_engine() {
    let breakdown = ScoreBreakdown::from_results(96.04, 100.0);

    assert!((breakdown.final_score - 96.436).abs() < 1e-9);
    assert_eq!(breakdown.rounded().final_score, 96.4);
    assert_eq!(round_for_display(129.96), 130.0);
    assert_eq!(breakdown.rating, RatingBand::B);
}
