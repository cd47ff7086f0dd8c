use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manager::ManagerVerdict;
use crate::catalog::{CompetencyId, CriterionId};
use crate::identity::UserId;
use crate::scoring::{ProficiencyLevel, RatingBand, ScoreBreakdown, ScoringInputError};

/// Period label used when a submission does not name one.
pub const DEFAULT_PERIOD: &str = "Annual";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Saved but not submitted. This service only stores submitted forms; the state exists for
    /// records loaded from storage that also keeps unfinished forms.
    Draft,
    Submitted,
    ManagerReviewed,
}

impl EvaluationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationStatus::Draft => "draft",
            EvaluationStatus::Submitted => "submitted",
            EvaluationStatus::ManagerReviewed => "manager_reviewed",
        }
    }
}

/// Achievement entered against one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionEntry {
    pub criterion_id: CriterionId,
    pub achieved_percent: f64,
    #[serde(default)]
    pub comment: String,
}

/// Level selected for one competency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyEntry {
    pub competency_id: CompetencyId,
    pub level: ProficiencyLevel,
    #[serde(default)]
    pub comment: String,
}

/// Keys form entries by id, refusing an id entered twice.
pub fn index_entries(
    criteria: &[CriterionEntry],
    competencies: &[CompetencyEntry],
) -> Result<(BTreeMap<CriterionId, f64>, BTreeMap<CompetencyId, ProficiencyLevel>), ScoringInputError>
{
    let mut achievements = BTreeMap::new();
    for entry in criteria {
        if achievements
            .insert(entry.criterion_id, entry.achieved_percent)
            .is_some()
        {
            return Err(ScoringInputError::DuplicateCriterion(entry.criterion_id));
        }
    }

    let mut levels = BTreeMap::new();
    for entry in competencies {
        if levels.insert(entry.competency_id, entry.level).is_some() {
            return Err(ScoringInputError::DuplicateCompetency(entry.competency_id));
        }
    }

    Ok((achievements, levels))
}

/// In-progress form values sent for a live preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub criteria: Vec<CriterionEntry>,
    #[serde(default)]
    pub competencies: Vec<CompetencyEntry>,
}

/// Completed self-assessment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub user_id: UserId,
    pub year: i32,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub criteria: Vec<CriterionEntry>,
    #[serde(default)]
    pub competencies: Vec<CompetencyEntry>,
    #[serde(default)]
    pub overall_comment: String,
    #[serde(default)]
    pub development_plan: String,
}

/// Stored per-criterion row. `achieved_percent` is the value the score was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDetail {
    pub criterion_id: CriterionId,
    pub achieved_percent: f64,
    pub comment: String,
}

/// Stored per-competency row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyDetail {
    pub competency_id: CompetencyId,
    pub level: ProficiencyLevel,
    pub comment: String,
    /// Set when the employee left the competency unscored and the default level was applied.
    pub defaulted: bool,
}

/// Manager input for the one-time review of a submitted evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerReviewInput {
    pub manager_id: UserId,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerReview {
    pub manager_id: UserId,
    pub score: f64,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
    /// Manager-side final score; see [`super::manager::compute_manager_final_score`].
    pub final_score: f64,
    pub verdict: ManagerVerdict,
}

/// One review cycle for one employee. Append-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub user_id: UserId,
    /// Department whose catalog the form was scored against. Recompute and export use this, not
    /// the employee's current department.
    pub department: String,
    pub year: i32,
    pub period: String,
    pub status: EvaluationStatus,
    pub criteria: Vec<CriterionDetail>,
    pub competencies: Vec<CompetencyDetail>,
    /// Breakdown computed at submission; `final_score` is the employee score.
    pub breakdown: ScoreBreakdown,
    pub employee_comment: String,
    pub development_plan: String,
    pub employee_submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub manager_review: Option<ManagerReview>,
}

impl EvaluationRecord {
    pub fn employee_score(&self) -> f64 {
        self.breakdown.final_score
    }

    pub fn manager_score(&self) -> Option<f64> {
        self.manager_review.as_ref().map(|review| review.score)
    }

    /// Manager-side final score once reviewed, otherwise the employee score.
    pub fn final_score(&self) -> f64 {
        self.manager_review
            .as_ref()
            .map(|review| review.final_score)
            .unwrap_or_else(|| self.employee_score())
    }

    /// Attaches the manager review and marks the record reviewed. Returns `false` without touching
    /// the record when a review is already present.
    pub fn attach_review(&mut self, review: ManagerReview) -> bool {
        if self.manager_review.is_some() || self.status == EvaluationStatus::ManagerReviewed {
            return false;
        }
        self.manager_review = Some(review);
        self.status = EvaluationStatus::ManagerReviewed;
        true
    }

    pub fn same_period(&self, other: &EvaluationRecord) -> bool {
        self.user_id == other.user_id && self.year == other.year && self.period == other.period
    }

    pub fn summary_view(&self) -> EvaluationSummaryView {
        let rounded = self.breakdown.rounded();
        EvaluationSummaryView {
            evaluation_id: self.id.clone(),
            user_id: self.user_id,
            year: self.year,
            period: self.period.clone(),
            status: self.status.label(),
            kpi_result: rounded.kpi_result,
            comp_result: rounded.comp_result,
            employee_score: rounded.final_score,
            rating: self.breakdown.rating,
            manager_score: self.manager_score(),
            manager_final_score: self
                .manager_review
                .as_ref()
                .map(|review| crate::scoring::round_for_display(review.final_score)),
            manager_verdict: self
                .manager_review
                .as_ref()
                .map(|review| review.verdict.label()),
        }
    }
}

/// Display-rounded representation returned from list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummaryView {
    pub evaluation_id: EvaluationId,
    pub user_id: UserId,
    pub year: i32,
    pub period: String,
    pub status: &'static str,
    pub kpi_result: f64,
    pub comp_result: f64,
    pub employee_score: f64,
    pub rating: RatingBand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_verdict: Option<&'static str>,
}
