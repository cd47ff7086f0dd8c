use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::config::ReviewConfig;
use super::domain::{
    index_entries, CompetencyDetail, CompetencyEntry, CriterionDetail, CriterionEntry,
    EvaluationId, EvaluationRecord, EvaluationStatus, EvaluationSubmission, ManagerReview,
    ManagerReviewInput, PreviewRequest, DEFAULT_PERIOD,
};
use super::manager::{compute_manager_final_score, manager_verdict, MANAGER_SCORE_RANGE};
use super::report::{
    CompetencyLineItem, EvaluationReport, ExportRow, KpiLineItem, ProgressSummary, ReportFilter,
    ReportHeader,
};
use super::repository::{EvaluationRepository, RepositoryError};
use crate::catalog::{
    CatalogError, Competency, CompetencyId, Criterion, CriterionId, ReferenceCatalog,
};
use crate::identity::{DirectoryError, UserDirectory, UserId, UserRecord};
use crate::scoring::{
    ProficiencyLevel, ScoreBreakdown, ScoringEngine, ScoringInputError, ScoringInputs,
};

/// Service composing the catalog, identity directory, repository and scoring engine.
///
/// Preview, recompute and export all funnel through the same [`ScoringEngine`], so the score a
/// user sees while filling the form is the score stored and later exported.
pub struct EvaluationService<R, C, D> {
    repository: Arc<R>,
    catalog: Arc<C>,
    directory: Arc<D>,
    engine: Arc<ScoringEngine>,
    config: ReviewConfig,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// A direct report with their evaluations, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberEvaluations {
    pub employee: UserRecord,
    pub evaluations: Vec<EvaluationRecord>,
}

impl<R, C, D> EvaluationService<R, C, D>
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>, directory: Arc<D>, config: ReviewConfig) -> Self {
        Self {
            repository,
            catalog,
            directory,
            engine: Arc::new(ScoringEngine::new(config.scoring)),
            config,
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Live preview of an in-progress form. Nothing is stored.
    pub fn preview(&self, request: &PreviewRequest) -> Result<ScoreBreakdown, EvaluationServiceError> {
        let user = self.user(request.user_id)?;
        let (criteria, competencies) = self.reference_data(&user.department)?;
        let inputs = self.fresh_inputs(
            &criteria,
            &competencies,
            &request.criteria,
            &request.competencies,
        )?;
        Ok(self.engine.score(&inputs))
    }

    /// Scores and stores a self-assessment. The breakdown is fully computed before the single
    /// repository write, so a failed write never leaves a partial score behind.
    pub fn submit(
        &self,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        let user = self.user(submission.user_id)?;
        let (criteria, competencies) = self.reference_data(&user.department)?;
        let inputs = self.fresh_inputs(
            &criteria,
            &competencies,
            &submission.criteria,
            &submission.competencies,
        )?;
        let breakdown = self.engine.score(&inputs);

        let criterion_comments: BTreeMap<CriterionId, &str> = submission
            .criteria
            .iter()
            .map(|entry| (entry.criterion_id, entry.comment.as_str()))
            .collect();
        let competency_entries: BTreeMap<CompetencyId, &CompetencyEntry> = submission
            .competencies
            .iter()
            .map(|entry| (entry.competency_id, entry))
            .collect();

        let criteria_rows = inputs
            .criteria
            .iter()
            .filter(|score| criterion_comments.contains_key(&score.criterion_id))
            .map(|score| CriterionDetail {
                criterion_id: score.criterion_id,
                achieved_percent: score.achieved_percent,
                comment: criterion_comments
                    .get(&score.criterion_id)
                    .map(|comment| comment.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        let competency_rows = inputs
            .competencies
            .iter()
            .map(|level| {
                let entry = competency_entries.get(&level.competency_id);
                CompetencyDetail {
                    competency_id: level.competency_id,
                    level: level.selected_level,
                    comment: entry.map(|entry| entry.comment.clone()).unwrap_or_default(),
                    defaulted: entry.is_none(),
                }
            })
            .collect();

        let record = EvaluationRecord {
            id: next_evaluation_id(),
            user_id: user.id,
            department: user.department.clone(),
            year: submission.year,
            period: submission
                .period
                .filter(|period| !period.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
            status: EvaluationStatus::Submitted,
            criteria: criteria_rows,
            competencies: competency_rows,
            breakdown,
            employee_comment: submission.overall_comment,
            development_plan: submission.development_plan,
            employee_submitted_at: Utc::now(),
            manager_review: None,
        };

        let stored = self
            .repository
            .insert(record, self.config.period_uniqueness)?;
        info!(
            evaluation_id = %stored.id,
            user_id = %stored.user_id,
            year = stored.year,
            final_score = stored.breakdown.final_score,
            rating = %stored.breakdown.rating,
            "evaluation submitted"
        );
        Ok(stored)
    }

    /// Recomputes a stored evaluation's breakdown from its detail rows, against the catalog of the
    /// department it was submitted under.
    pub fn recompute(&self, id: &EvaluationId) -> Result<ScoreBreakdown, EvaluationServiceError> {
        let record = self.record(id)?;
        let (criteria, competencies) = self.reference_data(&record.department)?;
        let breakdown = self
            .engine
            .score(&self.stored_inputs(&criteria, &competencies, &record));
        debug!(evaluation_id = %id, final_score = breakdown.final_score, "evaluation recomputed");
        Ok(breakdown)
    }

    /// Builds the export payload for one evaluation.
    pub fn export_report(&self, id: &EvaluationId) -> Result<EvaluationReport, EvaluationServiceError> {
        let record = self.record(id)?;
        let user = self.user(record.user_id)?;
        let (criteria, competencies) = self.reference_data(&record.department)?;
        let inputs = self.stored_inputs(&criteria, &competencies, &record);
        let breakdown = self.engine.score(&inputs);

        let kpi_items = inputs
            .criteria
            .iter()
            .zip(&criteria)
            .map(|(score, criterion)| KpiLineItem {
                criterion_id: criterion.id,
                category: criterion.category.clone(),
                kra_name: criterion.kra_name.clone(),
                weight: score.weight,
                achieved_percent: score.achieved_percent,
                weighted_score: score.achieved_percent * score.weight,
                comment: record
                    .criteria
                    .iter()
                    .find(|row| row.criterion_id == criterion.id)
                    .map(|row| row.comment.clone())
                    .unwrap_or_default(),
            })
            .collect();
        let competency_items = inputs
            .competencies
            .iter()
            .zip(&competencies)
            .map(|(level, competency)| {
                let row = record
                    .competencies
                    .iter()
                    .find(|row| row.competency_id == competency.id);
                CompetencyLineItem {
                    competency_id: competency.id,
                    category: competency.category,
                    name: competency.name.clone(),
                    level: level.selected_level.get(),
                    level_descriptor: competency.level_descriptors
                        [usize::from(level.selected_level.get()) - 1]
                        .clone(),
                    percentage: level.percentage(),
                    importance_level: level.importance_level,
                    score: level.contribution(),
                    comment: row.map(|row| row.comment.clone()).unwrap_or_default(),
                    defaulted: row.map(|row| row.defaulted).unwrap_or(true),
                }
            })
            .collect();

        Ok(EvaluationReport {
            evaluation_id: record.id.clone(),
            employee: ReportHeader {
                department: record.department.clone(),
                ..ReportHeader::from(&user)
            },
            year: record.year,
            period: record.period.clone(),
            status: record.status,
            kpi_items,
            competency_items,
            breakdown,
            display: breakdown.rounded(),
            employee_comment: record.employee_comment.clone(),
            development_plan: record.development_plan.clone(),
            manager_comment: record
                .manager_review
                .as_ref()
                .map(|review| review.comment.clone()),
        })
    }

    /// Records the one-time manager review.
    pub fn review(
        &self,
        id: &EvaluationId,
        input: ManagerReviewInput,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        if !input.score.is_finite() || !MANAGER_SCORE_RANGE.contains(&input.score) {
            return Err(EvaluationServiceError::ManagerScoreOutOfRange(input.score));
        }

        let record = self.record(id)?;
        if record.manager_review.is_some() || record.status == EvaluationStatus::ManagerReviewed {
            return Err(EvaluationServiceError::AlreadyReviewed(id.clone()));
        }

        let reviewer = self.user(input.manager_id)?;
        let employee = self.user(record.user_id)?;
        if !reviewer.can_review(&employee) {
            return Err(EvaluationServiceError::ReviewerNotAuthorized {
                reviewer: reviewer.id,
                employee: employee.id,
            });
        }

        let final_score = compute_manager_final_score(record.employee_score(), input.score);
        let review = ManagerReview {
            manager_id: reviewer.id,
            score: input.score,
            comment: input.comment,
            submitted_at: Utc::now(),
            final_score,
            verdict: manager_verdict(input.score),
        };

        let record = match self.repository.record_review(id, review) {
            Ok(record) => record,
            Err(RepositoryError::Conflict) => {
                return Err(EvaluationServiceError::AlreadyReviewed(id.clone()))
            }
            Err(error) => return Err(error.into()),
        };
        info!(
            evaluation_id = %record.id,
            manager_id = %reviewer.id,
            manager_score = input.score,
            final_score,
            "manager review recorded"
        );
        Ok(record)
    }

    pub fn get(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationServiceError> {
        self.record(id)
    }

    pub fn history(&self, user_id: UserId) -> Result<Vec<EvaluationRecord>, EvaluationServiceError> {
        let user = self.user(user_id)?;
        Ok(self.repository.for_user(user.id)?)
    }

    /// Direct reports of `manager_id` and their evaluations.
    pub fn team(&self, manager_id: UserId) -> Result<Vec<TeamMemberEvaluations>, EvaluationServiceError> {
        let manager = self.user(manager_id)?;
        self.directory
            .direct_reports(&manager)?
            .into_iter()
            .map(|employee| -> Result<TeamMemberEvaluations, EvaluationServiceError> {
                let evaluations = self.repository.for_user(employee.id)?;
                Ok(TeamMemberEvaluations {
                    employee,
                    evaluations,
                })
            })
            .collect()
    }

    pub fn progress(&self) -> Result<ProgressSummary, EvaluationServiceError> {
        let records = self.repository.all()?;
        Ok(ProgressSummary::from_records(&records))
    }

    /// Admin export rows, ordered by department then employee code.
    pub fn export_rows(&self, filter: &ReportFilter) -> Result<Vec<ExportRow>, EvaluationServiceError> {
        let mut users: BTreeMap<UserId, UserRecord> = BTreeMap::new();
        let mut rows = Vec::new();
        for record in self.repository.all()? {
            if !filter.matches(&record) {
                continue;
            }
            if !users.contains_key(&record.user_id) {
                let user = self.user(record.user_id)?;
                users.insert(user.id, user);
            }
            let Some(user) = users.get(&record.user_id) else {
                continue;
            };
            rows.push(ExportRow::new(user, &record));
        }

        rows.sort_by(|a, b| {
            (&a.department, &a.code, a.year, &a.evaluation_id)
                .cmp(&(&b.department, &b.code, b.year, &b.evaluation_id))
        });
        Ok(rows)
    }

    fn user(&self, id: UserId) -> Result<UserRecord, EvaluationServiceError> {
        self.directory
            .find(id)?
            .ok_or(EvaluationServiceError::UnknownUser(id))
    }

    fn record(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn reference_data(
        &self,
        department: &str,
    ) -> Result<(Vec<Criterion>, Vec<Competency>), EvaluationServiceError> {
        Ok((
            self.catalog.criteria_for(department)?,
            self.catalog.competencies()?,
        ))
    }

    fn fresh_inputs(
        &self,
        criteria: &[Criterion],
        competencies: &[Competency],
        criterion_entries: &[CriterionEntry],
        competency_entries: &[CompetencyEntry],
    ) -> Result<ScoringInputs, EvaluationServiceError> {
        let (achievements, levels) = index_entries(criterion_entries, competency_entries)?;

        Ok(self
            .engine
            .assemble(criteria, competencies, &achievements, &levels)?)
    }

    fn stored_inputs(
        &self,
        criteria: &[Criterion],
        competencies: &[Competency],
        record: &EvaluationRecord,
    ) -> ScoringInputs {
        let achievements: BTreeMap<CriterionId, f64> = record
            .criteria
            .iter()
            .map(|row| (row.criterion_id, row.achieved_percent))
            .collect();
        let levels: BTreeMap<CompetencyId, ProficiencyLevel> = record
            .competencies
            .iter()
            .map(|row| (row.competency_id, row.level))
            .collect();
        self.engine
            .assemble_stored(criteria, competencies, &achievements, &levels)
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Input(#[from] ScoringInputError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("user {0} not found")]
    UnknownUser(UserId),
    #[error("manager score {0} is outside 0-100")]
    ManagerScoreOutOfRange(f64),
    #[error("evaluation {0} has already been reviewed")]
    AlreadyReviewed(EvaluationId),
    #[error("user {reviewer} may not review evaluations of user {employee}")]
    ReviewerNotAuthorized { reviewer: UserId, employee: UserId },
}
