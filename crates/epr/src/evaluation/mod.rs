//! Evaluation records and the review workflow around the scoring engine: submission, history
//! recompute, export, manager review and the admin reports.

mod config;
pub mod domain;
pub mod manager;
pub mod memory;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::ReviewConfig;
pub use domain::{
    index_entries, CompetencyDetail, CompetencyEntry, CriterionDetail, CriterionEntry,
    EvaluationId, EvaluationRecord, EvaluationStatus, EvaluationSubmission,
    EvaluationSummaryView, ManagerReview, ManagerReviewInput, PreviewRequest, DEFAULT_PERIOD,
};
pub use manager::{
    compute_manager_final_score, manager_verdict, ManagerVerdict, MANAGER_PASS_THRESHOLD,
};
pub use memory::InMemoryEvaluationRepository;
pub use report::{
    write_csv, CompetencyLineItem, EvaluationReport, ExportRow, KpiLineItem, ProgressSummary,
    ReportFilter,
};
pub use repository::{EvaluationRepository, PeriodUniqueness, RepositoryError};
pub use router::evaluation_router;
pub use service::{EvaluationService, EvaluationServiceError, TeamMemberEvaluations};
