use serde::{Deserialize, Serialize};

use super::domain::{EvaluationId, EvaluationRecord, ManagerReview};
use crate::identity::UserId;

/// Whether a second evaluation for the same (user, year, period) may be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUniqueness {
    /// Append another record; concurrent submissions may both land.
    #[default]
    AllowDuplicates,
    /// Refuse the insert with [`RepositoryError::Conflict`]. Must be checked atomically with the
    /// write.
    Enforce,
}

/// Storage abstraction for evaluation headers and their detail rows.
pub trait EvaluationRepository: Send + Sync {
    /// Persists a record together with all of its detail rows as one unit.
    fn insert(
        &self,
        record: EvaluationRecord,
        uniqueness: PeriodUniqueness,
    ) -> Result<EvaluationRecord, RepositoryError>;
    /// Attaches the one-time manager review. The already-reviewed check must happen atomically
    /// with the write: [`RepositoryError::Conflict`] when a review exists, `NotFound` when the
    /// record does not.
    fn record_review(
        &self,
        id: &EvaluationId,
        review: ManagerReview,
    ) -> Result<EvaluationRecord, RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    /// Evaluations for one user, newest first.
    fn for_user(&self, user_id: UserId) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
