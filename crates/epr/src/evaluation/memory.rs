use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{EvaluationId, EvaluationRecord, ManagerReview};
use super::repository::{EvaluationRepository, PeriodUniqueness, RepositoryError};
use crate::identity::UserId;

/// Process-local repository. Uniqueness and review checks run under the same lock as the write.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl InMemoryEvaluationRepository {
    pub fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(
        &self,
        record: EvaluationRecord,
        uniqueness: PeriodUniqueness,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if uniqueness == PeriodUniqueness::Enforce
            && guard.values().any(|existing| existing.same_period(&record))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn record_review(
        &self,
        id: &EvaluationId,
        review: ManagerReview,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if !record.attach_review(review) {
            return Err(RepositoryError::Conflict);
        }
        Ok(record.clone())
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_user(&self, user_id: UserId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<EvaluationRecord> = guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            (b.employee_submitted_at, &b.id).cmp(&(a.employee_submitted_at, &a.id))
        });
        Ok(records)
    }

    fn all(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}
