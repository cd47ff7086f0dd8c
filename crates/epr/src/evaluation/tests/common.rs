use std::sync::{Arc, Barrier};

use axum::response::Response;
use serde_json::Value;

use crate::catalog::{CompetencyId, CriterionId, StaticCatalog};
use crate::evaluation::domain::{
    CompetencyEntry, CriterionEntry, EvaluationId, EvaluationRecord, EvaluationSubmission,
    ManagerReview, ManagerReviewInput, PreviewRequest,
};
use crate::evaluation::repository::{EvaluationRepository, PeriodUniqueness, RepositoryError};
use crate::evaluation::{
    evaluation_router, EvaluationService, InMemoryEvaluationRepository, ReviewConfig,
};
use crate::identity::{DirectoryError, Role, UserDirectory, UserId, UserRecord};
use crate::scoring::ProficiencyLevel;

pub(super) const ADMIN: UserId = UserId(1);
pub(super) const MANAGER: UserId = UserId(2);
pub(super) const EMPLOYEE: UserId = UserId(3);
pub(super) const OFFICE_EMPLOYEE: UserId = UserId(4);
pub(super) const OTHER_MANAGER: UserId = UserId(5);

pub(super) type TestService = EvaluationService<MemoryRepository, StaticCatalog, MemoryDirectory>;

fn user(id: UserId, code: &str, department: &str, role: Role, manager: Option<&str>) -> UserRecord {
    UserRecord {
        id,
        code: code.to_string(),
        fullname: format!("{code} Test"),
        department: department.to_string(),
        role,
        manager_code: manager.map(str::to_string),
    }
}

pub(super) fn users() -> Vec<UserRecord> {
    vec![
        user(ADMIN, "ADMIN001", "IT", Role::Admin, None),
        user(MANAGER, "MGR001", "Sales", Role::Manager, None),
        user(EMPLOYEE, "EMP001", "Sales", Role::Employee, Some("MGR001")),
        user(OFFICE_EMPLOYEE, "EMP002", "Office", Role::Employee, Some("MGR002")),
        user(OTHER_MANAGER, "MGR002", "Office", Role::Manager, None),
    ]
}

pub(super) fn level(raw: u8) -> ProficiencyLevel {
    ProficiencyLevel::new(raw).expect("valid level")
}

pub(super) fn criterion(id: u32, achieved_percent: f64) -> CriterionEntry {
    CriterionEntry {
        criterion_id: CriterionId(id),
        achieved_percent,
        comment: format!("note {id}"),
    }
}

pub(super) fn competency(id: u32, raw: u8) -> CompetencyEntry {
    CompetencyEntry {
        competency_id: CompetencyId(id),
        level: level(raw),
        comment: String::new(),
    }
}

/// Sales form scoring KPI 96.0 and competencies 100.0; competency 3 is left unscored.
pub(super) fn sales_submission() -> EvaluationSubmission {
    EvaluationSubmission {
        user_id: EMPLOYEE,
        year: 2025,
        period: None,
        criteria: vec![
            criterion(1, 100.0),
            criterion(2, 80.0),
            criterion(3, 100.0),
            criterion(4, 100.0),
        ],
        competencies: vec![competency(1, 3), competency(2, 3)],
        overall_comment: "Solid year".to_string(),
        development_plan: "Negotiation course in Q1".to_string(),
    }
}

pub(super) fn office_submission() -> EvaluationSubmission {
    EvaluationSubmission {
        user_id: OFFICE_EMPLOYEE,
        year: 2025,
        period: Some("Annual".to_string()),
        criteria: vec![
            criterion(5, 120.0),
            criterion(6, 120.0),
            criterion(7, 120.0),
            criterion(8, 120.0),
        ],
        competencies: vec![competency(1, 4), competency(2, 4), competency(3, 4)],
        overall_comment: String::new(),
        development_plan: String::new(),
    }
}

pub(super) fn preview_request(submission: &EvaluationSubmission) -> PreviewRequest {
    PreviewRequest {
        user_id: submission.user_id,
        criteria: submission.criteria.clone(),
        competencies: submission.competencies.clone(),
    }
}

pub(super) fn manager_review(score: f64) -> ManagerReviewInput {
    ManagerReviewInput {
        manager_id: MANAGER,
        score,
        comment: "Keep it up".to_string(),
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>) {
    build_service_with(ReviewConfig::default())
}

pub(super) fn build_service_with(config: ReviewConfig) -> (TestService, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = EvaluationService::new(
        repository.clone(),
        Arc::new(StaticCatalog::standard()),
        Arc::new(MemoryDirectory::new(users())),
        config,
    );
    (service, repository)
}

pub(super) type MemoryRepository = InMemoryEvaluationRepository;

/// Holds every `fetch` at a barrier so concurrent callers pass their pre-checks together.
pub(super) struct GatedRepository {
    pub(super) inner: MemoryRepository,
    pub(super) gate: Arc<Barrier>,
}

impl EvaluationRepository for GatedRepository {
    fn insert(
        &self,
        record: EvaluationRecord,
        uniqueness: PeriodUniqueness,
    ) -> Result<EvaluationRecord, RepositoryError> {
        self.inner.insert(record, uniqueness)
    }

    fn record_review(
        &self,
        id: &EvaluationId,
        review: ManagerReview,
    ) -> Result<EvaluationRecord, RepositoryError> {
        self.inner.record_review(id, review)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let found = self.inner.fetch(id);
        self.gate.wait();
        found
    }

    fn for_user(&self, user_id: UserId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        self.inner.for_user(user_id)
    }

    fn all(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(
        &self,
        _record: EvaluationRecord,
        _uniqueness: PeriodUniqueness,
    ) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_review(
        &self,
        _id: &EvaluationId,
        _review: ManagerReview,
    ) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_user(&self, _user_id: UserId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct MemoryDirectory {
    users: Vec<UserRecord>,
}

impl MemoryDirectory {
    pub(super) fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }
}

impl UserDirectory for MemoryDirectory {
    fn find(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    fn direct_reports(&self, manager: &UserRecord) -> Result<Vec<UserRecord>, DirectoryError> {
        Ok(self
            .users
            .iter()
            .filter(|user| user.reports_to(manager))
            .cloned()
            .collect())
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    evaluation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
