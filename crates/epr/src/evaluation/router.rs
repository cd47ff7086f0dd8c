use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{
    EvaluationId, EvaluationRecord, EvaluationSubmission, EvaluationSummaryView,
    ManagerReviewInput, PreviewRequest,
};
use super::report::{write_csv, ReportFilter};
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError};
use crate::catalog::ReferenceCatalog;
use crate::identity::{UserDirectory, UserId};
use crate::scoring::{RoundedScores, ScoreBreakdown};

/// Router builder exposing the preview, submission, review and reporting endpoints.
pub fn evaluation_router<R, C, D>(service: Arc<EvaluationService<R, C, D>>) -> Router
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/evaluations/preview",
            post(preview_handler::<R, C, D>),
        )
        .route("/api/v1/evaluations", post(submit_handler::<R, C, D>))
        .route(
            "/api/v1/evaluations/:evaluation_id",
            get(record_handler::<R, C, D>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/report",
            get(report_handler::<R, C, D>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/review",
            post(review_handler::<R, C, D>),
        )
        .route(
            "/api/v1/users/:user_id/evaluations",
            get(history_handler::<R, C, D>),
        )
        .route(
            "/api/v1/managers/:user_id/team",
            get(team_handler::<R, C, D>),
        )
        .route(
            "/api/v1/reports/progress",
            get(progress_handler::<R, C, D>),
        )
        .route(
            "/api/v1/reports/evaluations",
            get(export_rows_handler::<R, C, D>),
        )
        .route(
            "/api/v1/reports/evaluations.csv",
            get(export_csv_handler::<R, C, D>),
        )
        .with_state(service)
}

/// Live preview payload: raw breakdown plus the figures shown on the form.
#[derive(Debug, Serialize)]
pub struct PreviewView {
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
    pub weighted_kpi: f64,
    pub weighted_competency: f64,
    pub display: RoundedScores,
}

impl From<ScoreBreakdown> for PreviewView {
    fn from(breakdown: ScoreBreakdown) -> Self {
        Self {
            breakdown,
            weighted_kpi: breakdown.weighted_kpi(),
            weighted_competency: breakdown.weighted_competency(),
            display: breakdown.rounded(),
        }
    }
}

/// Stored record alongside the breakdown recomputed from its detail rows.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub record: EvaluationRecord,
    pub recomputed: ScoreBreakdown,
}

pub(crate) fn status_for(error: &EvaluationServiceError) -> StatusCode {
    match error {
        EvaluationServiceError::Input(_)
        | EvaluationServiceError::ManagerScoreOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationServiceError::UnknownUser(_)
        | EvaluationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Repository(RepositoryError::Conflict)
        | EvaluationServiceError::AlreadyReviewed(_) => StatusCode::CONFLICT,
        EvaluationServiceError::ReviewerNotAuthorized { .. } => StatusCode::FORBIDDEN,
        EvaluationServiceError::Catalog(_)
        | EvaluationServiceError::Directory(_)
        | EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: EvaluationServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

pub(crate) async fn preview_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    axum::Json(request): axum::Json<PreviewRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.preview(&request) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(PreviewView::from(breakdown))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    axum::Json(submission): axum::Json<EvaluationSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    let id = EvaluationId(evaluation_id);
    let result = service
        .get(&id)
        .and_then(|record| Ok((record, service.recompute(&id)?)));
    match result {
        Ok((record, recomputed)) => (
            StatusCode::OK,
            axum::Json(RecordView { record, recomputed }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.export_report(&EvaluationId(evaluation_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(input): axum::Json<ManagerReviewInput>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.review(&EvaluationId(evaluation_id), input) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Path(user_id): Path<u32>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.history(UserId(user_id)) {
        Ok(records) => {
            let views: Vec<EvaluationSummaryView> =
                records.iter().map(EvaluationRecord::summary_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn team_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Path(user_id): Path<u32>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.team(UserId(user_id)) {
        Ok(team) => (StatusCode::OK, axum::Json(team)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.progress() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_rows_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Query(filter): Query<ReportFilter>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    match service.export_rows(&filter) {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_csv_handler<R, C, D>(
    State(service): State<Arc<EvaluationService<R, C, D>>>,
    Query(filter): Query<ReportFilter>,
) -> Response
where
    R: EvaluationRepository + 'static,
    C: ReferenceCatalog + 'static,
    D: UserDirectory + 'static,
{
    let rows = match service.export_rows(&filter) {
        Ok(rows) => rows,
        Err(error) => return error_response(error),
    };

    let mut body = Vec::new();
    if let Err(error) = write_csv(&rows, &mut body) {
        let payload = json!({
            "error": format!("csv export failed: {error}"),
        });
        return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response()
}
