use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::catalog::StaticCatalog;
use crate::evaluation::EvaluationService;
use crate::evaluation::ReviewConfig;

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn preview_route_returns_breakdown_and_display_figures() {
    let (service, repository) = build_service();
    let router = router_with_service(service);
    let payload = serde_json::to_value(preview_request(&sales_submission())).expect("serializes");

    let response = router
        .oneshot(json_request("POST", "/api/v1/evaluations/preview", payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.get("rating"), Some(&json!("B")));
    assert_eq!(body.get("kpi_result").and_then(Value::as_f64), Some(96.0));
    assert_eq!(body.get("weighted_competency").and_then(Value::as_f64), Some(10.0));
    assert_eq!(
        body.pointer("/display/final_score").and_then(Value::as_f64),
        Some(96.4)
    );
    assert_eq!(repository.len(), 0, "preview stores nothing");
}

#[tokio::test]
async fn submit_route_creates_evaluation() {
    let (service, repository) = build_service();
    let router = router_with_service(service);
    let payload = serde_json::to_value(sales_submission()).expect("serializes");

    let response = router
        .oneshot(json_request("POST", "/api/v1/evaluations", payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert!(body
        .get("evaluation_id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with("eval-")));
    assert_eq!(body.get("status"), Some(&json!("submitted")));
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn submit_handler_rejects_unknown_criterion() {
    let (service, _) = build_service();
    let mut submission = sales_submission();
    submission.criteria.push(criterion(42, 90.0));

    let response = crate::evaluation::router::submit_handler::<
        MemoryRepository,
        StaticCatalog,
        MemoryDirectory,
    >(State(Arc::new(service)), axum::Json(submission))
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("42"));
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(EvaluationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(StaticCatalog::standard()),
        Arc::new(MemoryDirectory::new(users())),
        ReviewConfig::default(),
    ));

    let response = crate::evaluation::router::submit_handler::<
        UnavailableRepository,
        StaticCatalog,
        MemoryDirectory,
    >(State(service), axum::Json(sales_submission()))
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn record_route_returns_not_found_for_unknown_id() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/evaluations/eval-missing"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_handler_includes_recomputed_breakdown() {
    let (service, _) = build_service();
    let record = service.submit(sales_submission()).expect("submission stored");

    let response = crate::evaluation::router::record_handler::<
        MemoryRepository,
        StaticCatalog,
        MemoryDirectory,
    >(State(Arc::new(service)), axum::extract::Path(record.id.0.clone()))
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body.pointer("/record/breakdown/final_score"),
        body.pointer("/recomputed/final_score")
    );
    assert_eq!(body.pointer("/recomputed/rating"), Some(&json!("B")));
}

#[tokio::test]
async fn second_review_returns_conflict() {
    let (service, _) = build_service();
    let record = service.submit(sales_submission()).expect("submission stored");
    let router = router_with_service(service);
    let uri = format!("/api/v1/evaluations/{}/review", record.id);
    let payload = serde_json::to_value(manager_review(80.0)).expect("serializes");

    let first = router
        .clone()
        .oneshot(json_request("POST", &uri, payload.clone()))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::OK);
    let body = read_json_body(first).await;
    assert_eq!(body.get("manager_verdict"), Some(&json!("pass")));

    let second = router
        .oneshot(json_request("POST", &uri, payload))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn review_by_unrelated_manager_is_forbidden() {
    let (service, _) = build_service();
    let record = service.submit(sales_submission()).expect("submission stored");
    let router = router_with_service(service);
    let mut review = manager_review(80.0);
    review.manager_id = OTHER_MANAGER;

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/evaluations/{}/review", record.id),
            serde_json::to_value(review).expect("serializes"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn history_route_lists_summaries() {
    let (service, _) = build_service();
    service.submit(sales_submission()).expect("submission stored");
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request(&format!("/api/v1/users/{}/evaluations", EMPLOYEE)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let items = body.as_array().expect("array payload");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("employee_score").and_then(Value::as_f64), Some(96.4));
}

#[tokio::test]
async fn csv_export_route_sets_content_type() {
    let (service, _) = build_service();
    service.submit(sales_submission()).expect("submission stored");
    service.submit(office_submission()).expect("submission stored");
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/reports/evaluations.csv?department=Sales"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(body.to_vec()).expect("utf8 body");
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("EMP001"));
    assert!(!text.contains("EMP002"));
}

#[tokio::test]
async fn progress_route_counts_records() {
    let (service, _) = build_service();
    service.submit(sales_submission()).expect("submission stored");
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/reports/progress"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "total": 1, "submitted": 1, "reviewed": 0 }));
}
