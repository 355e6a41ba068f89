use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::scheduling::router::{delete_handler, get_handler};
use crate::scheduling::{scheduling_router, ClassEditor, SchedulingService};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
        .expect("request")
}

#[tokio::test]
async fn post_class_returns_created_id() {
    let (service, _store) = build_service();
    let router = scheduling_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/classes",
            json!({
                "student_id": "marcos",
                "date": "2024-03-12",
                "start_time": "17:30",
                "duration_minutes": 90,
                "type": "practice",
                "price": 18000
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn post_paid_class_without_method_is_unprocessable() {
    let (service, store) = build_service();
    let router = scheduling_router(service);
    let before = crate::store::SnapshotSource::snapshot(store.as_ref()).classes.len();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/classes",
            json!({
                "student_id": "marcos",
                "date": "2024-03-12",
                "start_time": "10:00",
                "payment_status": "paid",
                "price": 15000
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "payment_method");
    assert_eq!(
        crate::store::SnapshotSource::snapshot(store.as_ref()).classes.len(),
        before
    );
}

#[tokio::test]
async fn post_with_unbounded_price_is_unprocessable() {
    let (service, store) = build_service();
    let router = scheduling_router(service);
    let before = crate::store::SnapshotSource::snapshot(store.as_ref()).classes.len();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/classes",
            json!({
                "student_id": "marcos",
                "date": "2024-03-12",
                "start_time": "10:00",
                "price": u64::MAX / 2 + 1
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "price");
    assert_eq!(
        crate::store::SnapshotSource::snapshot(store.as_ref()).classes.len(),
        before
    );
}

#[tokio::test]
async fn suggestion_reports_promo_slot() {
    let (service, _store) = build_service();
    let response = scheduling_router(service)
        .oneshot(json_request(
            "POST",
            "/api/v1/classes/suggestion",
            json!({ "student_id": "lucia" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["ordinal"], 3);
    assert_eq!(body["price"], 9000);
    assert_eq!(body["payment_method"], "cash");
    assert_eq!(body["promo"]["position"], 3);
}

#[tokio::test]
async fn patch_merges_changes() {
    let (service, _store) = build_service();
    let response = scheduling_router(Arc::clone(&service))
        .oneshot(json_request(
            "PATCH",
            "/api/v1/classes/c-1",
            json!({ "start_time": "23:30", "duration_minutes": 60 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let class = service.get(&"c-1".into()).expect("present");
    assert_eq!(class.end_time.to_string(), "00:30:00");
}

#[tokio::test]
async fn week_view_is_served() {
    let (service, _store) = build_service();
    let response = scheduling_router(service)
        .oneshot(
            Request::get("/api/v1/calendar/week?date=2024-03-06&student=lucia")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["start"], "2024-03-04");
    assert_eq!(body["days"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn malformed_month_is_bad_request() {
    let (service, _store) = build_service();
    let response = scheduling_router(service)
        .oneshot(
            Request::get("/api/v1/calendar/month?month=2024-13")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_class_is_not_found() {
    let (service, _store) = build_service();
    let response = get_handler::<crate::store::MemoryStore>(
        State(service),
        Path("missing".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_delete_maps_to_forbidden() {
    let service = Arc::new(SchedulingService::new(
        Arc::new(RejectingStore::new()),
        ClassEditor::default(),
    ));
    let response = delete_handler::<RejectingStore>(State(service), Path("c-1".to_string())).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("permission denied")));
}
