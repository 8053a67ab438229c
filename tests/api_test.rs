mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use timetable::api::router;
use timetable::state::AppState;
use timetable::store::MemoryStore;

fn app() -> Router {
    router(AppState {
        timetable: common::service(Arc::new(MemoryStore::new())),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn period_body(class_id: &str, subject_id: &str, teacher_id: &str) -> Value {
    json!({
        "day": "Mon",
        "period": 1,
        "class_id": class_id,
        "subject_id": subject_id,
        "teacher_id": teacher_id,
        "room": "201"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, _) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_conflicts_over_http() {
    let app = app();

    let (status, created) = send(&app, "POST", "/periods", Some(period_body("C1", "math", "T1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["day"], "Monday");
    assert_eq!(created["room"], "201");

    let (status, body) = send(&app, "POST", "/periods", Some(period_body("C1", "eng", "T2"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "class_slot_conflict");
    assert_eq!(body["message"], "time slot already occupied for this class");

    let (status, body) = send(&app, "POST", "/periods", Some(period_body("C2", "eng", "T1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "teacher_slot_conflict");
    assert_eq!(body["message"], "teacher already assigned elsewhere in this slot");

    let (status, body) = send(&app, "POST", "/periods", Some(period_body("C9", "eng", "T2"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, free) = send(&app, "GET", "/teachers/free?day=Monday&period=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = free
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["T2", "T3", "T4", "T5"]);

    let (status, free) =
        send(&app, "GET", "/teachers/free?day=mon&period=1&department=Science", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(free.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_input_is_a_validation_error() {
    let app = app();

    let mut sunday = period_body("C1", "math", "T1");
    sunday["day"] = json!("Sunday");
    let (status, body) = send(&app, "POST", "/periods", Some(sunday)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("Sunday"));

    let (status, body) = send(
        &app,
        "POST",
        "/periods",
        Some(json!({ "day": "Mon", "period": 1, "class_id": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(&app, "GET", "/teachers/free?day=Sunday&period=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(&app, "GET", "/teachers/free?day=Mon&period=300", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(&app, "GET", "/teachers/free", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_without_body_uses_full_week() {
    let app = app();

    let (status, report) = send(&app, "POST", "/classes/C1/timetable/generate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["slots_total"], 48);
    assert_eq!(report["slots_filled"], 48);
}

#[tokio::test]
async fn test_delete_over_http() {
    let app = app();
    let (_, created) = send(&app, "POST", "/periods", Some(period_body("C1", "math", "T1"))).await;
    let uri = format!("/periods/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_generate_and_view_over_http() {
    let app = app();

    let (status, report) = send(
        &app,
        "POST",
        "/classes/C1/timetable/generate",
        Some(json!({ "number_of_days": 5, "periods_per_day": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["slots_total"], 40);
    assert_eq!(report["slots_filled"], 40);

    let (status, grid) = send(&app, "GET", "/classes/C1/timetable", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["class_id"], "C1");
    assert_eq!(grid["rows"].as_array().unwrap().len(), 6);
    assert_eq!(grid["rows"][0]["cells"][0]["status"], "occupied");
    assert_eq!(grid["rows"][5]["cells"][0]["status"], "free");
    assert_eq!(grid["subject_colors"].as_object().unwrap().len(), 3);

    let (status, teacher) = send(&app, "GET", "/teachers/T2/timetable", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!teacher["free_periods"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/classes/C1/timetable/generate",
        Some(json!({ "periods_per_day": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(&app, "GET", "/classes/C9/timetable", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
