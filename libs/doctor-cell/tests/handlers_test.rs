use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::{fixed_clock, test_state};

const NOW: &str = "2025-06-01T08:00:00Z";

fn app() -> Router {
    doctor_routes(test_state(fixed_clock(NOW)))
}

fn availability_body() -> String {
    json!({
        "date": "2025-06-10",
        "session": "morning",
        "consulting_start_time": "09:00",
        "consulting_end_time": "12:00",
        "booking_start_date": "2025-06-01",
        "booking_start_time": "09:00",
        "booking_end_date": "2025-06-09",
        "booking_end_time": "18:00"
    })
    .to_string()
}

fn post(uri: &str, subject: Uuid, role: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-subject-id", subject.to_string())
        .header("x-subject-role", role)
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn schedule_setup_over_http() {
    let app = app();
    let doctor_id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post("/availability", doctor_id, "doctor", availability_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let availability_id = body["data"]["created"][0]["availability_id"]
        .as_str()
        .unwrap()
        .to_string();

    let slot_body = json!({
        "availability_id": availability_id,
        "start_time": "09:00",
        "end_time": "09:30"
    })
    .to_string();
    let response = app
        .clone()
        .oneshot(post("/timeslots", doctor_id, "doctor", slot_body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // An identical slot overlaps the first one
    let response = app
        .clone()
        .oneshot(post("/timeslots", doctor_id, "doctor", slot_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patients_cannot_manage_schedules() {
    let response = app()
        .oneshot(post(
            "/availability",
            Uuid::new_v4(),
            "patient",
            availability_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_times_are_bad_requests() {
    let doctor_id = Uuid::new_v4();
    let body = json!({
        "date": "2025-06-10",
        "session": "morning",
        "consulting_start_time": "9am",
        "consulting_end_time": "12:00",
        "booking_start_date": "2025-06-01",
        "booking_start_time": "09:00",
        "booking_end_date": "2025-06-09",
        "booking_end_time": "18:00"
    })
    .to_string();

    let response = app()
        .oneshot(post("/availability", doctor_id, "doctor", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
