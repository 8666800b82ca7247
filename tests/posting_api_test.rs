use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use job_board_backend::{
    config::Config, database::memory::InMemoryPostingRepository,
    middleware::cors::cors_layer, routes, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn setup_app() -> Router {
    let config = Config::default();
    let state = AppState::new(Arc::new(InMemoryPostingRepository::new()), &config);
    routes::router(state, cors_layer(&config.cors_allowed_origins))
}

fn posting_body(header: &str, technology: &str) -> JsonValue {
    json!({
        "recruiterName": "Avery Quinn",
        "recruiterEmail": "  Avery.Quinn@HireWell.io ",
        "recruiterPhone": "415-555-0199",
        "sharePhoneNumber": true,
        "recruiterCompany": "HireWell",
        "jobHeader": header,
        "jobDescription": "Ship features across the stack.",
        "jobRoleName": "Software Engineer",
        "jobPrimaryTechnology": technology,
        "jobLocationState": "WA",
        "jobType": "Full-time",
        "jobPayRatePerHour": 72.5,
        "workLocation": { "remote": true, "hybrid": false, "onsite": false },
        "visaType": "Green Card",
        "autoDeleteInDays": "60 days"
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn create_then_fetch_exposes_contact_fields() {
    let app = setup_app();

    let (status, created) = send(&app, "POST", "/api/jobs", Some(posting_body("Rust Engineer", "Rust"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["_id"], created["id"]);
    assert_eq!(created["jobHeader"], "Rust Engineer");
    assert_eq!(created["jobRoleName"], "Software Engineer");
    assert_eq!(created["recruiterCompany"], "HireWell");
    assert!(created["createdAt"].is_string());

    let (status, fetched) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["recruiterEmail"], "avery.quinn@hirewell.io");
    assert_eq!(fetched["recruiterPhone"], "415-555-0199");
    assert_eq!(fetched["status"], "active");
    assert_eq!(fetched["autoDeleteInDays"], "60 days");
    assert_eq!(fetched["workLocation"]["remote"], true);
    assert!(fetched["expirationDate"].is_string());
}

#[tokio::test]
async fn listing_redacts_contact_fields() {
    let app = setup_app();
    for n in 0..3 {
        let (status, _) = send(&app, "POST", "/api/jobs", Some(posting_body(&format!("Role {n}"), "Go"))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 3);
    assert_eq!(listed["page"], 1);
    assert_eq!(listed["limit"], 10);
    assert_eq!(listed["pages"], 1);

    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["jobHeader"], "Role 2");
    for item in items {
        let object = item.as_object().unwrap();
        assert!(!object.contains_key("recruiterEmail"));
        assert!(!object.contains_key("recruiterPhone"));
        assert_eq!(item["id"], item["_id"]);
    }
}

#[tokio::test]
async fn search_and_filters_travel_through_query_string() {
    let app = setup_app();
    send(&app, "POST", "/api/jobs", Some(posting_body("Web Developer", "JavaScript"))).await;
    send(&app, "POST", "/api/jobs", Some(posting_body("Data Scientist", "Python"))).await;

    let (status, listed) = send(&app, "GET", "/api/jobs?search=java&jobType=Full-time&jobLocationState=WA", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["items"][0]["jobPrimaryTechnology"], "JavaScript");

    let (status, body) = send(&app, "GET", "/api/jobs?jobType=Seasonal", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("jobType must be one of"));
}

#[tokio::test]
async fn invalid_posting_returns_every_message() {
    let app = setup_app();
    let mut body = posting_body("Bad", "Rust");
    body["jobPayRatePerHour"] = json!(-5);
    body["recruiterName"] = json!("");
    body["workLocation"] = json!({ "remote": false, "hybrid": false, "onsite": false });

    let (status, response) = send(&app, "POST", "/api/jobs", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Validation failed");
    let details: Vec<&str> = response["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert!(details.contains(&"recruiterName is required"));
    assert!(details.contains(&"jobPayRatePerHour cannot be negative"));
    assert!(details
        .iter()
        .any(|d| d.starts_with("At least one work location")));
    assert_eq!(details.len(), 3);

    let (_, listed) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn mistyped_field_is_reported_with_other_violations() {
    let app = setup_app();
    let mut body = posting_body("Typed", "Rust");
    body["jobPayRatePerHour"] = json!("abc");
    body["sharePhoneNumber"] = json!("yes");
    body.as_object_mut().unwrap().remove("recruiterName");

    let (status, response) = send(&app, "POST", "/api/jobs", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Validation failed");
    let details: Vec<&str> = response["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert!(details.contains(&"jobPayRatePerHour has an invalid type"));
    assert!(details.contains(&"sharePhoneNumber has an invalid type"));
    assert!(details.contains(&"recruiterName is required"));
    assert_eq!(details.len(), 3);
}

#[tokio::test]
async fn malformed_json_gets_a_json_error() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .body(Body::from("{\"jobHeader\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_uuid_id_is_a_json_bad_request() {
    let app = setup_app();
    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, method, "/api/jobs/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Job posting id must be a UUID");
    }
    let (status, body) = send(&app, "PUT", "/api/jobs/42", Some(json!({ "jobHeader": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Job posting id must be a UUID");
}

#[tokio::test]
async fn huge_page_returns_an_empty_page() {
    let app = setup_app();
    send(&app, "POST", "/api/jobs", Some(posting_body("Only", "Rust"))).await;

    let (status, listed) = send(&app, "GET", &format!("/api/jobs?page={}", i64::MAX), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["items"], json!([]));
}

#[tokio::test]
async fn delete_is_soft() {
    let app = setup_app();
    let (_, created) = send(&app, "POST", "/api/jobs", Some(posting_body("Temp role", "Rust"))).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, deleted) = send(&app, "DELETE", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id.as_str());

    let (_, listed) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(listed["total"], 0);

    let (status, fetched) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "inactive");
}

#[tokio::test]
async fn update_keeps_expiration_and_applies_patch() {
    let app = setup_app();
    let (_, created) = send(&app, "POST", "/api/jobs", Some(posting_body("Initial", "Rust"))).await;
    let id = created["id"].as_str().unwrap().to_string();
    let (_, before) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/jobs/{id}"),
        Some(json!({ "jobHeader": "Renamed", "autoDeleteInDays": "Never" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["jobHeader"], "Renamed");
    assert_eq!(updated["autoDeleteInDays"], "Never");
    assert_eq!(updated["expirationDate"], before["expirationDate"]);
    assert_eq!(updated["recruiterCompany"], "HireWell");
}

#[tokio::test]
async fn unknown_posting_is_not_found() {
    let app = setup_app();
    let id = Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PATCH", &format!("/api/jobs/{id}"), Some(json!({ "jobHeader": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_on_empty_board_are_zero() {
    let app = setup_app();
    let (status, stats) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalJobs"], 0);
    assert_eq!(stats["jobTypeStats"], json!([]));
    assert_eq!(stats["avgHourlyRate"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn stats_list_types_per_posting() {
    let app = setup_app();
    send(&app, "POST", "/api/jobs", Some(posting_body("One", "Rust"))).await;
    let mut contract = posting_body("Two", "Rust");
    contract["jobType"] = json!("Contract");
    contract["jobPayRatePerHour"] = json!(27.5);
    send(&app, "POST", "/api/jobs", Some(contract)).await;

    let (_, stats) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(stats["totalJobs"], 2);
    assert_eq!(stats["jobTypeStats"], json!(["Full-time", "Contract"]));
    assert_eq!(stats["avgHourlyRate"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = setup_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/jobs"].is_object());
}
