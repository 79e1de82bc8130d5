//! Router tests: real handlers over an in-memory `SqliteStore`.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{Datelike, Duration};
use piso_core::{practitioner::NewPractitioner, store::ClinicStore};
use piso_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, auth::hash_password, router, today};

const SPANISH_DAYS: [&str; 7] =
  ["lunes", "martes", "miercoles", "jueves", "viernes", "sabado", "domingo"];

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  for username in ["ana", "eva"] {
    store
      .create_practitioner(NewPractitioner {
        username:       username.into(),
        practice_name:  format!("Consulta {username}"),
        license_number: String::new(),
        password_hash:  hash_password("secreto").unwrap(),
      })
      .await
      .unwrap();
  }
  AppState::new(store)
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

async fn send(
  state: &AppState<SqliteStore>,
  user: &str,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::AUTHORIZATION, basic(user, "secreto"));
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn create_patient(state: &AppState<SqliteStore>, user: &str, body: Value) -> Uuid {
  let resp = send(state, user, "POST", "/patients", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let v = json_body(resp).await;
  v["patient_id"].as_str().unwrap().parse().unwrap()
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_or_wrong_credentials_return_401() {
  let state = make_state().await;

  let resp = router(state.clone())
    .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  let resp = router(state)
    .oneshot(
      Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, basic("ana", "incorrecta"))
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_user_returns_401() {
  let state = make_state().await;
  let resp = send(&state, "nadie", "GET", "/me", None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(json_body(resp).await, json!({ "error": "unauthorized" }));
}

#[tokio::test]
async fn me_returns_profile() {
  let state = make_state().await;
  let resp = send(&state, "ana", "GET", "/me", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let v = json_body(resp).await;
  assert_eq!(v["username"], "ana");
  assert_eq!(v["practice_name"], "Consulta ana");
  assert!(v.get("password_hash").is_none());
}

// ─── Patients ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patient_lifecycle_with_timeline() {
  let state = make_state().await;
  let today = today();
  let anchor = SPANISH_DAYS[today.weekday().num_days_from_monday() as usize];
  let registered = today - Duration::days(14);

  let id = create_patient(
    &state,
    "ana",
    json!({
      "full_name": "  María Pérez ",
      "age": 31,
      "pregnancy": {
        "active": true,
        "weeks_at_registration": 12,
        "anchor_weekday": anchor,
        "registration_date": registered,
      }
    }),
  )
  .await;

  let resp = send(&state, "ana", "GET", &format!("/patients/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let v = json_body(resp).await;
  assert_eq!(v["full_name"], "María Pérez");
  assert_eq!(v["display_name"], "María Pérez (31 años)");
  assert!(v["timelines"]["pregnancy"]["anchor_day"].is_string());
  assert_eq!(v["timelines"]["pregnancy"]["current_weeks"], 14);
  assert_eq!(v["timelines"]["pregnancy"]["label"], "🤰 14 semanas");
  assert_eq!(v["timelines"]["postpartum"]["active"], false);

  let resp = send(&state, "ana", "GET", &format!("/patients/{id}/timeline"), None).await;
  let v = json_body(resp).await;
  assert_eq!(v["pregnancy"]["current_weeks"], 14);

  let resp = send(
    &state,
    "ana",
    "PUT",
    &format!("/patients/{id}"),
    Some(json!({ "full_name": "María Pérez", "age": 31 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let v = json_body(resp).await;
  assert_eq!(v["pregnancy"]["is_active"], false);
  assert_eq!(v["pregnancy"]["weeks_at_registration"], Value::Null);
  assert_eq!(v["timelines"]["pregnancy"]["label"], Value::Null);

  let resp = send(&state, "ana", "DELETE", &format!("/patients/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let resp = send(&state, "ana", "GET", &format!("/patients/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_patient_returns_field_errors() {
  let state = make_state().await;
  let resp = send(
    &state,
    "ana",
    "POST",
    "/patients",
    Some(json!({
      "full_name": " ",
      "age": 30,
      "pregnancy": { "active": true, "weeks_at_registration": 50 }
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let v = json_body(resp).await;
  assert!(v["errors"]["full_name"].is_array());
  assert!(v["errors"]["pregnancy.weeks_at_registration"].is_array());
}

#[tokio::test]
async fn malformed_body_returns_400() {
  let state = make_state().await;
  let resp = send(
    &state,
    "ana",
    "POST",
    "/patients",
    Some(json!({ "full_name": "Ana", "age": "treinta" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_sort_returns_json_400() {
  let state = make_state().await;
  for uri in [
    "/patients?sort=bogus",
    "/patients?order=sideways",
    "/dashboard?sort=bogus",
  ] {
    let resp = send(&state, "ana", "GET", uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    let v = json_body(resp).await;
    assert!(v["error"].is_string(), "{uri}");
  }
}

#[tokio::test]
async fn foreign_patient_is_not_found() {
  let state = make_state().await;
  let id = create_patient(&state, "ana", json!({ "full_name": "María", "age": 30 })).await;

  for (method, uri) in [
    ("GET", format!("/patients/{id}")),
    ("GET", format!("/patients/{id}/fichas")),
    ("GET", format!("/patients/{id}/appointments")),
    ("DELETE", format!("/patients/{id}")),
  ] {
    let resp = send(&state, "eva", method, &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
  }

  let resp = send(&state, "eva", "GET", "/patients", None).await;
  assert_eq!(json_body(resp).await, json!([]));
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[tokio::test]
async fn appointments_and_dashboard() {
  let state = make_state().await;
  let maria = create_patient(&state, "ana", json!({ "full_name": "María", "age": 30 })).await;
  let berta = create_patient(&state, "ana", json!({ "full_name": "Berta", "age": 41 })).await;

  let resp = send(
    &state,
    "ana",
    "POST",
    &format!("/patients/{maria}/appointments"),
    Some(json!({
      "date_time": "2024-05-02T10:00:00Z",
      "session_description": "Evaluación inicial",
      "evaluation": "fair",
      "perfect": { "power": 2, "endurance": 4 }
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let appt = json_body(resp).await;
  assert_eq!(appt["evaluation_label"], "Progreso Regular");
  assert_eq!(appt["evaluation_color"], "warning");
  assert_eq!(appt["perfect_notation"], "P2 E4 R- F-");
  let appt_id = appt["appointment_id"].as_str().unwrap().to_owned();

  let resp = send(
    &state,
    "ana",
    "POST",
    &format!("/patients/{berta}/appointments"),
    Some(json!({
      "date_time": "2024-06-10T09:00:00Z",
      "session_description": "Biofeedback",
      "evaluation": "good"
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&state, "ana", "GET", &format!("/appointments/{appt_id}"), None).await;
  let v = json_body(resp).await;
  assert_eq!(v["patient_name"], "María");
  assert_eq!(v["perfect"]["power"], 2);
  assert_eq!(v["evaluation_color"], "warning");

  let resp = send(
    &state,
    "ana",
    "GET",
    &format!("/patients/{maria}/appointments?evaluation=good"),
    None,
  )
  .await;
  assert_eq!(json_body(resp).await, json!([]));

  let resp = send(
    &state,
    "ana",
    "GET",
    &format!("/patients/{maria}/appointments?from=2024-06-01&to=2024-05-01"),
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = send(&state, "ana", "GET", "/dashboard?sort=appointment&order=desc", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let v = json_body(resp).await;
  assert_eq!(v["total_patients"], 2);
  assert_eq!(v["current_sort"], "appointment");
  assert_eq!(v["patients"][0]["patient"]["full_name"], "Berta");
  assert_eq!(v["patients"][0]["appointment_count"], 1);
  assert_eq!(v["patients"][0]["display_name"], "Berta (41 años)");
  let recent = v["recent_appointments"].as_array().unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0]["patient_name"], "Berta");
  assert_eq!(recent[0]["evaluation_label"], "Buen Progreso");
  assert_eq!(recent[0]["evaluation_color"], "info");

  let resp = send(&state, "eva", "GET", &format!("/appointments/{appt_id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&state, "ana", "DELETE", &format!("/appointments/{appt_id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn invalid_balloon_test_is_rejected() {
  let state = make_state().await;
  let id = create_patient(&state, "ana", json!({ "full_name": "María", "age": 30 })).await;
  let resp = send(
    &state,
    "ana",
    "POST",
    &format!("/patients/{id}/appointments"),
    Some(json!({
      "date_time": "2024-05-02T10:00:00Z",
      "session_description": "Test de balón",
      "evaluation": "good",
      "balloon_test": { "first_sensation_ml": 100, "urge_ml": 50 }
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ─── Fichas ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ficha_crud_over_http() {
  let state = make_state().await;
  let id = create_patient(&state, "ana", json!({ "full_name": "María", "age": 30 })).await;

  let resp = send(
    &state,
    "ana",
    "POST",
    &format!("/patients/{id}/fichas"),
    Some(json!({
      "recorded_on": "2024-03-01",
      "body": { "bowel": { "constipation": true, "bristol_scale": 2 } }
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let ficha = json_body(resp).await;
  let ficha_id = ficha["ficha_id"].as_str().unwrap().to_owned();
  assert_eq!(ficha["body"]["bowel"]["bristol_scale"], 2);

  let uri = format!("/patients/{id}/fichas/{ficha_id}");
  let resp = send(
    &state,
    "ana",
    "PUT",
    &uri,
    Some(json!({ "recorded_on": "2024-03-01", "body": { "bowel": { "bristol_scale": 9 } } })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = send(&state, "ana", "GET", &format!("/patients/{id}/fichas"), None).await;
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);

  let resp = send(&state, "ana", "DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let resp = send(&state, "ana", "GET", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
