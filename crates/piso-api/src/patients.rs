//! Handlers for `/patients` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/patients` | Optional `?q=`, `sort=name\|appointment`, `order=asc\|desc`, `limit`, `offset` |
//! | `POST`   | `/patients` | Body: [`PatientInput`]; returns 201 + [`PatientDetail`] |
//! | `GET`    | `/patients/{id}` | [`PatientDetail`] with live timeline labels |
//! | `PUT`    | `/patients/{id}` | Body: [`PatientInput`] |
//! | `DELETE` | `/patients/{id}` | Also removes fichas and appointments |
//! | `GET`    | `/patients/{id}/timeline` | Just the two timeline views |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use piso_core::{
  dashboard::{SortKey, SortOrder},
  patient::{Patient, PatientInput, PatientSummary, PatientTimelines},
  store::{ClinicStore, PatientQuery},
  validate::Validate as _,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CurrentPractitioner, error::ApiError, today};

/// A patient together with their timelines evaluated for today.
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientDetail {
  #[serde(flatten)]
  pub patient:      Patient,
  /// `"Ana Pérez (34 años)"`
  pub display_name: String,
  pub timelines:    PatientTimelines,
}

impl PatientDetail {
  fn new(patient: Patient) -> Self {
    let timelines = patient.timelines(today());
    let display_name = patient.display_name();
    Self { patient, display_name, timelines }
  }
}

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("patient {id} not found")) }

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Substring of the patient's name.
  pub q:      Option<String>,
  #[serde(default)]
  pub sort:   SortKey,
  #[serde(default)]
  pub order:  SortOrder,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /patients[?q=…][&sort=…][&order=…][&limit=…][&offset=…]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PatientSummary>>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Query(params) = params?;
  let query = PatientQuery {
    name:   params.q,
    sort:   params.sort,
    order:  params.order,
    limit:  params.limit,
    offset: params.offset,
  };
  let patients = state
    .store
    .list_patients(me.practitioner_id, &query)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(count = patients.len(), "listed patients");
  Ok(Json(patients))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /patients`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  body: Result<Json<PatientInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let patient = state
    .store
    .create_patient(me.practitioner_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(PatientDetail::new(patient))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /patients/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
) -> Result<Json<PatientDetail>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let patient = state
    .store
    .get_patient(me.practitioner_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(PatientDetail::new(patient)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /patients/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
  body: Result<Json<PatientInput>, JsonRejection>,
) -> Result<Json<PatientDetail>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let patient = state
    .store
    .update_patient(me.practitioner_id, id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(PatientDetail::new(patient)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /patients/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let deleted = state
    .store
    .delete_patient(me.practitioner_id, id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found(id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Timeline ────────────────────────────────────────────────────────────────

/// `GET /patients/{id}/timeline`
pub async fn timeline<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
) -> Result<Json<PatientTimelines>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let patient = state
    .store
    .get_patient(me.practitioner_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(patient.timelines(today())))
}
