//! Handlers for appointment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/patients/{id}/appointments` | Newest first; optional `?from=`, `to=` (dates), `evaluation=` |
//! | `POST`   | `/patients/{id}/appointments` | Body: [`AppointmentInput`]; returns 201 |
//! | `GET`    | `/appointments/{id}` | Includes the patient's name |
//! | `PUT`    | `/appointments/{id}` | Body: [`AppointmentInput`] |
//! | `DELETE` | `/appointments/{id}` | |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use piso_core::{
  appointment::{AppointmentInput, AppointmentView, Evaluation},
  store::{AppointmentQuery, ClinicStore},
  validate::{DateRange, Validate as _},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentPractitioner, error::ApiError, today};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("appointment {id} not found")) }

fn patient_not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("patient {id} not found"))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub from:       Option<NaiveDate>,
  pub to:         Option<NaiveDate>,
  pub evaluation: Option<Evaluation>,
}

/// `GET /patients/{id}/appointments[?from=…][&to=…][&evaluation=…]`
pub async fn list_for_patient<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(patient_id): Path<Uuid>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<AppointmentView>>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Query(params) = params?;
  let range = DateRange { from: params.from, to: params.to }.clean(today())?;

  state
    .store
    .get_patient(me.practitioner_id, patient_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| patient_not_found(patient_id))?;

  let query = AppointmentQuery {
    patient_id: Some(patient_id),
    range,
    evaluation: params.evaluation,
    limit: None,
  };
  let appointments: Vec<AppointmentView> = state
    .store
    .list_appointments(me.practitioner_id, &query)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|listing| AppointmentView::from(listing.appointment))
    .collect();

  tracing::debug!(%patient_id, count = appointments.len(), "listed appointments");
  Ok(Json(appointments))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /patients/{id}/appointments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(patient_id): Path<Uuid>,
  body: Result<Json<AppointmentInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let appointment = state
    .store
    .create_appointment(me.practitioner_id, patient_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| patient_not_found(patient_id))?;
  Ok((StatusCode::CREATED, Json(AppointmentView::from(appointment))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /appointments/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
) -> Result<Json<AppointmentView>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let listing = state
    .store
    .get_appointment(me.practitioner_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(AppointmentView::from(listing)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /appointments/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(id): Path<Uuid>,
  body: Result<Json<AppointmentInput>, JsonRejection>,
) -> Result<Json<AppointmentView>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let appointment = state
    .store
    .update_appointment(me.practitioner_id, id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(AppointmentView::from(appointment)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /appointments/{id}`
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
    .delete_appointment(me.practitioner_id, id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found(id));
  }
  tracing::info!(appointment_id = %id, "appointment deleted");
  Ok(StatusCode::NO_CONTENT)
}
