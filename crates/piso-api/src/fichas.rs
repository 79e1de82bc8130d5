//! Handlers for `/patients/{id}/fichas` endpoints.
//!
//! A ficha clínica is only reachable through its patient, so every route
//! carries both ids.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use piso_core::{
  ficha::{FichaClinica, FichaInput},
  store::ClinicStore,
  validate::Validate as _,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentPractitioner, error::ApiError, today};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("ficha {id} not found")) }

fn patient_not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("patient {id} not found"))
}

/// `GET /patients/{id}/fichas` — newest consultation first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<FichaClinica>>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let fichas = state
    .store
    .list_fichas(me.practitioner_id, patient_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| patient_not_found(patient_id))?;
  Ok(Json(fichas))
}

/// `POST /patients/{id}/fichas`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path(patient_id): Path<Uuid>,
  body: Result<Json<FichaInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let ficha = state
    .store
    .create_ficha(me.practitioner_id, patient_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| patient_not_found(patient_id))?;
  Ok((StatusCode::CREATED, Json(ficha)))
}

/// `GET /patients/{id}/fichas/{ficha_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path((patient_id, ficha_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FichaClinica>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let ficha = state
    .store
    .get_ficha(me.practitioner_id, patient_id, ficha_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(ficha_id))?;
  Ok(Json(ficha))
}

/// `PUT /patients/{id}/fichas/{ficha_id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path((patient_id, ficha_id)): Path<(Uuid, Uuid)>,
  body: Result<Json<FichaInput>, JsonRejection>,
) -> Result<Json<FichaClinica>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Json(input) = body?;
  let input = input.clean(today())?;

  let ficha = state
    .store
    .update_ficha(me.practitioner_id, patient_id, ficha_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(ficha_id))?;
  Ok(Json(ficha))
}

/// `DELETE /patients/{id}/fichas/{ficha_id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  Path((patient_id, ficha_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let deleted = state
    .store
    .delete_ficha(me.practitioner_id, patient_id, ficha_id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found(ficha_id));
  }
  tracing::info!(%ficha_id, "ficha deleted");
  Ok(StatusCode::NO_CONTENT)
}
