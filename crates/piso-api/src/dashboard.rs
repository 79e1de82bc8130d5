//! Handlers for the practitioner's own views: `/me` and `/dashboard`.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use piso_core::{
  dashboard::{Dashboard, RECENT_APPOINTMENTS, SortKey, SortOrder},
  practitioner::Practitioner,
  store::{AppointmentQuery, ClinicStore, PatientQuery},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentPractitioner, error::ApiError, today};

/// `GET /me`
pub async fn me<S>(CurrentPractitioner(me): CurrentPractitioner) -> Json<Practitioner>
where
  S: ClinicStore + Clone + 'static,
{
  Json(me)
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
  #[serde(default)]
  pub sort:  SortKey,
  #[serde(default)]
  pub order: SortOrder,
}

/// `GET /dashboard[?sort=name|appointment][&order=asc|desc]`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  CurrentPractitioner(me): CurrentPractitioner,
  params: Result<Query<DashboardParams>, QueryRejection>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: ClinicStore + Clone + 'static,
{
  let Query(params) = params?;
  let today = today();

  let patients = state
    .store
    .list_patients(me.practitioner_id, &PatientQuery {
      sort: params.sort,
      order: params.order,
      ..PatientQuery::default()
    })
    .await
    .map_err(ApiError::store)?;

  let recent = state
    .store
    .list_appointments(me.practitioner_id, &AppointmentQuery {
      limit: Some(RECENT_APPOINTMENTS),
      ..AppointmentQuery::default()
    })
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(
    username = %me.username,
    patients = patients.len(),
    "dashboard assembled"
  );
  Ok(Json(Dashboard::assemble(
    patients,
    recent,
    params.sort,
    params.order,
    today,
  )))
}
