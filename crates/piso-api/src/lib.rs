//! JSON REST API for piso.
//!
//! Exposes an axum [`Router`] backed by any [`piso_core::store::ClinicStore`].
//! Every route authenticates a practitioner with HTTP Basic auth and only
//! ever sees that practitioner's records; anything else answers 404.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = piso_api::router(AppState::new(store));
//! axum::serve(listener, app).await?;
//! ```

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod fichas;
pub mod patients;

use std::sync::Arc;

use axum::{Router, routing::get};
use chrono::NaiveDate;
use piso_core::store::ClinicStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ClinicStore> {
  pub store: Arc<S>,
}

impl<S: ClinicStore> AppState<S> {
  pub fn new(store: S) -> Self { Self { store: Arc::new(store) } }
}

/// The calendar date timeline estimates are computed against.
///
/// Sampled once per request so every label in a response agrees.
pub(crate) fn today() -> NaiveDate { chrono::Local::now().date_naive() }

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ClinicStore + Clone + 'static,
{
  Router::new()
    // Practitioner
    .route("/me", get(dashboard::me::<S>))
    .route("/dashboard", get(dashboard::show::<S>))
    // Patients
    .route(
      "/patients",
      get(patients::list::<S>).post(patients::create::<S>),
    )
    .route(
      "/patients/{id}",
      get(patients::get_one::<S>)
        .put(patients::update::<S>)
        .delete(patients::delete_one::<S>),
    )
    .route("/patients/{id}/timeline", get(patients::timeline::<S>))
    // Appointments
    .route(
      "/patients/{id}/appointments",
      get(appointments::list_for_patient::<S>).post(appointments::create::<S>),
    )
    .route(
      "/appointments/{id}",
      get(appointments::get_one::<S>)
        .put(appointments::update::<S>)
        .delete(appointments::delete_one::<S>),
    )
    // Fichas clínicas
    .route(
      "/patients/{id}/fichas",
      get(fichas::list::<S>).post(fichas::create::<S>),
    )
    .route(
      "/patients/{id}/fichas/{ficha_id}",
      get(fichas::get_one::<S>)
        .put(fichas::update::<S>)
        .delete(fichas::delete_one::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
