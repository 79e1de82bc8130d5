//! The `ClinicStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `piso-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  appointment::{Appointment, AppointmentInput, AppointmentListing, Evaluation},
  dashboard::{SortKey, SortOrder},
  ficha::{FichaClinica, FichaInput},
  patient::{Patient, PatientInput, PatientSummary},
  practitioner::{NewPractitioner, Practitioner},
  validate::DateRange,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ClinicStore::list_patients`].
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
  /// Case-insensitive substring match on the patient's full name.
  pub name:   Option<String>,
  pub sort:   SortKey,
  pub order:  SortOrder,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Parameters for [`ClinicStore::list_appointments`].
#[derive(Debug, Clone, Default)]
pub struct AppointmentQuery {
  /// Restrict to one patient; `None` spans all of the practitioner's patients.
  pub patient_id: Option<Uuid>,
  /// Inclusive filter on the calendar date (UTC) of `date_time`.
  pub range:      DateRange,
  pub evaluation: Option<Evaluation>,
  pub limit:      Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a clinical record store.
///
/// Every patient, ficha and appointment operation is scoped by the owning
/// practitioner. A record that belongs to someone else is reported exactly as
/// if it did not exist (`None` or `false`).
///
/// Implementations must normalise patient timelines before every write so
/// that inactive periods never carry stale dependent fields.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ClinicStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Practitioners ─────────────────────────────────────────────────────

  /// Persist a new practitioner. Fails if the username is taken.
  fn create_practitioner(
    &self,
    input: NewPractitioner,
  ) -> impl Future<Output = Result<Practitioner, Self::Error>> + Send + '_;

  /// Replace a practitioner's password hash. Returns `false` if the username
  /// is unknown.
  fn set_password<'a>(
    &'a self,
    username: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn get_practitioner(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Practitioner>, Self::Error>> + Send + '_;

  /// Look up a practitioner and their argon2 PHC hash by username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<(Practitioner, String)>, Self::Error>>
  + Send
  + 'a;

  // ── Patients ──────────────────────────────────────────────────────────

  fn create_patient(
    &self,
    practitioner_id: Uuid,
    input: PatientInput,
  ) -> impl Future<Output = Result<Patient, Self::Error>> + Send + '_;

  fn get_patient(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + '_;

  /// Overwrite the writable fields. Returns `None` if not found.
  fn update_patient(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: PatientInput,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + '_;

  /// Delete a patient together with their fichas and appointments.
  fn delete_patient(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_patients<'a>(
    &'a self,
    practitioner_id: Uuid,
    query: &'a PatientQuery,
  ) -> impl Future<Output = Result<Vec<PatientSummary>, Self::Error>> + Send + 'a;

  // ── Fichas clínicas ───────────────────────────────────────────────────

  /// Returns `None` if the patient is not found.
  fn create_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: FichaInput,
  ) -> impl Future<Output = Result<Option<FichaClinica>, Self::Error>> + Send + '_;

  /// Newest `recorded_on` first. Returns `None` if the patient is not found.
  fn list_fichas(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<FichaClinica>>, Self::Error>> + Send + '_;

  fn get_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
  ) -> impl Future<Output = Result<Option<FichaClinica>, Self::Error>> + Send + '_;

  fn update_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
    input: FichaInput,
  ) -> impl Future<Output = Result<Option<FichaClinica>, Self::Error>> + Send + '_;

  fn delete_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Appointments ──────────────────────────────────────────────────────

  /// Returns `None` if the patient is not found.
  fn create_appointment(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: AppointmentInput,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  fn get_appointment(
    &self,
    practitioner_id: Uuid,
    appointment_id: Uuid,
  ) -> impl Future<Output = Result<Option<AppointmentListing>, Self::Error>> + Send + '_;

  fn update_appointment(
    &self,
    practitioner_id: Uuid,
    appointment_id: Uuid,
    input: AppointmentInput,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  fn delete_appointment(
    &self,
    practitioner_id: Uuid,
    appointment_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_appointments<'a>(
    &'a self,
    practitioner_id: Uuid,
    query: &'a AppointmentQuery,
  ) -> impl Future<Output = Result<Vec<AppointmentListing>, Self::Error>> + Send + 'a;
}
