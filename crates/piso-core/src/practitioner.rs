//! The practitioner account that owns patients.
//!
//! Every patient, ficha and appointment is scoped to exactly one practitioner.
//! The password hash is deliberately absent from [`Practitioner`]; only the
//! store and the auth layer ever see it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A healthcare professional together with their practice profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
  pub practitioner_id: Uuid,
  pub username:        String,
  /// Name of the practice or clinic.
  pub practice_name:   String,
  /// Professional licence number.
  pub license_number:  String,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::ClinicStore::create_practitioner`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPractitioner {
  pub username:       String,
  #[serde(default)]
  pub practice_name:  String,
  #[serde(default)]
  pub license_number: String,
  /// Argon2 PHC string.
  pub password_hash:  String,
}
