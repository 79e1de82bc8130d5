//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexicographic order matches chronological order. Dates are ISO 8601.
//! Nested payloads (ficha body, PERFECT, balloon test) are compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use piso_core::{
  appointment::{Appointment, AppointmentListing, BalloonTest, Evaluation, PerfectAssessment},
  ficha::{FichaBody, FichaClinica},
  patient::{Patient, PatientSummary},
  practitioner::Practitioner,
  timeline::{TimelineKind, TimelineSubject, Weekday},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// Fixed-width for years 1 through 9999, so text order is time order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_variant<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| {
    Error::Core(piso_core::Error::UnknownVariant { kind, value: s.to_owned() })
  })
}

pub fn encode_weekday(w: Weekday) -> &'static str { w.into() }

pub fn decode_weekday(s: &str) -> Result<Weekday> { decode_variant("weekday", s) }

pub fn encode_evaluation(e: Evaluation) -> &'static str { e.into() }

pub fn decode_evaluation(s: &str) -> Result<Evaluation> { decode_variant("evaluation", s) }

// ─── JSON payloads ───────────────────────────────────────────────────────────

pub fn encode_body(b: &FichaBody) -> Result<String> { Ok(serde_json::to_string(b)?) }

pub fn encode_perfect(p: Option<&PerfectAssessment>) -> Result<Option<String>> {
  Ok(p.map(serde_json::to_string).transpose()?)
}

pub fn encode_balloon(b: Option<&BalloonTest>) -> Result<Option<String>> {
  Ok(b.map(serde_json::to_string).transpose()?)
}

// ─── Timeline columns ────────────────────────────────────────────────────────

/// Column values for one timeline: `(flag, weeks, weekday, registered_on)`.
pub type TimelineColumns = (bool, Option<u32>, Option<&'static str>, Option<String>);

/// Normalises before encoding so inactive periods are always written as NULLs.
pub fn encode_timeline(t: &TimelineSubject) -> TimelineColumns {
  let t = t.clone().normalized();
  (
    t.is_active,
    t.weeks_at_registration,
    t.anchor_weekday.map(encode_weekday),
    t.registration_date.map(encode_date),
  )
}

fn decode_timeline(
  kind: TimelineKind,
  active: bool,
  weeks: Option<u32>,
  weekday: Option<String>,
  registered_on: Option<String>,
) -> Result<TimelineSubject> {
  Ok(
    TimelineSubject {
      kind,
      is_active: active,
      weeks_at_registration: weeks,
      anchor_weekday: weekday.as_deref().map(decode_weekday).transpose()?,
      registration_date: registered_on.as_deref().map(decode_date).transpose()?,
    }
    .normalized(),
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `practitioners` row.
pub struct RawPractitioner {
  pub practitioner_id: String,
  pub username:        String,
  pub practice_name:   String,
  pub license_number:  String,
  pub created_at:      String,
}

/// Columns in [`RawPractitioner::from_row`] order.
pub const PRACTITIONER_COLUMNS: &str =
  "practitioner_id, username, practice_name, license_number, created_at";

impl RawPractitioner {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      practitioner_id: row.get(0)?,
      username:        row.get(1)?,
      practice_name:   row.get(2)?,
      license_number:  row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_practitioner(self) -> Result<Practitioner> {
    Ok(Practitioner {
      practitioner_id: decode_uuid(&self.practitioner_id)?,
      username:        self.username,
      practice_name:   self.practice_name,
      license_number:  self.license_number,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `patients` row.
pub struct RawPatient {
  pub patient_id:               String,
  pub practitioner_id:          String,
  pub full_name:                String,
  pub age:                      u32,
  pub profession:               String,
  pub address:                  String,
  pub phone:                    String,
  pub medications:              String,
  pub musculoskeletal_history:  String,
  pub consultation_reason:      String,
  pub pregnant:                 bool,
  pub pregnancy_weeks:          Option<u32>,
  pub pregnancy_weekday:        Option<String>,
  pub pregnancy_registered_on:  Option<String>,
  pub postpartum:               bool,
  pub postpartum_weeks:         Option<u32>,
  pub postpartum_weekday:       Option<String>,
  pub postpartum_registered_on: Option<String>,
  pub created_at:               String,
  pub updated_at:               String,
}

/// Columns in [`RawPatient::from_row`] order, qualified with the `p` alias.
pub const PATIENT_COLUMNS: &str = "
  p.patient_id, p.practitioner_id, p.full_name, p.age,
  p.profession, p.address, p.phone, p.medications,
  p.musculoskeletal_history, p.consultation_reason,
  p.pregnant, p.pregnancy_weeks, p.pregnancy_weekday, p.pregnancy_registered_on,
  p.postpartum, p.postpartum_weeks, p.postpartum_weekday, p.postpartum_registered_on,
  p.created_at, p.updated_at";

/// Number of columns in [`PATIENT_COLUMNS`].
pub const PATIENT_COLUMN_COUNT: usize = 20;

impl RawPatient {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      patient_id:               row.get(0)?,
      practitioner_id:          row.get(1)?,
      full_name:                row.get(2)?,
      age:                      row.get(3)?,
      profession:               row.get(4)?,
      address:                  row.get(5)?,
      phone:                    row.get(6)?,
      medications:              row.get(7)?,
      musculoskeletal_history:  row.get(8)?,
      consultation_reason:      row.get(9)?,
      pregnant:                 row.get(10)?,
      pregnancy_weeks:          row.get(11)?,
      pregnancy_weekday:        row.get(12)?,
      pregnancy_registered_on:  row.get(13)?,
      postpartum:               row.get(14)?,
      postpartum_weeks:         row.get(15)?,
      postpartum_weekday:       row.get(16)?,
      postpartum_registered_on: row.get(17)?,
      created_at:               row.get(18)?,
      updated_at:               row.get(19)?,
    })
  }

  pub fn into_patient(self) -> Result<Patient> {
    Ok(Patient {
      patient_id:              decode_uuid(&self.patient_id)?,
      practitioner_id:         decode_uuid(&self.practitioner_id)?,
      full_name:               self.full_name,
      age:                     self.age,
      profession:              self.profession,
      address:                 self.address,
      phone:                   self.phone,
      medications:             self.medications,
      musculoskeletal_history: self.musculoskeletal_history,
      consultation_reason:     self.consultation_reason,
      pregnancy:               decode_timeline(
        TimelineKind::Pregnancy,
        self.pregnant,
        self.pregnancy_weeks,
        self.pregnancy_weekday,
        self.pregnancy_registered_on,
      )?,
      postpartum:              decode_timeline(
        TimelineKind::Postpartum,
        self.postpartum,
        self.postpartum_weeks,
        self.postpartum_weekday,
        self.postpartum_registered_on,
      )?,
      created_at:              decode_dt(&self.created_at)?,
      updated_at:              decode_dt(&self.updated_at)?,
    })
  }
}

/// A patient row plus the aggregate appointment columns.
pub struct RawPatientSummary {
  pub patient:           RawPatient,
  pub last_appointment:  Option<String>,
  pub appointment_count: u32,
}

impl RawPatientSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      patient:           RawPatient::from_row(row)?,
      last_appointment:  row.get(PATIENT_COLUMN_COUNT)?,
      appointment_count: row.get(PATIENT_COLUMN_COUNT + 1)?,
    })
  }

  pub fn into_summary(self) -> Result<PatientSummary> {
    Ok(PatientSummary {
      patient:           self.patient.into_patient()?,
      last_appointment:  self.last_appointment.as_deref().map(decode_dt).transpose()?,
      appointment_count: self.appointment_count,
    })
  }
}

/// Raw values read directly from a `fichas` row.
pub struct RawFicha {
  pub ficha_id:    String,
  pub patient_id:  String,
  pub recorded_on: String,
  pub body_json:   String,
  pub created_at:  String,
  pub updated_at:  String,
}

/// Columns in [`RawFicha::from_row`] order, qualified with the `f` alias.
pub const FICHA_COLUMNS: &str =
  "f.ficha_id, f.patient_id, f.recorded_on, f.body_json, f.created_at, f.updated_at";

impl RawFicha {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ficha_id:    row.get(0)?,
      patient_id:  row.get(1)?,
      recorded_on: row.get(2)?,
      body_json:   row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_ficha(self) -> Result<FichaClinica> {
    Ok(FichaClinica {
      ficha_id:    decode_uuid(&self.ficha_id)?,
      patient_id:  decode_uuid(&self.patient_id)?,
      recorded_on: decode_date(&self.recorded_on)?,
      body:        serde_json::from_str(&self.body_json)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read from an `appointments` row joined with the patient name.
pub struct RawAppointment {
  pub appointment_id:      String,
  pub patient_id:          String,
  pub date_time:           String,
  pub session_description: String,
  pub evaluation:          String,
  pub additional_notes:    String,
  pub perfect_json:        Option<String>,
  pub balloon_json:        Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
  pub patient_name:        String,
}

/// Columns in [`RawAppointment::from_row`] order; requires the `a` and `p`
/// aliases.
pub const APPOINTMENT_COLUMNS: &str = "
  a.appointment_id, a.patient_id, a.date_time, a.session_description,
  a.evaluation, a.additional_notes, a.perfect_json, a.balloon_json,
  a.created_at, a.updated_at, p.full_name";

impl RawAppointment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      appointment_id:      row.get(0)?,
      patient_id:          row.get(1)?,
      date_time:           row.get(2)?,
      session_description: row.get(3)?,
      evaluation:          row.get(4)?,
      additional_notes:    row.get(5)?,
      perfect_json:        row.get(6)?,
      balloon_json:        row.get(7)?,
      created_at:          row.get(8)?,
      updated_at:          row.get(9)?,
      patient_name:        row.get(10)?,
    })
  }

  pub fn into_listing(self) -> Result<AppointmentListing> {
    let appointment = Appointment {
      appointment_id:      decode_uuid(&self.appointment_id)?,
      patient_id:          decode_uuid(&self.patient_id)?,
      date_time:           decode_dt(&self.date_time)?,
      session_description: self.session_description,
      evaluation:          decode_evaluation(&self.evaluation)?,
      additional_notes:    self.additional_notes,
      perfect:             self
        .perfect_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      balloon_test:        self
        .balloon_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    };
    Ok(AppointmentListing { appointment, patient_name: self.patient_name })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let a = Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-03-07T09:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn weekday_round_trip_uses_spanish_names() {
    assert_eq!(encode_weekday(Weekday::Saturday), "sabado");
    assert_eq!(decode_weekday("sabado").unwrap(), Weekday::Saturday);
    assert!(decode_weekday("saturday").is_err());
  }

  #[test]
  fn inactive_timeline_encodes_as_nulls() {
    let mut t = TimelineSubject::active(
      TimelineKind::Pregnancy,
      20,
      Weekday::Monday,
      NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    );
    t.is_active = false;
    assert_eq!(encode_timeline(&t), (false, None, None, None));
  }
}
