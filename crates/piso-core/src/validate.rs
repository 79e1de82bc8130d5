//! Form validation.
//!
//! Each writable input type implements [`Validate`]. Cleaning trims free
//! text and collects every field-level problem into a [`FieldErrors`] map,
//! keyed by the dotted path of the offending field, so a form can show all
//! messages at once. Messages are in Spanish because they are shown to the
//! practitioner verbatim.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  appointment::{AppointmentInput, BalloonTest, PerfectAssessment},
  ficha::FichaInput,
  patient::PatientInput,
  practitioner::NewPractitioner,
  timeline::{TimelineFields, TimelineKind},
};

// ─── FieldErrors ─────────────────────────────────────────────────────────────

/// Field path → messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.0.entry(field.into()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: &str) -> &[String] {
    self.0.get(field).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn into_result(self) -> Result<()> {
    if self.is_empty() { Ok(()) } else { Err(self.into()) }
  }

  fn check_max<T: PartialOrd + Copy>(
    &mut self,
    field: &str,
    value: Option<T>,
    max: T,
    message: &str,
  ) {
    if value.is_some_and(|v| v > max) {
      self.add(field, message);
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for m in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field}: {m}")?;
        first = false;
      }
    }
    Ok(())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait Validate: Sized {
  /// Normalise the input and check every field constraint.
  ///
  /// `today` is the practitioner's current calendar date; dates after it are
  /// rejected where the form forbids future dates.
  fn clean(self, today: NaiveDate) -> Result<Self>;
}

// ─── Practitioner ────────────────────────────────────────────────────────────

impl Validate for NewPractitioner {
  fn clean(mut self, _today: NaiveDate) -> Result<Self> {
    let mut errors = FieldErrors::default();

    self.username = self.username.trim().to_owned();
    self.practice_name = self.practice_name.trim().to_owned();
    self.license_number = self.license_number.trim().to_owned();

    if self.username.is_empty() {
      errors.add("username", "El nombre de usuario es requerido.");
    } else if self.username.contains(':') {
      errors.add("username", "El nombre de usuario no puede contener ':'.");
    }
    if self.password_hash.is_empty() {
      errors.add("password", "La contraseña es requerida.");
    }

    errors.into_result()?;
    Ok(self)
  }
}

// ─── Patient ─────────────────────────────────────────────────────────────────

impl Validate for PatientInput {
  fn clean(mut self, today: NaiveDate) -> Result<Self> {
    let mut errors = FieldErrors::default();

    self.full_name = self.full_name.trim().to_owned();
    if self.full_name.is_empty() {
      errors.add("full_name", "El nombre completo es requerido.");
    } else if self.full_name.chars().count() < 2 {
      errors.add("full_name", "El nombre debe tener al menos 2 caracteres.");
    }

    if self.age > 120 {
      errors.add("age", "Por favor ingresa una edad válida.");
    }

    self.phone = self.phone.trim().to_owned();

    check_timeline(&self.pregnancy, TimelineKind::Pregnancy, today, &mut errors);
    check_timeline(&self.postpartum, TimelineKind::Postpartum, today, &mut errors);

    errors.into_result()?;
    Ok(self)
  }
}

fn check_timeline(
  fields: &TimelineFields,
  kind: TimelineKind,
  today: NaiveDate,
  errors: &mut FieldErrors,
) {
  if !fields.active {
    return;
  }
  let prefix = kind.as_ref();

  match (fields.weeks_at_registration, kind.max_weeks()) {
    (None, _) => errors.add(
      format!("{prefix}.weeks_at_registration"),
      "Indica las semanas al momento del registro.",
    ),
    (Some(w), Some(max)) if w < 1 || w > max => errors.add(
      format!("{prefix}.weeks_at_registration"),
      format!("Las semanas deben estar entre 1 y {max}."),
    ),
    (Some(0), None) => errors.add(
      format!("{prefix}.weeks_at_registration"),
      "Las semanas deben ser al menos 1.",
    ),
    _ => {}
  }

  if fields.registration_date.is_some_and(|d| d > today) {
    errors.add(
      format!("{prefix}.registration_date"),
      "La fecha de registro no puede ser futura.",
    );
  }
}

// ─── Appointment ─────────────────────────────────────────────────────────────

/// Years outside this range have no fixed-width RFC 3339 form.
const APPOINTMENT_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

impl Validate for AppointmentInput {
  fn clean(mut self, _today: NaiveDate) -> Result<Self> {
    let mut errors = FieldErrors::default();

    self.session_description = self.session_description.trim().to_owned();
    if self.session_description.is_empty() {
      errors.add("session_description", "La descripción de la sesión es requerida.");
    }
    if !APPOINTMENT_YEARS.contains(&self.date_time.year()) {
      errors.add("date_time", "La fecha de la cita no es válida.");
    }
    self.additional_notes = self.additional_notes.trim().to_owned();

    if let Some(p) = &self.perfect {
      check_perfect(p, &mut errors);
    }
    if let Some(b) = &self.balloon_test {
      check_balloon(b, &mut errors);
    }

    errors.into_result()?;
    Ok(self)
  }
}

fn check_perfect(p: &PerfectAssessment, errors: &mut FieldErrors) {
  errors.check_max("perfect.power", p.power, 5, "La potencia (Oxford) va de 0 a 5.");
  errors.check_max("perfect.endurance", p.endurance, 10, "La resistencia va de 0 a 10 segundos.");
  errors.check_max("perfect.repetitions", p.repetitions, 10, "Las repeticiones van de 0 a 10.");
  errors.check_max("perfect.fast", p.fast, 10, "Las contracciones rápidas van de 0 a 10.");
}

fn check_balloon(b: &BalloonTest, errors: &mut FieldErrors) {
  if let (Some(first), Some(urge)) = (b.first_sensation_ml, b.urge_ml)
    && first > urge
  {
    errors.add(
      "balloon_test.first_sensation_ml",
      "La primera sensación no puede superar el volumen de urgencia.",
    );
  }
  if let (Some(urge), Some(max)) = (b.urge_ml, b.max_tolerated_ml)
    && urge > max
  {
    errors.add(
      "balloon_test.urge_ml",
      "El volumen de urgencia no puede superar el máximo tolerado.",
    );
  }
  if b.expulsion_seconds.is_some() && !b.expelled {
    errors.add(
      "balloon_test.expulsion_seconds",
      "Solo se registra el tiempo si el balón fue expulsado.",
    );
  }
}

// ─── Ficha ───────────────────────────────────────────────────────────────────

impl Validate for FichaInput {
  fn clean(self, today: NaiveDate) -> Result<Self> {
    let mut errors = FieldErrors::default();

    if self.recorded_on > today {
      errors.add("recorded_on", "La fecha de la ficha no puede ser futura.");
    }
    if self.body.bowel.bristol_scale.is_some_and(|b| !(1..=7).contains(&b)) {
      errors.add("body.bowel.bristol_scale", "La escala de Bristol va de 1 a 7.");
    }
    errors.check_max(
      "body.intracavitary.mea_pain_eva",
      self.body.intracavitary.mea_pain_eva,
      10,
      "El dolor EVA va de 0 a 10.",
    );

    errors.into_result()?;
    Ok(self)
  }
}

// ─── Date range ──────────────────────────────────────────────────────────────

/// An inclusive calendar-date filter used by listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

impl Validate for DateRange {
  fn clean(self, _today: NaiveDate) -> Result<Self> {
    let mut errors = FieldErrors::default();
    if let (Some(from), Some(to)) = (self.from, self.to)
      && from > to
    {
      errors.add("from", "La fecha inicial debe ser anterior o igual a la final.");
    }
    errors.into_result()?;
    Ok(self)
  }
}
