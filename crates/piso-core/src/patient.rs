//! Patient records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timeline::{TimelineFields, TimelineKind, TimelineSubject, TimelineView};

/// A patient owned by one practitioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id:              Uuid,
  pub practitioner_id:         Uuid,
  pub full_name:               String,
  pub age:                     u32,
  pub profession:              String,
  pub address:                 String,
  pub phone:                   String,
  /// Current medications.
  pub medications:             String,
  /// Musculoskeletal and surgical history.
  pub musculoskeletal_history: String,
  pub consultation_reason:     String,
  pub pregnancy:               TimelineSubject,
  pub postpartum:              TimelineSubject,
  pub created_at:              DateTime<Utc>,
  pub updated_at:              DateTime<Utc>,
}

impl Patient {
  /// `"Ana Pérez (34 años)"`
  pub fn display_name(&self) -> String {
    format!("{} ({} años)", self.full_name, self.age)
  }

  pub fn timelines(&self, today: NaiveDate) -> PatientTimelines {
    PatientTimelines {
      pregnancy:  self.pregnancy.view(today),
      postpartum: self.postpartum.view(today),
    }
  }
}

/// Both timelines of a patient, computed against the same `today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientTimelines {
  pub pregnancy:  TimelineView,
  pub postpartum: TimelineView,
}

/// The writable subset of a [`Patient`], as submitted by the patient form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInput {
  pub full_name:               String,
  pub age:                     u32,
  #[serde(default)]
  pub profession:              String,
  #[serde(default)]
  pub address:                 String,
  #[serde(default)]
  pub phone:                   String,
  #[serde(default)]
  pub medications:             String,
  #[serde(default)]
  pub musculoskeletal_history: String,
  #[serde(default)]
  pub consultation_reason:     String,
  #[serde(default)]
  pub pregnancy:               TimelineFields,
  #[serde(default)]
  pub postpartum:              TimelineFields,
}

impl PatientInput {
  pub fn pregnancy_subject(&self) -> TimelineSubject {
    self.pregnancy.clone().into_subject(TimelineKind::Pregnancy)
  }

  pub fn postpartum_subject(&self) -> TimelineSubject {
    self.postpartum.clone().into_subject(TimelineKind::Postpartum)
  }
}

impl From<&Patient> for PatientInput {
  fn from(p: &Patient) -> Self {
    Self {
      full_name:               p.full_name.clone(),
      age:                     p.age,
      profession:              p.profession.clone(),
      address:                 p.address.clone(),
      phone:                   p.phone.clone(),
      medications:             p.medications.clone(),
      musculoskeletal_history: p.musculoskeletal_history.clone(),
      consultation_reason:     p.consultation_reason.clone(),
      pregnancy:               p.pregnancy.fields(),
      postpartum:              p.postpartum.fields(),
    }
  }
}

/// A patient row as listed on the dashboard and patient index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
  pub patient:           Patient,
  /// Date and time of the most recent appointment, if any.
  pub last_appointment:  Option<DateTime<Utc>>,
  pub appointment_count: u32,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::timeline::Weekday;

  #[test]
  fn display_name_includes_age() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let input = PatientInput {
      full_name: "Ana Pérez".into(),
      age: 34,
      pregnancy: TimelineFields {
        active:                true,
        weeks_at_registration: Some(20),
        anchor_weekday:        Some(Weekday::Monday),
        registration_date:     NaiveDate::from_ymd_opt(2024, 1, 1),
      },
      ..PatientInput::default()
    };
    let patient = Patient {
      patient_id: Uuid::new_v4(),
      practitioner_id: Uuid::new_v4(),
      pregnancy: input.pregnancy_subject(),
      postpartum: input.postpartum_subject(),
      full_name: input.full_name.clone(),
      age: input.age,
      profession: String::new(),
      address: String::new(),
      phone: String::new(),
      medications: String::new(),
      musculoskeletal_history: String::new(),
      consultation_reason: String::new(),
      created_at: at,
      updated_at: at,
    };

    assert_eq!(patient.display_name(), "Ana Pérez (34 años)");
    assert_eq!(PatientInput::from(&patient), input);
  }

  #[test]
  fn inactive_fields_are_dropped_from_subject() {
    let input = PatientInput {
      postpartum: TimelineFields {
        active:                false,
        weeks_at_registration: Some(3),
        anchor_weekday:        Some(Weekday::Friday),
        registration_date:     None,
      },
      ..PatientInput::default()
    };
    let subject = input.postpartum_subject();
    assert_eq!(subject.kind, TimelineKind::Postpartum);
    assert_eq!(subject, TimelineSubject::inactive(TimelineKind::Postpartum));
  }
}
