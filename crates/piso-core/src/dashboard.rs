//! The practitioner's landing view: their patients with live timeline labels
//! and the most recent appointments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  appointment::{AppointmentListing, AppointmentView},
  patient::{PatientSummary, PatientTimelines},
};

/// Number of appointments shown under "recent".
pub const RECENT_APPOINTMENTS: usize = 5;

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
  #[default]
  Name,
  /// Date of the most recent appointment.
  Appointment,
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

/// One patient line on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRow {
  #[serde(flatten)]
  pub summary:      PatientSummary,
  pub display_name: String,
  pub timelines:    PatientTimelines,
}

impl DashboardRow {
  pub fn has_active_timeline(&self) -> bool {
    self.timelines.pregnancy.active || self.timelines.postpartum.active
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
  pub today:               NaiveDate,
  pub total_patients:      usize,
  /// Patients currently pregnant or postpartum.
  pub active_timelines:    usize,
  pub patients:            Vec<DashboardRow>,
  pub recent_appointments: Vec<AppointmentView>,
  pub current_sort:        SortKey,
  pub current_order:       SortOrder,
}

impl Dashboard {
  /// Attach timeline labels computed against a single `today`.
  ///
  /// `patients` must already be sorted by the store; order is preserved.
  pub fn assemble(
    patients: Vec<PatientSummary>,
    recent: Vec<AppointmentListing>,
    sort: SortKey,
    order: SortOrder,
    today: NaiveDate,
  ) -> Self {
    let patients: Vec<DashboardRow> = patients
      .into_iter()
      .map(|summary| {
        let timelines = summary.patient.timelines(today);
        let display_name = summary.patient.display_name();
        DashboardRow { summary, display_name, timelines }
      })
      .collect();

    Self {
      today,
      total_patients: patients.len(),
      active_timelines: patients.iter().filter(|r| r.has_active_timeline()).count(),
      patients,
      recent_appointments: recent
        .into_iter()
        .take(RECENT_APPOINTMENTS)
        .map(AppointmentView::from)
        .collect(),
      current_sort: sort,
      current_order: order,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{
    patient::Patient,
    timeline::{TimelineKind, TimelineSubject, Weekday},
  };

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn summary(name: &str, pregnancy: TimelineSubject) -> PatientSummary {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    PatientSummary {
      patient: Patient {
        patient_id: Uuid::new_v4(),
        practitioner_id: Uuid::new_v4(),
        full_name: name.into(),
        age: 30,
        profession: String::new(),
        address: String::new(),
        phone: String::new(),
        medications: String::new(),
        musculoskeletal_history: String::new(),
        consultation_reason: String::new(),
        pregnancy,
        postpartum: TimelineSubject::inactive(TimelineKind::Postpartum),
        created_at: now,
        updated_at: now,
      },
      last_appointment: None,
      appointment_count: 0,
    }
  }

  #[test]
  fn assemble_computes_labels_and_preserves_order() {
    let pregnant = TimelineSubject::active(
      TimelineKind::Pregnancy,
      12,
      Weekday::Thursday,
      date(2024, 3, 7),
    );
    let rows = vec![
      summary("Beatriz", TimelineSubject::inactive(TimelineKind::Pregnancy)),
      summary("Ana", pregnant),
    ];

    let d = Dashboard::assemble(rows, vec![], SortKey::Name, SortOrder::Desc, date(2024, 3, 14));

    assert_eq!(d.total_patients, 2);
    assert_eq!(d.patients[0].summary.patient.full_name, "Beatriz");
    assert_eq!(d.patients[0].timelines.pregnancy.label, None);
    assert_eq!(d.patients[1].timelines.pregnancy.current_weeks, Some(13));
    assert_eq!(
      d.patients[1].timelines.pregnancy.label.as_deref(),
      Some("🤰 13 semanas")
    );
    assert_eq!(d.active_timelines, 1);
    assert_eq!(d.patients[1].display_name, "Ana (30 años)");
    assert_eq!(
      d.patients[1].timelines.pregnancy.anchor_day.as_deref(),
      Some("Jueves")
    );
    assert_eq!(d.patients[0].timelines.pregnancy.anchor_day, None);
  }

  #[test]
  fn sort_params_parse() {
    use std::str::FromStr;
    assert_eq!(SortKey::from_str("appointment").unwrap(), SortKey::Appointment);
    assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Desc);
    assert_eq!(SortKey::default(), SortKey::Name);
  }
}
