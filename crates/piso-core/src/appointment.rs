//! Treatment appointments and the assessments recorded during them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// The practitioner's overall progress rating for a session.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  IntoStaticStr,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Evaluation {
  Excellent,
  Good,
  Fair,
  Poor,
  Critical,
}

impl Evaluation {
  pub fn label(self) -> &'static str {
    match self {
      Self::Excellent => "Excelente Progreso",
      Self::Good => "Buen Progreso",
      Self::Fair => "Progreso Regular",
      Self::Poor => "Necesita Atención",
      Self::Critical => "Atención Crítica Requerida",
    }
  }

  /// CSS class used when rendering the rating.
  pub fn display_color(self) -> &'static str {
    match self {
      Self::Excellent => "success",
      Self::Good => "info",
      Self::Fair => "warning",
      Self::Poor => "danger",
      Self::Critical => "critical",
    }
  }
}

// ─── PERFECT assessment ──────────────────────────────────────────────────────

/// Laycock's PERFECT digital assessment of the pelvic-floor muscles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfectAssessment {
  /// P — maximal voluntary contraction on the modified Oxford scale (0–5).
  pub power:            Option<u8>,
  /// E — seconds a maximal contraction is held (0–10).
  pub endurance:        Option<u8>,
  /// R — repetitions of the held contraction (0–10).
  pub repetitions:      Option<u8>,
  /// F — fast one-second contractions (0–10).
  pub fast:             Option<u8>,
  /// E — elevation of the posterior vaginal wall.
  pub elevation:        bool,
  /// C — co-contraction of the lower abdominals.
  pub co_contraction:   bool,
  /// T — involuntary contraction on coughing.
  pub timing:           bool,
  pub notes:            String,
}

impl PerfectAssessment {
  /// Compact notation such as `"P3 E5 R4 F6 ECT"`; absent scores read `-`.
  pub fn notation(&self) -> String {
    fn score(v: Option<u8>) -> String {
      v.map_or_else(|| "-".to_owned(), |n| n.to_string())
    }

    let mut out = format!(
      "P{} E{} R{} F{}",
      score(self.power),
      score(self.endurance),
      score(self.repetitions),
      score(self.fast),
    );
    let flags: String = [
      (self.elevation, 'E'),
      (self.co_contraction, 'C'),
      (self.timing, 'T'),
    ]
    .into_iter()
    .filter_map(|(set, c)| set.then_some(c))
    .collect();
    if !flags.is_empty() {
      out.push(' ');
      out.push_str(&flags);
    }
    out
  }
}

// ─── Balloon test ────────────────────────────────────────────────────────────

/// Anorectal balloon test: rectal sensory thresholds and expulsion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonTest {
  /// Volume (ml) at first sensation.
  pub first_sensation_ml: Option<u32>,
  /// Volume (ml) at first urge to defecate.
  pub urge_ml:            Option<u32>,
  /// Maximum tolerated volume (ml).
  pub max_tolerated_ml:   Option<u32>,
  pub expelled:           bool,
  pub expulsion_seconds:  Option<u32>,
  pub notes:              String,
}

// ─── Appointment ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub appointment_id:      Uuid,
  pub patient_id:          Uuid,
  pub date_time:           DateTime<Utc>,
  /// What was done during the session.
  pub session_description: String,
  pub evaluation:          Evaluation,
  pub additional_notes:    String,
  pub perfect:             Option<PerfectAssessment>,
  pub balloon_test:        Option<BalloonTest>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

/// The writable subset of an [`Appointment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentInput {
  pub date_time:           DateTime<Utc>,
  pub session_description: String,
  pub evaluation:          Evaluation,
  #[serde(default)]
  pub additional_notes:    String,
  #[serde(default)]
  pub perfect:             Option<PerfectAssessment>,
  #[serde(default)]
  pub balloon_test:        Option<BalloonTest>,
}

/// An appointment joined with the name of its patient, for listings that
/// span several patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentListing {
  pub appointment:  Appointment,
  pub patient_name: String,
}

/// An appointment as sent to clients: the record plus how its rating and
/// PERFECT scores are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentView {
  #[serde(flatten)]
  pub appointment:      Appointment,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub patient_name:     Option<String>,
  pub evaluation_label: &'static str,
  pub evaluation_color: &'static str,
  pub perfect_notation: Option<String>,
}

impl From<Appointment> for AppointmentView {
  fn from(appointment: Appointment) -> Self {
    Self {
      evaluation_label: appointment.evaluation.label(),
      evaluation_color: appointment.evaluation.display_color(),
      perfect_notation: appointment.perfect.as_ref().map(PerfectAssessment::notation),
      patient_name: None,
      appointment,
    }
  }
}

impl From<AppointmentListing> for AppointmentView {
  fn from(listing: AppointmentListing) -> Self {
    Self {
      patient_name: Some(listing.patient_name),
      ..Self::from(listing.appointment)
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn evaluation_labels_and_colors() {
    assert_eq!(Evaluation::Excellent.label(), "Excelente Progreso");
    assert_eq!(Evaluation::Poor.display_color(), "danger");
    assert_eq!(Evaluation::from_str("critical").unwrap(), Evaluation::Critical);
    assert_eq!(Evaluation::iter().count(), 5);
  }

  #[test]
  fn evaluation_serde_matches_strum() {
    for e in Evaluation::iter() {
      let json = serde_json::to_string(&e).unwrap();
      assert_eq!(json, format!("\"{}\"", e.as_ref()));
    }
  }

  #[test]
  fn perfect_notation() {
    let p = PerfectAssessment {
      power: Some(3),
      endurance: Some(5),
      repetitions: Some(4),
      fast: None,
      elevation: true,
      co_contraction: false,
      timing: true,
      notes: String::new(),
    };
    assert_eq!(p.notation(), "P3 E5 R4 F- ET");
    assert_eq!(PerfectAssessment::default().notation(), "P- E- R- F-");
  }

  #[test]
  fn view_carries_display_fields() {
    let at = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 3, 1, 9, 30, 0).unwrap();
    let appointment = Appointment {
      appointment_id:      Uuid::new_v4(),
      patient_id:          Uuid::new_v4(),
      date_time:           at,
      session_description: "Control".into(),
      evaluation:          Evaluation::Fair,
      additional_notes:    String::new(),
      perfect:             Some(PerfectAssessment { power: Some(2), ..Default::default() }),
      balloon_test:        None,
      created_at:          at,
      updated_at:          at,
    };

    let view = AppointmentView::from(AppointmentListing {
      appointment,
      patient_name: "María".into(),
    });
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["evaluation"], "fair");
    assert_eq!(json["evaluation_label"], "Progreso Regular");
    assert_eq!(json["evaluation_color"], "warning");
    assert_eq!(json["perfect_notation"], "P2 E- R- F-");
    assert_eq!(json["patient_name"], "María");

    let bare = serde_json::to_value(AppointmentView::from(view.appointment)).unwrap();
    assert!(bare.get("patient_name").is_none());
  }
}
