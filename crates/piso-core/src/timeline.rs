//! Gestational and postpartum timeline estimation.
//!
//! Clinicians count weeks from a fixed weekday ("every Thursday is a new
//! week"), so a patient's week count advances once per calendar week rather
//! than daily. Given a self-reported week count, the anchor weekday and the
//! date the count was captured, this module back-projects the start of the
//! tracked period and projects the elapsed weeks as of a caller-supplied
//! `today`.
//!
//! Everything here is pure: the current date is always a parameter.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// The day of the week used as the checkpoint for counting weeks.
///
/// The discriminants are the stable Monday = 0 … Sunday = 6 mapping used by
/// all week arithmetic.
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
pub enum Weekday {
  #[serde(rename = "lunes")]
  #[strum(serialize = "lunes")]
  Monday    = 0,
  #[serde(rename = "martes")]
  #[strum(serialize = "martes")]
  Tuesday   = 1,
  #[serde(rename = "miercoles")]
  #[strum(serialize = "miercoles")]
  Wednesday = 2,
  #[serde(rename = "jueves")]
  #[strum(serialize = "jueves")]
  Thursday  = 3,
  #[serde(rename = "viernes")]
  #[strum(serialize = "viernes")]
  Friday    = 4,
  #[serde(rename = "sabado")]
  #[strum(serialize = "sabado")]
  Saturday  = 5,
  #[serde(rename = "domingo")]
  #[strum(serialize = "domingo")]
  Sunday    = 6,
}

impl Weekday {
  /// Monday = 0 through Sunday = 6.
  pub const fn index(self) -> u32 { self as u32 }

  /// Human-readable Spanish label.
  pub fn label(self) -> &'static str {
    match self {
      Self::Monday => "Lunes",
      Self::Tuesday => "Martes",
      Self::Wednesday => "Miércoles",
      Self::Thursday => "Jueves",
      Self::Friday => "Viernes",
      Self::Saturday => "Sábado",
      Self::Sunday => "Domingo",
    }
  }
}

impl From<chrono::Weekday> for Weekday {
  fn from(w: chrono::Weekday) -> Self {
    match w {
      chrono::Weekday::Mon => Self::Monday,
      chrono::Weekday::Tue => Self::Tuesday,
      chrono::Weekday::Wed => Self::Wednesday,
      chrono::Weekday::Thu => Self::Thursday,
      chrono::Weekday::Fri => Self::Friday,
      chrono::Weekday::Sat => Self::Saturday,
      chrono::Weekday::Sun => Self::Sunday,
    }
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// Which period a [`TimelineSubject`] tracks.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimelineKind {
  Pregnancy,
  Postpartum,
}

impl TimelineKind {
  pub fn marker(self) -> &'static str {
    match self {
      Self::Pregnancy => "🤰",
      Self::Postpartum => "👶",
    }
  }

  /// Upper bound on a self-reported week count, if the domain has one.
  pub fn max_weeks(self) -> Option<u32> {
    match self {
      Self::Pregnancy => Some(42),
      Self::Postpartum => None,
    }
  }
}

/// The timeline fields of a patient record, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineFields {
  pub active:                bool,
  pub weeks_at_registration: Option<u32>,
  pub anchor_weekday:        Option<Weekday>,
  pub registration_date:     Option<NaiveDate>,
}

impl TimelineFields {
  /// Attach a kind and clear stale dependent fields.
  pub fn into_subject(self, kind: TimelineKind) -> TimelineSubject {
    TimelineSubject {
      kind,
      is_active: self.active,
      weeks_at_registration: self.weeks_at_registration,
      anchor_weekday: self.anchor_weekday,
      registration_date: self.registration_date,
    }
    .normalized()
  }
}

/// A pregnancy or postpartum period as recorded on a patient.
///
/// When `is_active` is false the three dependent fields carry no meaning.
/// Stores call [`TimelineSubject::normalized`] before every write so that
/// they are always `None` in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSubject {
  pub kind:                  TimelineKind,
  pub is_active:             bool,
  pub weeks_at_registration: Option<u32>,
  pub anchor_weekday:        Option<Weekday>,
  pub registration_date:     Option<NaiveDate>,
}

impl TimelineSubject {
  pub fn inactive(kind: TimelineKind) -> Self {
    Self {
      kind,
      is_active: false,
      weeks_at_registration: None,
      anchor_weekday: None,
      registration_date: None,
    }
  }

  pub fn active(
    kind: TimelineKind,
    weeks_at_registration: u32,
    anchor_weekday: Weekday,
    registration_date: NaiveDate,
  ) -> Self {
    Self {
      kind,
      is_active: true,
      weeks_at_registration: Some(weeks_at_registration),
      anchor_weekday: Some(anchor_weekday),
      registration_date: Some(registration_date),
    }
  }

  /// Clear the dependent fields if the subject is inactive.
  #[must_use]
  pub fn normalized(self) -> Self {
    if self.is_active { self } else { Self::inactive(self.kind) }
  }

  pub fn fields(&self) -> TimelineFields {
    TimelineFields {
      active:                self.is_active,
      weeks_at_registration: self.weeks_at_registration,
      anchor_weekday:        self.anchor_weekday,
      registration_date:     self.registration_date,
    }
  }

  pub fn start_date(&self) -> Option<NaiveDate> {
    estimate_start_date(
      self.weeks_at_registration,
      self.anchor_weekday,
      self.registration_date,
    )
  }

  pub fn current_weeks(&self, today: NaiveDate) -> Option<u32> {
    estimate_current_weeks(self, today)
  }

  pub fn display(&self, today: NaiveDate) -> Option<String> {
    format_display(self, today)
  }

  /// Everything a summary or detail screen shows about this period.
  pub fn view(&self, today: NaiveDate) -> TimelineView {
    TimelineView {
      kind:          self.kind,
      active:        self.is_active,
      start_date:    if self.is_active { self.start_date() } else { None },
      current_weeks: self.current_weeks(today),
      label:         self.display(today),
      anchor_day:    self
        .anchor_weekday
        .filter(|_| self.is_active)
        .map(|w| w.label().to_owned()),
    }
  }
}

/// Read model for one timeline, computed against a single `today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
  pub kind:          TimelineKind,
  pub active:        bool,
  pub start_date:    Option<NaiveDate>,
  pub current_weeks: Option<u32>,
  pub label:         Option<String>,
  /// Weekday on which the week count advances, e.g. `"Miércoles"`.
  pub anchor_day:    Option<String>,
}

// ─── Estimation ──────────────────────────────────────────────────────────────

/// The most recent `anchor` on or before `date`.
pub fn last_anchor_day(date: NaiveDate, anchor: Weekday) -> Option<NaiveDate> {
  let back = (date.weekday().num_days_from_monday() + 7 - anchor.index()) % 7;
  date.checked_sub_days(Days::new(u64::from(back)))
}

/// Back-project the start of the tracked period.
///
/// Returns `None` unless all three inputs are present.
pub fn estimate_start_date(
  weeks_at_registration: Option<u32>,
  anchor_weekday: Option<Weekday>,
  registration_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
  let weeks = weeks_at_registration?;
  let anchor = last_anchor_day(registration_date?, anchor_weekday?)?;
  anchor.checked_sub_days(Days::new(u64::from(weeks) * 7))
}

/// Complete anchor-aligned weeks elapsed between the inferred start and
/// `today`.
///
/// Falls back to the registered week count when the start date cannot be
/// computed, and never goes below zero.
pub fn estimate_current_weeks(
  subject: &TimelineSubject,
  today: NaiveDate,
) -> Option<u32> {
  if !subject.is_active {
    return None;
  }

  let (Some(start), Some(anchor)) = (subject.start_date(), subject.anchor_weekday)
  else {
    return subject.weeks_at_registration;
  };

  let Some(checkpoint) = last_anchor_day(today, anchor) else {
    return Some(0);
  };

  let elapsed_days = (checkpoint - start).num_days().max(0);
  Some(u32::try_from(elapsed_days / 7).unwrap_or(u32::MAX))
}

/// Short label such as `"🤰 13 semanas"`.
pub fn format_display(subject: &TimelineSubject, today: NaiveDate) -> Option<String> {
  if !subject.is_active {
    return None;
  }

  let marker = subject.kind.marker();
  let label = match (subject.kind, estimate_current_weeks(subject, today)) {
    (TimelineKind::Pregnancy, Some(n)) => format!("{marker} {n} {}", weeks_word(n)),
    (TimelineKind::Postpartum, Some(n)) => {
      format!("{marker} {n} {} posparto", weeks_word(n))
    }
    (TimelineKind::Pregnancy, None) => format!("{marker} Embarazada"),
    (TimelineKind::Postpartum, None) => format!("{marker} Posparto"),
  };
  Some(label)
}

fn weeks_word(n: u32) -> &'static str {
  if n == 1 { "semana" } else { "semanas" }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn thursday_subject() -> TimelineSubject {
    TimelineSubject::active(
      TimelineKind::Pregnancy,
      12,
      Weekday::Thursday,
      date(2024, 3, 7),
    )
  }

  #[test]
  fn weekday_mapping_matches_chrono() {
    for (i, w) in Weekday::iter().enumerate() {
      assert_eq!(w.index(), i as u32);
    }
    // 2024-01-01 was a Monday.
    let monday = date(2024, 1, 1);
    for offset in 0..7u64 {
      let d = monday.checked_add_days(Days::new(offset)).unwrap();
      assert_eq!(Weekday::from(d.weekday()).index(), offset as u32);
    }
  }

  #[test]
  fn weekday_parses_spanish_names() {
    assert_eq!(Weekday::from_str("jueves").unwrap(), Weekday::Thursday);
    assert_eq!(Weekday::Wednesday.as_ref(), "miercoles");
    assert!(Weekday::from_str("thursday").is_err());
  }

  #[test]
  fn last_anchor_day_on_anchor_is_identity() {
    let d = date(2024, 3, 7);
    assert_eq!(last_anchor_day(d, Weekday::Thursday), Some(d));
  }

  #[test]
  fn last_anchor_day_goes_back_within_a_week() {
    // Wednesday 2024-03-13 → Thursday 2024-03-07.
    assert_eq!(
      last_anchor_day(date(2024, 3, 13), Weekday::Thursday),
      Some(date(2024, 3, 7))
    );
    // Friday 2024-03-08 → Thursday 2024-03-07.
    assert_eq!(
      last_anchor_day(date(2024, 3, 8), Weekday::Thursday),
      Some(date(2024, 3, 7))
    );
  }

  #[test]
  fn start_date_scenario() {
    assert_eq!(thursday_subject().start_date(), Some(date(2023, 12, 14)));
  }

  #[test]
  fn start_date_uses_anchor_not_registration_day() {
    // Registered on the Saturday after the anchor Thursday.
    let start =
      estimate_start_date(Some(12), Some(Weekday::Thursday), Some(date(2024, 3, 9)));
    assert_eq!(start, Some(date(2023, 12, 14)));
  }

  #[test]
  fn one_week_later_advances_by_one() {
    let s = thursday_subject();
    assert_eq!(s.current_weeks(date(2024, 3, 7)), Some(12));
    // 2024-03-14 − 2023-12-14 = 91 days.
    assert_eq!(s.current_weeks(date(2024, 3, 14)), Some(13));
  }

  #[test]
  fn day_before_next_anchor_keeps_previous_count() {
    let s = thursday_subject();
    assert_eq!(s.current_weeks(date(2024, 3, 13)), Some(12));
    assert_eq!(s.current_weeks(date(2024, 3, 20)), Some(13));
  }

  #[test]
  fn missing_field_falls_back_to_registered_weeks() {
    let mut s = thursday_subject();
    s.anchor_weekday = None;
    assert_eq!(s.start_date(), None);
    assert_eq!(s.current_weeks(date(2024, 6, 1)), Some(12));

    let mut s = thursday_subject();
    s.registration_date = None;
    assert_eq!(s.start_date(), None);
    assert_eq!(s.current_weeks(date(2024, 6, 1)), Some(12));

    let mut s = thursday_subject();
    s.weeks_at_registration = None;
    assert_eq!(s.start_date(), None);
    assert_eq!(s.current_weeks(date(2024, 6, 1)), None);
  }

  #[test]
  fn inactive_subject_has_no_weeks_or_label() {
    let mut s = thursday_subject();
    s.is_active = false;
    assert_eq!(s.current_weeks(date(2024, 3, 14)), None);
    assert_eq!(s.display(date(2024, 3, 14)), None);
  }

  #[test]
  fn today_before_start_clamps_to_zero() {
    let s = thursday_subject();
    assert_eq!(s.current_weeks(date(2023, 11, 1)), Some(0));
  }

  #[test]
  fn count_is_monotonic_and_steps_weekly() {
    let s = thursday_subject();
    let mut day = date(2023, 11, 1);
    let mut previous = 0;
    while day <= date(2024, 9, 30) {
      let weeks = s.current_weeks(day).unwrap();
      assert!(weeks >= previous, "count went backwards on {day}");

      let anchor = last_anchor_day(day, Weekday::Thursday).unwrap();
      assert_eq!(s.current_weeks(anchor), Some(weeks), "step broken on {day}");

      previous = weeks;
      day = day.succ_opt().unwrap();
    }
  }

  #[test]
  fn estimate_is_deterministic() {
    let s = thursday_subject();
    let today = date(2024, 5, 2);
    assert_eq!(s.current_weeks(today), s.current_weeks(today));
  }

  #[test]
  fn normalized_clears_inactive_fields() {
    let mut s = thursday_subject();
    s.is_active = false;
    let s = s.normalized();
    assert_eq!(s, TimelineSubject::inactive(TimelineKind::Pregnancy));

    let active = thursday_subject();
    assert_eq!(active.clone().normalized(), active);
  }

  #[test]
  fn fields_into_subject_clears_when_inactive() {
    let fields = TimelineFields {
      active:                false,
      weeks_at_registration: Some(20),
      anchor_weekday:        Some(Weekday::Monday),
      registration_date:     Some(date(2024, 1, 1)),
    };
    let s = fields.into_subject(TimelineKind::Postpartum);
    assert!(!s.is_active);
    assert_eq!(s.weeks_at_registration, None);
    assert_eq!(s.anchor_weekday, None);
    assert_eq!(s.registration_date, None);
  }

  #[test]
  fn display_labels() {
    let s = thursday_subject();
    assert_eq!(s.display(date(2024, 3, 14)).as_deref(), Some("🤰 13 semanas"));

    let post = TimelineSubject::active(
      TimelineKind::Postpartum,
      1,
      Weekday::Monday,
      date(2024, 1, 1),
    );
    assert_eq!(post.display(date(2024, 1, 3)).as_deref(), Some("👶 1 semana posparto"));

    let unknown = TimelineSubject {
      kind:                  TimelineKind::Pregnancy,
      is_active:             true,
      weeks_at_registration: None,
      anchor_weekday:        None,
      registration_date:     None,
    };
    assert_eq!(unknown.display(date(2024, 1, 3)).as_deref(), Some("🤰 Embarazada"));
  }

  #[test]
  fn view_of_inactive_subject_is_empty() {
    let view = TimelineSubject::inactive(TimelineKind::Postpartum).view(date(2024, 1, 1));
    assert!(!view.active);
    assert_eq!(view.start_date, None);
    assert_eq!(view.current_weeks, None);
    assert_eq!(view.label, None);
  }
}
