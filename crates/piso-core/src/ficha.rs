//! Ficha clínica: the structured pelvic-floor intake form.
//!
//! A ficha is mostly free text and checkboxes grouped into the sections a
//! practitioner fills in during the first consultation. Every field defaults
//! to empty so partially completed forms deserialise cleanly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A yes/no answer that may be left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
  Si,
  No,
}

/// Result of the push (pujo) manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushExam {
  Normal,
  Alterado,
}

// ─── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GynecologicalHistory {
  pub menopause:               Option<YesNo>,
  /// How long ago menopause began.
  pub menopause_time:          String,
  pub regular_menstrual_cycle: Option<YesNo>,
  pub previous_surgeries:      String,
  /// G — gestations.
  pub pregnancies_g:           Option<u32>,
  /// A — abortions.
  pub abortions_a:             Option<u32>,
  /// P — losses.
  pub losses_p:                Option<u32>,
  pub child_weight:            String,
  /// Normal and/or caesarean.
  pub delivery_type:           String,
  pub episiotomies:            Option<YesNo>,
  pub postpartum:              String,
  pub instrumentation:         String,
  pub muscle_tear:             String,
  pub io:                      bool,
  pub if_flag:                 bool,
  pub ig:                      bool,
  pub prolapse:                Option<YesNo>,
  pub prolapse_type:           String,
  pub allergies:               String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifestyle {
  pub smoking:                  Option<YesNo>,
  pub alcohol:                  Option<YesNo>,
  pub physical_activity:        String,
  pub diet:                     String,
  pub daily_liquid_consumption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrinaryFunction {
  pub daily_frequency:     String,
  pub nocturnal_frequency: String,
  pub pollakiuria:         bool,
  pub nocturia:            bool,
  pub urgency:             bool,
  pub polyuria:            bool,
  pub dysuria:             bool,
  pub latency:             bool,
  pub effort_to_urinate:   bool,
  pub incomplete_emptying: bool,
  pub immediate_need:      bool,
  pub terminal_dripping:   bool,
  pub nocturnal_urgency:   bool,
  pub urination_position:  String,
  pub stream_description:  String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrinaryIncontinence {
  /// Stress urinary incontinence.
  pub iue:                     bool,
  /// Urge urinary incontinence.
  pub iuu:                     bool,
  /// Mixed urinary incontinence.
  pub ium:                     bool,
  pub posture:                 bool,
  pub sensitivity:             bool,
  pub coital:                  bool,
  pub other:                   String,
  pub when_occurs_daily:       String,
  pub how_daily:               String,
  pub since_when:              String,
  pub during_pregnancy:        String,
  pub post_pregnancy:          String,
  pub prolapse_post_pregnancy: String,
  pub conscious_urination:     String,
  pub containment_capacity:    String,
  pub protection_type:         String,
  pub activities_stopped:      String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BowelFunction {
  pub constipation:             bool,
  pub fecal_incontinence:       bool,
  pub gas_incontinence:         bool,
  pub hemorrhoids:              bool,
  pub rectocele:                bool,
  pub position_frequency:       bool,
  pub gas_stool_discrimination: bool,
  pub painful_evacuation:       bool,
  pub straining_defecation:     bool,
  pub complete_evacuation:      bool,
  pub laxatives:                bool,
  pub plugging_sensation:       bool,
  pub defecation_position:      String,
  /// Bristol stool scale, 1–7.
  pub bristol_scale:            Option<u8>,
  pub inconsistency:            String,
  pub conscious:                String,
  pub pad:                      String,
  pub activities_stopped:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SexualHistory {
  pub sexually_active:                  bool,
  pub sexually_active_when:             String,
  pub urinary_incontinence_sexual:      bool,
  pub urinary_incontinence_sexual_when: String,
  pub fecal_incontinence_sexual:        bool,
  pub fecal_incontinence_sexual_when:   String,
  pub desire:                           bool,
  pub excitement:                       bool,
  pub orgasm:                           bool,
  pub dyspareunia:                      bool,
  pub urge_to_urinate_during_sex:       bool,
  pub vaginal_dryness:                  bool,
  pub impaired_by_incontinence:         bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalExam {
  pub diastasis:              String,
  pub scars:                  String,
  pub adherences:             String,
  pub skin_coloration:        String,
  pub push_exam:              Option<PushExam>,
  pub nlp_tone_contraction:   String,
  pub nlp_tone_relaxation:    String,
  pub nlp_tone_push:          String,
  pub nlp_tone_pain:          String,
  // S2–S4 dermatome reflexes.
  pub anal_cutaneous_reflex:  bool,
  pub vulvo_cavernous_reflex: bool,
  pub cough_reflex:           bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntracavitaryExam {
  pub consent:                  bool,
  pub scars:                    String,
  pub mucosa:                   String,
  // MEA: levator ani muscles.
  pub mea_tonicity_rest:        String,
  pub mea_perception:           String,
  pub mea_contraction:          String,
  pub mea_symmetry_rest:        String,
  pub mea_symmetry_contraction: String,
  pub mea_voluntary_relaxation: String,
  /// Visual analogue pain scale, 0–10.
  pub mea_pain_eva:             Option<u8>,
  pub mea_pain_location:        String,
  pub mea_pain_when:            String,
  pub mea_pain_description:     String,
  pub urethral_movement:        String,
  pub transverse_urethral_tone: String,
  pub oxford_force:             String,
  pub superficial_muscle:       String,
  pub deep_musculature:         String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoproctologicExam {
  pub consent:                      bool,
  pub anal_canal_closure:           bool,
  pub irritation:                   bool,
  pub stool_remains:                bool,
  pub blind_rectum:                 bool,
  pub scars:                        String,
  pub hemorrhoids:                  String,
  pub rest_tone:                    String,
  pub resistance:                   String,
  /// External anal sphincter.
  pub eae_tonicity_rest:            String,
  pub eae_contraction:              String,
  pub oxford_anorectal_angle:       String,
  pub anorectal_opening:            bool,
  pub rectal_torso_synchronization: bool,
  pub anal_canal_relaxation:        bool,
}

// ─── Ficha ───────────────────────────────────────────────────────────────────

/// All sections of the intake form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FichaBody {
  pub gynecological:   GynecologicalHistory,
  pub lifestyle:       Lifestyle,
  pub urinary:         UrinaryFunction,
  pub incontinence:    UrinaryIncontinence,
  pub bowel:           BowelFunction,
  pub sexual:          SexualHistory,
  pub physical:        PhysicalExam,
  pub intracavitary:   IntracavitaryExam,
  pub coloproctologic: ColoproctologicExam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FichaClinica {
  pub ficha_id:    Uuid,
  pub patient_id:  Uuid,
  /// The consultation date the form was filled in.
  pub recorded_on: NaiveDate,
  pub body:        FichaBody,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// The writable subset of a [`FichaClinica`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FichaInput {
  pub recorded_on: NaiveDate,
  #[serde(default)]
  pub body:        FichaBody,
}
