//! [`SqliteStore`]: the SQLite implementation of [`ClinicStore`].

use std::path::Path;

use chrono::SubsecRound as _;
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use piso_core::{
  appointment::{Appointment, AppointmentInput, AppointmentListing},
  dashboard::{SortKey, SortOrder},
  ficha::{FichaClinica, FichaInput},
  patient::{Patient, PatientInput, PatientSummary},
  practitioner::{NewPractitioner, Practitioner},
  store::{AppointmentQuery, ClinicStore, PatientQuery},
};

use crate::{
  encode::{
    APPOINTMENT_COLUMNS, FICHA_COLUMNS, PATIENT_COLUMNS, PRACTITIONER_COLUMNS,
    RawAppointment, RawFicha, RawPatient, RawPatientSummary, RawPractitioner,
    encode_balloon, encode_body, encode_date, encode_dt, encode_evaluation,
    encode_perfect, encode_timeline, encode_uuid, now,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A clinical record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether `patient_id` exists and belongs to `practitioner_id`.
  async fn owns_patient(&self, practitioner_id: Uuid, patient_id: Uuid) -> Result<bool> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);

    let owned = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM patients WHERE patient_id = ?1 AND practitioner_id = ?2",
              rusqlite::params![patient_str, owner_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(owned)
  }

  async fn fetch_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
  ) -> Result<Option<FichaClinica>> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);
    let ficha_str   = encode_uuid(ficha_id);

    let raw: Option<RawFicha> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FICHA_COLUMNS}
                 FROM fichas f
                 JOIN patients p ON p.patient_id = f.patient_id
                 WHERE f.ficha_id = ?1 AND f.patient_id = ?2 AND p.practitioner_id = ?3"
              ),
              rusqlite::params![ficha_str, patient_str, owner_str],
              RawFicha::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFicha::into_ficha).transpose()
  }
}

/// Register `casefold(text)`, a Unicode-aware lowercase. SQLite's own
/// `lower()` and `LIKE` only fold ASCII letters.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "casefold",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
  )
}

fn patient_order_clause(sort: SortKey, order: SortOrder) -> &'static str {
  match (sort, order) {
    (SortKey::Name, SortOrder::Asc) => "p.full_name COLLATE NOCASE ASC",
    (SortKey::Name, SortOrder::Desc) => "p.full_name COLLATE NOCASE DESC",
    (SortKey::Appointment, SortOrder::Asc) => {
      "last_appointment ASC, p.full_name COLLATE NOCASE ASC"
    }
    (SortKey::Appointment, SortOrder::Desc) => {
      "last_appointment DESC, p.full_name COLLATE NOCASE ASC"
    }
  }
}

/// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<usize>) -> i64 {
  limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

// ─── ClinicStore impl ────────────────────────────────────────────────────────

impl ClinicStore for SqliteStore {
  type Error = Error;

  // ── Practitioners ─────────────────────────────────────────────────────────

  async fn create_practitioner(&self, input: NewPractitioner) -> Result<Practitioner> {
    let practitioner = Practitioner {
      practitioner_id: Uuid::new_v4(),
      username:        input.username,
      practice_name:   input.practice_name,
      license_number:  input.license_number,
      created_at:      now(),
    };

    let id_str   = encode_uuid(practitioner.practitioner_id);
    let username = practitioner.username.clone();
    let practice = practitioner.practice_name.clone();
    let license  = practitioner.license_number.clone();
    let hash     = input.password_hash;
    let at_str   = encode_dt(practitioner.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM practitioners WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO practitioners (
             practitioner_id, username, practice_name, license_number,
             password_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, practice, license, hash, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::UsernameTaken(practitioner.username));
    }

    tracing::info!(username = %practitioner.username, "practitioner created");
    Ok(practitioner)
  }

  async fn set_password(&self, username: &str, password_hash: &str) -> Result<bool> {
    let username = username.to_owned();
    let hash     = password_hash.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE practitioners SET password_hash = ?1 WHERE username = ?2",
          rusqlite::params![hash, username],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn get_practitioner(&self, id: Uuid) -> Result<Option<Practitioner>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPractitioner> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PRACTITIONER_COLUMNS} FROM practitioners WHERE practitioner_id = ?1"
              ),
              rusqlite::params![id_str],
              RawPractitioner::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPractitioner::into_practitioner).transpose()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<(Practitioner, String)>> {
    let username = username.to_owned();

    let raw: Option<(RawPractitioner, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PRACTITIONER_COLUMNS}, password_hash
                 FROM practitioners WHERE username = ?1"
              ),
              rusqlite::params![username],
              |row| Ok((RawPractitioner::from_row(row)?, row.get(5)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(p, hash)| Ok::<_, Error>((p.into_practitioner()?, hash)))
      .transpose()
  }

  // ── Patients ──────────────────────────────────────────────────────────────

  async fn create_patient(&self, practitioner_id: Uuid, input: PatientInput) -> Result<Patient> {
    let at = now();
    let patient = Patient {
      patient_id: Uuid::new_v4(),
      practitioner_id,
      pregnancy: input.pregnancy_subject(),
      postpartum: input.postpartum_subject(),
      full_name: input.full_name,
      age: input.age,
      profession: input.profession,
      address: input.address,
      phone: input.phone,
      medications: input.medications,
      musculoskeletal_history: input.musculoskeletal_history,
      consultation_reason: input.consultation_reason,
      created_at: at,
      updated_at: at,
    };

    let id_str    = encode_uuid(patient.patient_id);
    let owner_str = encode_uuid(practitioner_id);
    let at_str    = encode_dt(at);
    let (preg, preg_weeks, preg_day, preg_on) = encode_timeline(&patient.pregnancy);
    let (post, post_weeks, post_day, post_on) = encode_timeline(&patient.postpartum);
    let p = patient.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO patients (
             patient_id, practitioner_id, full_name, age,
             profession, address, phone, medications,
             musculoskeletal_history, consultation_reason,
             pregnant, pregnancy_weeks, pregnancy_weekday, pregnancy_registered_on,
             postpartum, postpartum_weeks, postpartum_weekday, postpartum_registered_on,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19)",
          rusqlite::params![
            id_str,
            owner_str,
            p.full_name,
            p.age,
            p.profession,
            p.address,
            p.phone,
            p.medications,
            p.musculoskeletal_history,
            p.consultation_reason,
            preg,
            preg_weeks,
            preg_day,
            preg_on,
            post,
            post_weeks,
            post_day,
            post_on,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(patient_id = %patient.patient_id, "patient created");
    Ok(patient)
  }

  async fn get_patient(&self, practitioner_id: Uuid, patient_id: Uuid) -> Result<Option<Patient>> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);

    let raw: Option<RawPatient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PATIENT_COLUMNS} FROM patients p
                 WHERE p.patient_id = ?1 AND p.practitioner_id = ?2"
              ),
              rusqlite::params![patient_str, owner_str],
              RawPatient::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPatient::into_patient).transpose()
  }

  async fn update_patient(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: PatientInput,
  ) -> Result<Option<Patient>> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);
    let at_str      = encode_dt(now());
    let (preg, preg_weeks, preg_day, preg_on) = encode_timeline(&input.pregnancy_subject());
    let (post, post_weeks, post_day, post_on) = encode_timeline(&input.postpartum_subject());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE patients SET
             full_name = ?3, age = ?4, profession = ?5, address = ?6, phone = ?7,
             medications = ?8, musculoskeletal_history = ?9, consultation_reason = ?10,
             pregnant = ?11, pregnancy_weeks = ?12, pregnancy_weekday = ?13,
             pregnancy_registered_on = ?14,
             postpartum = ?15, postpartum_weeks = ?16, postpartum_weekday = ?17,
             postpartum_registered_on = ?18,
             updated_at = ?19
           WHERE patient_id = ?1 AND practitioner_id = ?2",
          rusqlite::params![
            patient_str,
            owner_str,
            input.full_name,
            input.age,
            input.profession,
            input.address,
            input.phone,
            input.medications,
            input.musculoskeletal_history,
            input.consultation_reason,
            preg,
            preg_weeks,
            preg_day,
            preg_on,
            post,
            post_weeks,
            post_day,
            post_on,
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    tracing::info!(%patient_id, "patient updated");
    self.get_patient(practitioner_id, patient_id).await
  }

  async fn delete_patient(&self, practitioner_id: Uuid, patient_id: Uuid) -> Result<bool> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM patients WHERE patient_id = ?1 AND practitioner_id = ?2",
          rusqlite::params![patient_str, owner_str],
        )?)
      })
      .await?;

    if deleted > 0 {
      tracing::info!(%patient_id, "patient deleted");
    }
    Ok(deleted > 0)
  }

  async fn list_patients(
    &self,
    practitioner_id: Uuid,
    query: &PatientQuery,
  ) -> Result<Vec<PatientSummary>> {
    let owner_str    = encode_uuid(practitioner_id);
    let name_needle = query
      .name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(str::to_lowercase);
    let order_clause = patient_order_clause(query.sort, query.order);
    let limit_val    = sql_limit(query.limit);
    let offset_val   = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawPatientSummary> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PATIENT_COLUMNS},
                  MAX(a.date_time)        AS last_appointment,
                  COUNT(a.appointment_id) AS appointment_count
           FROM patients p
           LEFT JOIN appointments a ON a.patient_id = p.patient_id
           WHERE p.practitioner_id = ?1
             AND (?2 IS NULL OR instr(casefold(p.full_name), ?2) > 0)
           GROUP BY p.patient_id
           ORDER BY {order_clause}
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, name_needle, limit_val, offset_val],
            RawPatientSummary::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPatientSummary::into_summary).collect()
  }

  // ── Fichas clínicas ───────────────────────────────────────────────────────

  async fn create_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: FichaInput,
  ) -> Result<Option<FichaClinica>> {
    if !self.owns_patient(practitioner_id, patient_id).await? {
      return Ok(None);
    }

    let at = now();
    let ficha = FichaClinica {
      ficha_id:    Uuid::new_v4(),
      patient_id,
      recorded_on: input.recorded_on,
      body:        input.body,
      created_at:  at,
      updated_at:  at,
    };

    let id_str      = encode_uuid(ficha.ficha_id);
    let patient_str = encode_uuid(patient_id);
    let on_str      = encode_date(ficha.recorded_on);
    let body_str    = encode_body(&ficha.body)?;
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fichas (ficha_id, patient_id, recorded_on, body_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, patient_str, on_str, body_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(%patient_id, ficha_id = %ficha.ficha_id, "ficha created");
    Ok(Some(ficha))
  }

  async fn list_fichas(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
  ) -> Result<Option<Vec<FichaClinica>>> {
    if !self.owns_patient(practitioner_id, patient_id).await? {
      return Ok(None);
    }

    let patient_str = encode_uuid(patient_id);

    let raws: Vec<RawFicha> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FICHA_COLUMNS} FROM fichas f
           WHERE f.patient_id = ?1
           ORDER BY f.recorded_on DESC, f.created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![patient_str], RawFicha::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let fichas = raws
      .into_iter()
      .map(RawFicha::into_ficha)
      .collect::<Result<Vec<_>>>()?;
    Ok(Some(fichas))
  }

  async fn get_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
  ) -> Result<Option<FichaClinica>> {
    self.fetch_ficha(practitioner_id, patient_id, ficha_id).await
  }

  async fn update_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
    input: FichaInput,
  ) -> Result<Option<FichaClinica>> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);
    let ficha_str   = encode_uuid(ficha_id);
    let on_str      = encode_date(input.recorded_on);
    let body_str    = encode_body(&input.body)?;
    let at_str      = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE fichas SET recorded_on = ?4, body_json = ?5, updated_at = ?6
           WHERE ficha_id = ?1 AND patient_id = ?2
             AND patient_id IN (SELECT patient_id FROM patients WHERE practitioner_id = ?3)",
          rusqlite::params![ficha_str, patient_str, owner_str, on_str, body_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    tracing::info!(%ficha_id, "ficha updated");
    self.fetch_ficha(practitioner_id, patient_id, ficha_id).await
  }

  async fn delete_ficha(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    ficha_id: Uuid,
  ) -> Result<bool> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = encode_uuid(patient_id);
    let ficha_str   = encode_uuid(ficha_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM fichas
           WHERE ficha_id = ?1 AND patient_id = ?2
             AND patient_id IN (SELECT patient_id FROM patients WHERE practitioner_id = ?3)",
          rusqlite::params![ficha_str, patient_str, owner_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  async fn create_appointment(
    &self,
    practitioner_id: Uuid,
    patient_id: Uuid,
    input: AppointmentInput,
  ) -> Result<Option<Appointment>> {
    if !self.owns_patient(practitioner_id, patient_id).await? {
      return Ok(None);
    }

    let at = now();
    let appointment = Appointment {
      appointment_id:      Uuid::new_v4(),
      patient_id,
      date_time:           input.date_time.trunc_subsecs(6),
      session_description: input.session_description,
      evaluation:          input.evaluation,
      additional_notes:    input.additional_notes,
      perfect:             input.perfect,
      balloon_test:        input.balloon_test,
      created_at:          at,
      updated_at:          at,
    };

    let id_str      = encode_uuid(appointment.appointment_id);
    let patient_str = encode_uuid(patient_id);
    let when_str    = encode_dt(appointment.date_time);
    let eval_str    = encode_evaluation(appointment.evaluation);
    let perfect_str = encode_perfect(appointment.perfect.as_ref())?;
    let balloon_str = encode_balloon(appointment.balloon_test.as_ref())?;
    let at_str      = encode_dt(at);
    let description = appointment.session_description.clone();
    let notes       = appointment.additional_notes.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO appointments (
             appointment_id, patient_id, date_time, session_description,
             evaluation, additional_notes, perfect_json, balloon_json,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            patient_str,
            when_str,
            description,
            eval_str,
            notes,
            perfect_str,
            balloon_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(
      %patient_id,
      appointment_id = %appointment.appointment_id,
      "appointment created"
    );
    Ok(Some(appointment))
  }

  async fn get_appointment(
    &self,
    practitioner_id: Uuid,
    appointment_id: Uuid,
  ) -> Result<Option<AppointmentListing>> {
    let owner_str = encode_uuid(practitioner_id);
    let id_str    = encode_uuid(appointment_id);

    let raw: Option<RawAppointment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {APPOINTMENT_COLUMNS}
                 FROM appointments a
                 JOIN patients p ON p.patient_id = a.patient_id
                 WHERE a.appointment_id = ?1 AND p.practitioner_id = ?2"
              ),
              rusqlite::params![id_str, owner_str],
              RawAppointment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAppointment::into_listing).transpose()
  }

  async fn update_appointment(
    &self,
    practitioner_id: Uuid,
    appointment_id: Uuid,
    input: AppointmentInput,
  ) -> Result<Option<Appointment>> {
    let owner_str   = encode_uuid(practitioner_id);
    let id_str      = encode_uuid(appointment_id);
    let when_str    = encode_dt(input.date_time.trunc_subsecs(6));
    let eval_str    = encode_evaluation(input.evaluation);
    let perfect_str = encode_perfect(input.perfect.as_ref())?;
    let balloon_str = encode_balloon(input.balloon_test.as_ref())?;
    let at_str      = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE appointments SET
             date_time = ?3, session_description = ?4, evaluation = ?5,
             additional_notes = ?6, perfect_json = ?7, balloon_json = ?8,
             updated_at = ?9
           WHERE appointment_id = ?1
             AND patient_id IN (SELECT patient_id FROM patients WHERE practitioner_id = ?2)",
          rusqlite::params![
            id_str,
            owner_str,
            when_str,
            input.session_description,
            eval_str,
            input.additional_notes,
            perfect_str,
            balloon_str,
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    tracing::info!(%appointment_id, "appointment updated");
    Ok(
      self
        .get_appointment(practitioner_id, appointment_id)
        .await?
        .map(|l| l.appointment),
    )
  }

  async fn delete_appointment(&self, practitioner_id: Uuid, appointment_id: Uuid) -> Result<bool> {
    let owner_str = encode_uuid(practitioner_id);
    let id_str    = encode_uuid(appointment_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM appointments
           WHERE appointment_id = ?1
             AND patient_id IN (SELECT patient_id FROM patients WHERE practitioner_id = ?2)",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn list_appointments(
    &self,
    practitioner_id: Uuid,
    query: &AppointmentQuery,
  ) -> Result<Vec<AppointmentListing>> {
    let owner_str   = encode_uuid(practitioner_id);
    let patient_str = query.patient_id.map(encode_uuid);
    let from_str    = query.range.from.map(encode_date);
    let to_str      = query.range.to.map(encode_date);
    let eval_str    = query.evaluation.map(encode_evaluation);
    let limit_val   = sql_limit(query.limit);

    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {APPOINTMENT_COLUMNS}
           FROM appointments a
           JOIN patients p ON p.patient_id = a.patient_id
           WHERE p.practitioner_id = ?1
             AND (?2 IS NULL OR a.patient_id = ?2)
             AND (?3 IS NULL OR substr(a.date_time, 1, 10) >= ?3)
             AND (?4 IS NULL OR substr(a.date_time, 1, 10) <= ?4)
             AND (?5 IS NULL OR a.evaluation = ?5)
           ORDER BY a.date_time DESC
           LIMIT ?6"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, patient_str, from_str, to_str, eval_str, limit_val],
            RawAppointment::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppointment::into_listing).collect()
  }
}
