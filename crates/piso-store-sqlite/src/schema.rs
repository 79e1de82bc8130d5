//! SQL schema for the piso SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS practitioners (
    practitioner_id TEXT PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    practice_name   TEXT NOT NULL DEFAULT '',
    license_number  TEXT NOT NULL DEFAULT '',
    password_hash   TEXT NOT NULL,           -- argon2 PHC string
    created_at      TEXT NOT NULL
);

-- Timeline columns: when the flag is 0 the three dependent columns are NULL.
CREATE TABLE IF NOT EXISTS patients (
    patient_id               TEXT PRIMARY KEY,
    practitioner_id          TEXT NOT NULL
                             REFERENCES practitioners(practitioner_id) ON DELETE CASCADE,
    full_name                TEXT NOT NULL,
    age                      INTEGER NOT NULL,
    profession               TEXT NOT NULL DEFAULT '',
    address                  TEXT NOT NULL DEFAULT '',
    phone                    TEXT NOT NULL DEFAULT '',
    medications              TEXT NOT NULL DEFAULT '',
    musculoskeletal_history  TEXT NOT NULL DEFAULT '',
    consultation_reason      TEXT NOT NULL DEFAULT '',
    pregnant                 INTEGER NOT NULL DEFAULT 0,
    pregnancy_weeks          INTEGER,
    pregnancy_weekday        TEXT,          -- 'lunes' .. 'domingo'
    pregnancy_registered_on  TEXT,          -- ISO 8601 date
    postpartum               INTEGER NOT NULL DEFAULT 0,
    postpartum_weeks         INTEGER,
    postpartum_weekday       TEXT,
    postpartum_registered_on TEXT,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL,
    CHECK (pregnant = 1 OR (pregnancy_weeks IS NULL
                            AND pregnancy_weekday IS NULL
                            AND pregnancy_registered_on IS NULL)),
    CHECK (postpartum = 1 OR (postpartum_weeks IS NULL
                              AND postpartum_weekday IS NULL
                              AND postpartum_registered_on IS NULL))
);

CREATE TABLE IF NOT EXISTS fichas (
    ficha_id    TEXT PRIMARY KEY,
    patient_id  TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    recorded_on TEXT NOT NULL,
    body_json   TEXT NOT NULL,              -- serialised FichaBody
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id      TEXT PRIMARY KEY,
    patient_id          TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    date_time           TEXT NOT NULL,      -- fixed-width RFC 3339 UTC
    session_description TEXT NOT NULL,
    evaluation          TEXT NOT NULL
                        CHECK (evaluation IN ('excellent', 'good', 'fair', 'poor', 'critical')),
    additional_notes    TEXT NOT NULL DEFAULT '',
    perfect_json        TEXT,
    balloon_json        TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS patients_practitioner_idx ON patients(practitioner_id);
CREATE INDEX IF NOT EXISTS patients_name_idx         ON patients(full_name);
CREATE INDEX IF NOT EXISTS fichas_patient_idx        ON fichas(patient_id);
CREATE INDEX IF NOT EXISTS appointments_patient_idx  ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS appointments_date_idx     ON appointments(date_time);

PRAGMA user_version = 1;
";
