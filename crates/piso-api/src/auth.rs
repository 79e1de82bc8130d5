//! HTTP Basic-auth extractor backed by the practitioners table.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use piso_core::{practitioner::Practitioner, store::ClinicStore};
use rand_core::OsRng;

use crate::{AppState, error::ApiError};

/// The authenticated practitioner making the request.
///
/// Every patient-facing handler takes this extractor; its id scopes all
/// store calls.
#[derive(Debug, Clone)]
pub struct CurrentPractitioner(pub Practitioner);

/// Hash `password` into an argon2id PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

/// Verified against when the username is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("piso-unknown-user").ok());

/// Extract `(username, password)` from an `Authorization: Basic …` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;

  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for CurrentPractitioner
where
  S: ClinicStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) =
      basic_credentials(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let found = state
      .store
      .find_credentials(&username)
      .await
      .map_err(ApiError::store)?;

    match found {
      Some((practitioner, phc)) if verify_password(&password, &phc) => {
        return Ok(CurrentPractitioner(practitioner));
      }
      Some(_) => {}
      None => {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
          verify_password(&password, dummy);
        }
      }
    }

    tracing::warn!(%username, "authentication failed");
    Err(ApiError::Unauthorized)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use base64::Engine as _;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn parses_basic_credentials() {
    let value = format!("Basic {}", B64.encode("ana:se:cret"));
    assert_eq!(
      basic_credentials(&headers(&value)),
      Some(("ana".to_owned(), "se:cret".to_owned()))
    );
  }

  #[test]
  fn rejects_malformed_headers() {
    assert_eq!(basic_credentials(&HeaderMap::new()), None);
    assert_eq!(basic_credentials(&headers("Bearer abc")), None);
    assert_eq!(basic_credentials(&headers("Basic !!!not-base64!!!")), None);
    let no_colon = format!("Basic {}", B64.encode("ana"));
    assert_eq!(basic_credentials(&headers(&no_colon)), None);
  }

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("secreto").unwrap();
    assert!(phc.starts_with("$argon2id$"));
    assert!(verify_password("secreto", &phc));
    assert!(!verify_password("otro", &phc));
    assert!(!verify_password("secreto", "not-a-phc-string"));
  }

  #[test]
  fn dummy_hash_is_a_real_phc_string() {
    let dummy = DUMMY_HASH.as_deref().unwrap();
    assert!(dummy.starts_with("$argon2id$"));
    assert!(!verify_password("secreto", dummy));
  }
}
