//! Stored-session handling.
//!
//! The signed-in session (bearer token + operator profile) is persisted in
//! the application's key-value storage under fixed keys. On startup the token
//! is inspected client-side: its `exp` claim decides whether the session is
//! worth restoring at all. This is best-effort only: the signature is not
//! verified here, the server remains the authority and will answer 401 to a
//! token it does not accept. Malformed tokens are treated as absent, never as
//! an error.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::{debug, info};
use serde::Deserialize;

use crate::types::UserProfile;

pub const SESSION_TOKEN_KEY: &str = "walletboard.session.token";
pub const SESSION_PROFILE_KEY: &str = "walletboard.session.profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// The token's expiry claim, if the token decodes and carries one.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    let exp = data.claims.exp?;
    DateTime::<Utc>::from_timestamp(exp, 0)
}

/// Whether the token decodes and its expiry lies in the future.
pub fn token_is_live(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Some(expiry) => expiry > now,
        None => false,
    }
}

/// Restores the stored session, discarding expired or malformed tokens.
///
/// `read` abstracts the storage backend (`eframe::Storage::get_string` in
/// the application, a closure over a map in tests).
pub fn load(read: impl Fn(&str) -> Option<String>, now: DateTime<Utc>) -> Option<StoredSession> {
    let token = read(SESSION_TOKEN_KEY).filter(|token| !token.is_empty())?;
    let profile_json = read(SESSION_PROFILE_KEY).filter(|profile| !profile.is_empty())?;

    if !token_is_live(&token, now) {
        debug!("session: stored token expired or malformed, discarding");
        return None;
    }

    let profile: UserProfile = serde_json::from_str(&profile_json).ok()?;
    info!("session: restored for {}", profile.email);
    Some(StoredSession { token, profile })
}

/// Persists the session under the fixed keys.
pub fn save(mut write: impl FnMut(&str, String), session: &StoredSession) {
    write(SESSION_TOKEN_KEY, session.token.clone());
    if let Ok(profile_json) = serde_json::to_string(&session.profile) {
        write(SESSION_PROFILE_KEY, profile_json);
    }
}

/// Clears the stored session. Storage backends without deletion semantics
/// get empty strings, which `load` treats as absent.
pub fn clear(mut write: impl FnMut(&str, String)) {
    write(SESSION_TOKEN_KEY, String::new());
    write(SESSION_PROFILE_KEY, String::new());
}
