//! API error type and user-facing message mapping.

use thiserror::Error;

/// Failure of an API call.
///
/// `Status` is the normal failure path: the server answered with a non-2xx
/// status and we keep whatever body text it sent for diagnostics. `Network`
/// covers everything else the transport can throw at us (DNS, refused
/// connection, aborted transfer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        /// Raw response body, read best-effort; `None` when unreadable.
        body_text: Option<String>,
    },

    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Status-code to user-facing message table.
///
/// Tables can override individual messages per instance; `describe` is the
/// single place the mapping policy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessages {
    pub bad_request: String,
    pub session_expired: String,
    pub not_found: String,
    pub rate_limited: String,
    pub server_error: String,
    pub fallback: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            bad_request: "The request was rejected by the server.".to_owned(),
            session_expired: "Your session has expired. Please sign in again.".to_owned(),
            not_found: "The requested data could not be found.".to_owned(),
            rate_limited: "Too many requests. Please wait a moment and retry.".to_owned(),
            server_error: "The server encountered an error. Please try again later.".to_owned(),
            fallback: "Something went wrong while loading data.".to_owned(),
        }
    }
}

impl ErrorMessages {
    pub fn describe(&self, error: &ApiError) -> String {
        match error {
            ApiError::Status { status, .. } => match status {
                400 => self.bad_request.clone(),
                401 => self.session_expired.clone(),
                404 => self.not_found.clone(),
                429 => self.rate_limited.clone(),
                500.. => self.server_error.clone(),
                _ => self.fallback.clone(),
            },
            ApiError::Network(_) => self.fallback.clone(),
        }
    }
}
