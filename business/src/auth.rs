//! Authentication state and the login flow.
//!
//! The flow mirrors the table controller's fetch discipline at a smaller
//! scale: the login request is issued through the `FetchService` seam, its
//! outcome travels over a flume channel, and `poll` applies it on the UI
//! thread. Only one attempt can be in flight; a completed attempt is ignored
//! if the user has logged out in the meantime.

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError, ApiRequest, ErrorMessages};
use crate::fetch_service::FetchService;
use crate::types::UserProfile;

/// Request payload for `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Error body the backend attaches to rejected logins.
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Current authentication state.
#[derive(Debug, Clone, Default)]
pub enum AuthStatus {
    #[default]
    NotAuthenticated,
    Authenticating,
    Authenticated {
        profile: UserProfile,
        token: String,
    },
    Failed(String),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Extracts the server's error message from a response body, falling back to
/// the given default.
fn extract_error_message(body_text: Option<&str>, default: &str) -> String {
    body_text
        .and_then(|text| serde_json::from_str::<ErrorBody>(text).ok())
        .and_then(|body| body.message)
        .unwrap_or_else(|| default.to_owned())
}

type LoginOutcome = Result<Option<LoginResponse>, ApiError>;

/// Owns the authentication state machine of the application.
pub struct LoginFlow {
    status: AuthStatus,
    attempt: u64,
    tx: flume::Sender<(u64, LoginOutcome)>,
    rx: flume::Receiver<(u64, LoginOutcome)>,
    messages: ErrorMessages,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            status: AuthStatus::NotAuthenticated,
            attempt: 0,
            tx,
            rx,
            messages: ErrorMessages::default(),
        }
    }

    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.status.token()
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticating)
    }

    /// Starts a login attempt. No-op while one is already in flight.
    pub fn begin(
        &mut self,
        client: &ApiClient,
        fetcher: &dyn FetchService,
        email: &str,
        password: &str,
    ) {
        if self.is_authenticating() {
            return;
        }

        let email = email.trim().to_owned();
        if email.is_empty() {
            self.status = AuthStatus::Failed("Email is required".to_owned());
            return;
        }
        if password.is_empty() {
            self.status = AuthStatus::Failed("Password is required".to_owned());
            return;
        }

        let request = match ApiRequest::post("/auth/login").json(&LoginRequest {
            email: email.clone(),
            password: password.to_owned(),
        }) {
            Ok(request) => request,
            Err(serialize_error) => {
                error!("login: failed to serialize request: {serialize_error}");
                self.status = AuthStatus::Failed("Internal error".to_owned());
                return;
            }
        };

        info!("login: attempting sign-in for {email}");
        self.status = AuthStatus::Authenticating;
        self.attempt += 1;

        let attempt = self.attempt;
        let tx = self.tx.clone();
        client.send_json::<LoginResponse>(
            fetcher,
            request,
            Box::new(move |outcome| {
                let _ = tx.send((attempt, outcome));
            }),
        );
    }

    /// Applies a completed attempt, if any. Returns `true` when the status
    /// changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for (attempt, outcome) in self.rx.try_iter() {
            if attempt != self.attempt || !matches!(self.status, AuthStatus::Authenticating) {
                // Logged out (or superseded) while the request was in flight.
                continue;
            }

            self.status = match outcome {
                Ok(Some(response)) => {
                    info!("login: signed in as {}", response.user.email);
                    AuthStatus::Authenticated {
                        profile: response.user,
                        token: response.token,
                    }
                }
                Ok(None) => {
                    error!("login: server returned an empty or unreadable response");
                    AuthStatus::Failed(self.messages.fallback.clone())
                }
                Err(ApiError::Status {
                    status: 400 | 401,
                    ref body_text,
                    ..
                }) => {
                    let message = extract_error_message(
                        body_text.as_deref(),
                        "Invalid email or password",
                    );
                    info!("login: rejected: {message}");
                    AuthStatus::Failed(message)
                }
                Err(ref api_error) => {
                    error!("login: failed: {api_error}");
                    AuthStatus::Failed(self.messages.describe(api_error))
                }
            };
            changed = true;
        }
        changed
    }

    /// Restores an authenticated session (from storage) without a round trip.
    pub fn restore(&mut self, profile: UserProfile, token: String) {
        self.status = AuthStatus::Authenticated { profile, token };
    }

    pub fn logout(&mut self) {
        info!("login: signed out");
        self.status = AuthStatus::NotAuthenticated;
    }

    /// Forces the session-expired state; shown on the login page.
    pub fn expire(&mut self) {
        info!("login: session expired");
        self.status = AuthStatus::Failed(self.messages.session_expired.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch_service::{MockFetcher, json_response, status_response};

    fn client() -> ApiClient {
        ApiClient::new("http://api.test/api")
    }

    fn success_body() -> &'static str {
        r#"{
            "token": "jwt-token",
            "user": {"id": 1, "name": "Ada", "email": "ada@example.com", "role": "admin"}
        }"#
    }

    #[test]
    fn successful_login_authenticates() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, success_body()));

        flow.begin(&client(), &fetcher, "ada@example.com", "hunter2");
        assert!(flow.poll());

        assert!(flow.status().is_authenticated());
        assert_eq!(flow.token(), Some("jwt-token"));
        assert_eq!(flow.status().profile().map(|p| p.name.as_str()), Some("Ada"));
    }

    #[test]
    fn empty_credentials_fail_without_a_request() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::new();

        flow.begin(&client(), &fetcher, "  ", "pw");
        assert_eq!(flow.status().error(), Some("Email is required"));

        flow.begin(&client(), &fetcher, "ada@example.com", "");
        assert_eq!(flow.status().error(), Some("Password is required"));

        assert!(fetcher.requests_seen().is_empty());
    }

    #[test]
    fn rejected_login_surfaces_server_message() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(401, r#"{"message": "Account locked"}"#));

        flow.begin(&client(), &fetcher, "ada@example.com", "wrong");
        flow.poll();

        assert_eq!(flow.status().error(), Some("Account locked"));
    }

    #[test]
    fn rejected_login_without_body_uses_default_message() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::new();
        fetcher.push_response(status_response(401));

        flow.begin(&client(), &fetcher, "ada@example.com", "wrong");
        flow.poll();

        assert_eq!(flow.status().error(), Some("Invalid email or password"));
    }

    #[test]
    fn server_error_maps_through_the_message_table() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::new();
        fetcher.push_response(status_response(503));

        flow.begin(&client(), &fetcher, "ada@example.com", "pw");
        flow.poll();

        assert_eq!(
            flow.status().error(),
            Some(ErrorMessages::default().server_error.as_str())
        );
    }

    #[test]
    fn logout_discards_an_in_flight_attempt() {
        let mut flow = LoginFlow::new();
        let fetcher = MockFetcher::deferred();

        flow.begin(&client(), &fetcher, "ada@example.com", "pw");
        flow.logout();

        fetcher.complete(0, json_response(200, success_body()));
        assert!(!flow.poll());
        assert!(!flow.status().is_authenticated());
    }

    #[test]
    fn restore_and_expire_round_trip() {
        let mut flow = LoginFlow::new();
        let profile: UserProfile = serde_json::from_str(
            r#"{"id": 1, "name": "Ada", "email": "ada@example.com", "role": "admin"}"#,
        )
        .expect("valid profile");

        flow.restore(profile, "token".to_owned());
        assert!(flow.status().is_authenticated());

        flow.expire();
        assert_eq!(
            flow.status().error(),
            Some(ErrorMessages::default().session_expired.as_str())
        );
    }
}
