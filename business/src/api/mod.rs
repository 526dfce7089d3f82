//! Authenticated JSON API client.
//!
//! Sits on top of [`FetchService`](crate::fetch_service::FetchService) and
//! normalizes every call into `Result<Option<T>, ApiError>`:
//! - non-2xx responses become [`ApiError::Status`] with the raw body text
//!   preserved best-effort,
//! - 204 and unparseable 2xx bodies become `Ok(None)` rather than errors,
//! - transport failures become [`ApiError::Network`].
//!
//! A 401 on an authenticated request additionally notifies the registered
//! unauthorized observer before the error is surfaced, so the application can
//! react to session expiry from a single place.

mod error;

pub use error::{ApiError, ErrorMessages};

use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;

use crate::fetch_service::FetchService;

/// HTTP method for requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Observer for authentication failures detected by the transport layer.
///
/// Registered on the [`ApiClient`]; the transport never depends on
/// application-level session or navigation logic.
pub trait UnauthorizedObserver: Send + Sync {
    fn on_unauthorized(&self);
}

/// A request to a single API endpoint, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub token: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token: None,
            headers: Vec::new(),
        }
    }

    /// Adds an extra request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends query parameters; order is preserved on the wire.
    pub fn query(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Sets a JSON body.
    pub fn json<B: serde::Serialize>(mut self, value: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    /// Attaches a bearer token. `None` leaves the request anonymous.
    pub fn token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_owned);
        self
    }
}

/// JSON API client bound to one base URL.
///
/// The unauthorized observer is a deliberate single slot: registering a new
/// observer replaces the previous one (last registration wins). The
/// application registers exactly one at start-up, before the client is
/// shared.
pub struct ApiClient {
    base_url: String,
    unauthorized: Option<Arc<dyn UnauthorizedObserver>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("unauthorized", &self.unauthorized.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            unauthorized: None,
        }
    }

    /// Registers the unauthorized observer, replacing any prior registration.
    pub fn set_unauthorized_observer(&mut self, observer: Arc<dyn UnauthorizedObserver>) {
        self.unauthorized = Some(observer);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        let mut url = format!("{}{}", self.base_url, request.path);
        if !request.query.is_empty() {
            url.push('?');
            url.push_str(&crate::table::encode_params(&request.query));
        }
        url
    }

    /// Issues `request` and decodes the response as JSON.
    ///
    /// `on_done` always runs exactly once, on the transport's callback
    /// thread; callers hand the result to their UI thread themselves
    /// (typically via a flume channel).
    pub fn send_json<T>(
        &self,
        fetcher: &dyn FetchService,
        request: ApiRequest,
        on_done: Box<dyn FnOnce(Result<Option<T>, ApiError>) + Send + 'static>,
    ) where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url_for(&request);
        let token_supplied = request.token.is_some();

        let mut wire = ehttp::Request::post(&url, request.body.unwrap_or_default());
        wire.method = request.method.as_str().to_owned();
        wire.headers.insert("Accept", "application/json");
        if request.method == Method::Post || request.method == Method::Put {
            wire.headers.insert("Content-Type", "application/json");
        }
        for (name, value) in request.headers {
            wire.headers.insert(name, value);
        }
        if let Some(token) = request.token {
            wire.headers.insert("Authorization", bearer_value(&token));
        }

        let observer = self.unauthorized.clone();
        fetcher.fetch(
            wire,
            Box::new(move |result| {
                let outcome = match result {
                    Err(transport_error) => Err(ApiError::Network(transport_error)),
                    Ok(response) => decode_response::<T>(&response, token_supplied, observer),
                };
                on_done(outcome);
            }),
        );
    }
}

/// Formats the `Authorization` header value, tolerating tokens that already
/// carry the `Bearer ` prefix.
fn bearer_value(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.starts_with("Bearer ") {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

fn decode_response<T: DeserializeOwned>(
    response: &ehttp::Response,
    token_supplied: bool,
    observer: Option<Arc<dyn UnauthorizedObserver>>,
) -> Result<Option<T>, ApiError> {
    if response.status == 204 {
        return Ok(None);
    }

    if (200..300).contains(&response.status) {
        return match serde_json::from_slice::<T>(&response.bytes) {
            Ok(value) => Ok(Some(value)),
            Err(parse_error) => {
                // A 2xx with an undecodable body counts as "no value", not a
                // failure; the endpoint contract allows empty bodies.
                warn!(
                    "api: discarding unparseable 2xx body from {}: {parse_error}",
                    response.url
                );
                Ok(None)
            }
        };
    }

    if response.status == 401 && token_supplied {
        if let Some(observer) = observer {
            observer.on_unauthorized();
        }
    }

    Err(ApiError::Status {
        status: response.status,
        status_text: response.status_text.clone(),
        body_text: String::from_utf8(response.bytes.clone()).ok(),
    })
}
