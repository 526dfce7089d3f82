//! Transport seam for HTTP requests.
//!
//! All network IO goes through the [`FetchService`] trait so that everything
//! above it (the API client, the table controller, the report loaders) can be
//! driven in tests without a server. `EhttpFetcher` is the production
//! implementation; `MockFetcher` (behind the `test-utils` feature) serves
//! canned responses and can hold callbacks back to simulate slow or
//! out-of-order delivery.

use std::fmt::Debug;

use ehttp::{Request, Response, Result};

pub trait FetchService: Send + Sync + Debug {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>);
}

#[derive(Debug, Default)]
pub struct EhttpFetcher;

impl FetchService for EhttpFetcher {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>) {
        ehttp::fetch(request, on_done)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockFetcher, json_response, status_response};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use ehttp::{Headers, Request, Response, Result};

    use super::FetchService;

    type Callback = Box<dyn FnOnce(Result<Response>) + Send + 'static>;

    /// A `FetchService` that answers from a queue of canned responses.
    ///
    /// In immediate mode the queue is drained synchronously, one response per
    /// request. In deferred mode (`MockFetcher::deferred()`) callbacks are
    /// parked instead, and tests complete them explicitly via
    /// [`MockFetcher::complete`] in whatever order the scenario needs.
    pub struct MockFetcher {
        responses: Mutex<VecDeque<Result<Response>>>,
        parked: Mutex<Vec<(Request, Callback)>>,
        requests_seen: Mutex<Vec<String>>,
        defer: bool,
    }

    impl std::fmt::Debug for MockFetcher {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockFetcher")
                .field("defer", &self.defer)
                .field("queued", &self.responses.lock().unwrap().len())
                .field("parked", &self.parked.lock().unwrap().len())
                .finish()
        }
    }

    impl Default for MockFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                parked: Mutex::new(Vec::new()),
                requests_seen: Mutex::new(Vec::new()),
                defer: false,
            }
        }

        pub fn deferred() -> Self {
            Self {
                defer: true,
                ..Self::new()
            }
        }

        pub fn push_response(&self, response: Result<Response>) {
            self.responses.lock().unwrap().push_back(response);
        }

        /// URLs of every request issued through this fetcher, in order.
        pub fn requests_seen(&self) -> Vec<String> {
            self.requests_seen.lock().unwrap().clone()
        }

        pub fn parked_count(&self) -> usize {
            self.parked.lock().unwrap().len()
        }

        /// Completes the parked request at `index` with `result`.
        ///
        /// Panics if no request is parked at that index; deferred tests are
        /// expected to know exactly what they issued.
        pub fn complete(&self, index: usize, result: Result<Response>) {
            let (_, on_done) = self.parked.lock().unwrap().remove(index);
            on_done(result);
        }
    }

    impl FetchService for MockFetcher {
        fn fetch(&self, request: Request, on_done: Callback) {
            self.requests_seen.lock().unwrap().push(request.url.clone());
            if self.defer {
                self.parked.lock().unwrap().push((request, on_done));
                return;
            }
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("MockFetcher: no response queued".to_owned()));
            on_done(response);
        }
    }

    /// A canned JSON response for tests.
    pub fn json_response(status: u16, body: &str) -> Result<Response> {
        Ok(Response {
            url: "http://mock.test".to_owned(),
            ok: (200..300).contains(&status),
            status,
            status_text: status_label(status).to_owned(),
            headers: Headers::new(&[("content-type", "application/json")]),
            bytes: body.as_bytes().to_vec(),
        })
    }

    /// A canned bodyless response for tests.
    pub fn status_response(status: u16) -> Result<Response> {
        Ok(Response {
            url: "http://mock.test".to_owned(),
            ok: (200..300).contains(&status),
            status,
            status_text: status_label(status).to_owned(),
            headers: Headers::new(&[]),
            bytes: Vec::new(),
        })
    }

    fn status_label(status: u16) -> &'static str {
        match status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "",
        }
    }
}
