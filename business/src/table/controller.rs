//! Fetch orchestrator for a server-driven table.
//!
//! One controller owns all the query state of one table instance: page
//! window, sort, debounced search, column filters. Any state change marks the
//! controller dirty; `process` then issues a fresh fetch, and the fetch
//! callback posts its outcome into a flume channel tagged with the generation
//! it was issued under. Bumping the generation is the cancellation: a late
//! outcome from a superseded attempt no longer matches and is dropped without
//! touching state or the loading flag.
//!
//! The state machine is `idle → loading → (success | error)`, re-entering
//! `loading` on every dependency change. Rows keep their last successful
//! value across errors so the table stays visible while the banner shows.

use chrono::{DateTime, Utc};
use log::debug;
use serde::de::DeserializeOwned;
use ustr::Ustr;

use crate::api::{ApiClient, ApiError, ApiRequest, ErrorMessages};
use crate::fetch_service::FetchService;
use crate::types::PageResult;

use super::filters::{FilterDef, FilterSet};
use super::paging::{PageSummary, clamp_page};
use super::query::{SortDirection, TableQuery};
use super::search::DebouncedSearch;

struct FetchEnvelope<T> {
    generation: u64,
    result: Result<Option<PageResult<T>>, ApiError>,
}

pub struct TableController<T> {
    endpoint: String,

    page_index: usize,
    page_size: usize,
    sort_column: usize,
    sort_direction: SortDirection,
    search: DebouncedSearch,
    filters: FilterSet,

    /// Request counter for the `draw` parameter; strictly increasing.
    draw: u64,
    /// Cancellation token: only outcomes carrying the current value commit.
    generation: u64,

    tx: flume::Sender<FetchEnvelope<T>>,
    rx: flume::Receiver<FetchEnvelope<T>>,

    rows: Vec<T>,
    records_total: u64,
    records_filtered: u64,
    loading: bool,
    error: Option<String>,

    dirty: bool,
    messages: ErrorMessages,
}

impl<T> TableController<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(endpoint: impl Into<String>, filter_defs: Vec<FilterDef>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            endpoint: endpoint.into(),
            page_index: 0,
            page_size: 10,
            sort_column: 0,
            sort_direction: SortDirection::Asc,
            search: DebouncedSearch::new(),
            filters: FilterSet::new(filter_defs),
            draw: 0,
            generation: 0,
            tx,
            rx,
            rows: Vec::new(),
            records_total: 0,
            records_filtered: 0,
            loading: false,
            error: None,
            dirty: true,
            messages: ErrorMessages::default(),
        }
    }

    /// Initial sort, for tables that do not start on column 0 ascending.
    pub fn with_sort(mut self, column: usize, direction: SortDirection) -> Self {
        self.sort_column = column;
        self.sort_direction = direction;
        self
    }

    /// Per-table override of the error message table.
    pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = messages;
        self
    }

    // ---- read side ----

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort_column(&self) -> usize {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search(&self) -> &DebouncedSearch {
        &self.search
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary::compute(
            self.page_index,
            self.page_size,
            self.records_total,
            self.records_filtered,
        )
    }

    // ---- write side: every mutation marks the controller dirty ----

    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == self.page_size || page_size == 0 {
            return;
        }
        self.page_size = page_size;
        self.page_index = 0;
        self.dirty = true;
    }

    /// Navigates to a 1-based page, clamped into the valid range.
    pub fn go_to_page(&mut self, target: u64) {
        let clamped = clamp_page(target, self.summary().total_pages);
        let new_index = (clamped - 1) as usize;
        if new_index != self.page_index {
            self.page_index = new_index;
            self.dirty = true;
        }
    }

    /// Sorts by `column`: a repeated click flips the direction, a new column
    /// starts ascending. Either way the view returns to the first page.
    pub fn toggle_sort(&mut self, column: usize) {
        if column == self.sort_column {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Asc;
        }
        self.page_index = 0;
        self.dirty = true;
    }

    /// Feeds the search box; a committed change resets to the first page.
    pub fn set_search_input(&mut self, raw: &str, now: DateTime<Utc>) {
        if self.search.input(raw, now) {
            self.page_index = 0;
            self.dirty = true;
        }
    }

    pub fn clear_search(&mut self) {
        if self.search.reset() {
            self.page_index = 0;
            self.dirty = true;
        }
    }

    /// Sets a filter value by resolved key; a change resets to the first page.
    pub fn set_filter(&mut self, key: Ustr, value: impl Into<String>) {
        if self.filters.set(key, value) {
            self.page_index = 0;
            self.dirty = true;
        }
    }

    /// Clears filters, search, and paging as one user-facing action.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.search.reset();
        self.page_index = 0;
        self.dirty = true;
    }

    /// Requests a re-fetch with unchanged parameters.
    pub fn refresh(&mut self) {
        self.dirty = true;
    }

    // ---- the fetch lifecycle ----

    /// Drives the controller one step: fires due search deadlines, applies
    /// completed fetches, and issues a new fetch when dirty.
    ///
    /// Without a token nothing is fetched and the table reads as empty; the
    /// dirty marker survives, so the first `process` after sign-in fetches.
    pub fn process(
        &mut self,
        now: DateTime<Utc>,
        client: &ApiClient,
        fetcher: &dyn FetchService,
        token: Option<&str>,
    ) {
        if self.search.tick(now) {
            self.page_index = 0;
            self.dirty = true;
        }

        let Some(token) = token else {
            self.apply_outcomes();
            if !self.rows.is_empty() || self.loading {
                self.rows.clear();
                self.records_total = 0;
                self.records_filtered = 0;
                self.loading = false;
                self.error = None;
            }
            return;
        };

        if self.dirty {
            self.dirty = false;
            self.issue_fetch(client, fetcher, token);
        }

        self.apply_outcomes();
    }

    /// True while a commit deadline or an in-flight fetch means the caller
    /// should keep ticking without user input.
    pub fn wants_tick(&self) -> bool {
        self.loading || self.dirty || self.search.is_pending_commit()
    }

    fn apply_outcomes(&mut self) {
        for envelope in self.rx.try_iter() {
            if envelope.generation != self.generation {
                debug!(
                    "table {}: dropping superseded fetch (gen {} != {})",
                    self.endpoint, envelope.generation, self.generation
                );
                continue;
            }

            match envelope.result {
                Ok(page) => {
                    let page = page.unwrap_or_default();
                    self.rows = page.data;
                    self.records_total = page.records_total;
                    self.records_filtered = page.records_filtered;
                    self.loading = false;
                    self.error = None;
                }
                Err(error) => {
                    self.loading = false;
                    // The unauthorized observer owns the user-facing response
                    // to auth failures; no local banner for 401.
                    if !error.is_unauthorized() {
                        self.error = Some(self.messages.describe(&error));
                    }
                    // Rows keep their last successful value.
                }
            }
        }
    }

    fn issue_fetch(&mut self, client: &ApiClient, fetcher: &dyn FetchService, token: &str) {
        self.generation += 1;
        self.draw += 1;
        self.loading = true;
        self.error = None;

        let extra_filters = self.filters.extra_filters();
        let query = TableQuery {
            page_index: self.page_index,
            page_size: self.page_size,
            search_term: self.search.committed(),
            sort_column: self.sort_column,
            sort_direction: self.sort_direction,
            extra_filters: &extra_filters,
        };

        let request = ApiRequest::get(&self.endpoint)
            .query(query.params(self.draw))
            .token(Some(token));

        let tx = self.tx.clone();
        let generation = self.generation;
        client.send_json::<PageResult<T>>(
            fetcher,
            request,
            Box::new(move |result| {
                let _ = tx.send(FetchEnvelope { generation, result });
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch_service::{MockFetcher, json_response, status_response};
    use crate::types::Transaction;

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().expect("valid timestamp")
    }

    fn client() -> ApiClient {
        ApiClient::new("http://api.test/api")
    }

    fn controller() -> TableController<Transaction> {
        TableController::new(
            "/transactions",
            vec![
                FilterDef::text("wallet", "Wallet"),
                FilterDef::number_range("amount", "Amount"),
            ],
        )
    }

    fn page_body(ids: &[u64], total: u64, filtered: u64) -> String {
        let rows: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "created_at": "2026-02-01T00:00:00Z", "wallet": "w{id}",
                        "counterparty": "c", "direction": "out", "amount": 1.0, "status": "settled"}}"#
                )
            })
            .collect();
        format!(
            r#"{{"data": [{}], "recordsTotal": {total}, "recordsFiltered": {filtered}}}"#,
            rows.join(",")
        )
    }

    #[test]
    fn first_process_fetches_and_commits() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1, 2, 3], 57, 0)));

        table.process(now(), &client, &fetcher, Some("token"));

        assert_eq!(table.rows().len(), 3);
        assert!(!table.is_loading());
        assert!(table.error().is_none());
        assert_eq!(table.summary().total_for_display, 57);
        assert_eq!(table.summary().total_pages, 6);
    }

    #[test]
    fn no_token_means_no_fetch() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();

        table.process(now(), &client, &fetcher, None);

        assert!(fetcher.requests_seen().is_empty());
        assert!(table.rows().is_empty());
        assert!(!table.is_loading());
    }

    #[test]
    fn fetch_happens_once_token_arrives() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 1, 0)));

        table.process(now(), &client, &fetcher, None);
        assert!(fetcher.requests_seen().is_empty());

        table.process(now(), &client, &fetcher, Some("token"));
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn superseded_fetch_never_commits() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::deferred();

        // First fetch goes out...
        table.process(now(), &client, &fetcher, Some("token"));
        // ...then a dependency change supersedes it before it lands.
        table.set_filter(Ustr::from("wallet"), "alice");
        table.process(now(), &client, &fetcher, Some("token"));
        assert_eq!(fetcher.parked_count(), 2);

        // The second (current) request completes first.
        fetcher.complete(1, json_response(200, &page_body(&[2], 1, 1)));
        // The first (stale) response arrives late.
        fetcher.complete(0, json_response(200, &page_body(&[1], 99, 99)));

        table.process(now(), &client, &fetcher, Some("token"));

        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].id, 2);
        assert_eq!(table.summary().total_for_display, 1);
        assert!(!table.is_loading());
    }

    #[test]
    fn stale_error_is_also_dropped() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::deferred();

        table.process(now(), &client, &fetcher, Some("token"));
        table.refresh();
        table.process(now(), &client, &fetcher, Some("token"));

        fetcher.complete(1, json_response(200, &page_body(&[5], 1, 0)));
        fetcher.complete(0, status_response(500));

        table.process(now(), &client, &fetcher, Some("token"));

        assert!(table.error().is_none());
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn error_keeps_previous_rows_visible() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1, 2], 2, 0)));

        table.process(now(), &client, &fetcher, Some("token"));
        assert_eq!(table.rows().len(), 2);

        fetcher.push_response(status_response(500));
        table.refresh();
        table.process(now(), &client, &fetcher, Some("token"));
        table.process(now(), &client, &fetcher, Some("token"));

        assert_eq!(
            table.error(),
            Some(ErrorMessages::default().server_error.as_str())
        );
        assert_eq!(table.rows().len(), 2, "stale rows stay visible");
    }

    #[test]
    fn unauthorized_error_is_not_surfaced_locally() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(status_response(401));

        table.process(now(), &client, &fetcher, Some("token"));
        table.process(now(), &client, &fetcher, Some("token"));

        assert!(table.error().is_none());
        assert!(!table.is_loading());
    }

    #[test]
    fn sort_toggle_flips_direction_and_resets_page() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 57, 0)));
        table.process(now(), &client, &fetcher, Some("token"));

        table.go_to_page(5);
        table.set_filter(Ustr::from("wallet"), "alice");
        assert_eq!(table.page_index(), 0, "filter change returns to page 1");

        table.go_to_page(3);
        table.toggle_sort(0);
        assert_eq!(table.sort_direction(), SortDirection::Desc);
        assert_eq!(table.page_index(), 0);
        assert_eq!(
            table.filters().value(Ustr::from("wallet")),
            "alice",
            "sorting keeps filter values"
        );

        table.toggle_sort(2);
        assert_eq!(table.sort_column(), 2);
        assert_eq!(table.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn search_commit_resets_page_index() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 100, 0)));
        table.process(now(), &client, &fetcher, Some("token"));

        table.go_to_page(4);
        assert_eq!(table.page_index(), 3);

        table.set_search_input("latte", now());
        assert_eq!(table.page_index(), 0);
    }

    #[test]
    fn debounced_commit_fires_through_process() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 10, 0)));
        table.process(now(), &client, &fetcher, Some("token"));

        // Below min length: nothing commits yet.
        table.set_search_input("ab", now());
        table.process(now(), &client, &fetcher, Some("token"));
        assert_eq!(fetcher.requests_seen().len(), 1);

        // After the quiet period the term commits and a fetch goes out.
        fetcher.push_response(json_response(200, &page_body(&[2], 1, 1)));
        let later = now() + chrono::Duration::milliseconds(2600);
        table.process(later, &client, &fetcher, Some("token"));

        let urls = fetcher.requests_seen();
        assert_eq!(urls.len(), 2);
        assert!(
            urls[1].contains("search%5Bvalue%5D=ab"),
            "committed term reaches the wire: {}",
            urls[1]
        );
    }

    #[test]
    fn draw_token_increments_per_request() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 10, 0)));
        fetcher.push_response(json_response(200, &page_body(&[1], 10, 0)));

        table.process(now(), &client, &fetcher, Some("token"));
        table.refresh();
        table.process(now(), &client, &fetcher, Some("token"));

        let urls = fetcher.requests_seen();
        assert!(urls[0].contains("draw=1"));
        assert!(urls[1].contains("draw=2"));
    }

    #[test]
    fn reset_filters_clears_filters_search_and_page() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 100, 0)));
        table.process(now(), &client, &fetcher, Some("token"));

        table.set_filter(Ustr::from("wallet"), "alice");
        table.set_search_input("espresso", now());
        table.go_to_page(3);

        table.reset_filters();

        assert!(table.filters().extra_filters().is_empty());
        assert_eq!(table.search().committed(), "");
        assert_eq!(table.page_index(), 0);
    }

    #[test]
    fn page_size_change_resets_page_index() {
        let mut table = controller();
        let client = client();
        let fetcher = MockFetcher::new();
        fetcher.push_response(json_response(200, &page_body(&[1], 100, 0)));
        table.process(now(), &client, &fetcher, Some("token"));

        table.go_to_page(4);
        table.set_page_size(25);
        assert_eq!(table.page_index(), 0);
        assert_eq!(table.page_size(), 25);
    }
}
