//! Reporting: top transactions, top users, and daily volume.
//!
//! The two "top" reports are plain GET endpoints returning flat JSON arrays.
//! Daily volume has no dedicated endpoint: it is aggregated client-side from
//! the paged transactions endpoint, fetched page by page up to a fixed cap.
//! All report fetches use the same generation-token cancellation as the
//! table controller, so changing the date range supersedes in-flight work.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use ustr::Ustr;

use crate::api::{ApiClient, ApiError, ApiRequest, ErrorMessages};
use crate::fetch_service::FetchService;
use crate::table::{SortDirection, TableQuery};
use crate::types::{PageResult, Transaction};

/// Window for the client-side volume aggregation: at most
/// `VOLUME_MAX_PAGES * VOLUME_PAGE_SIZE` rows are fetched per date range.
pub const VOLUME_PAGE_SIZE: usize = 100;
pub const VOLUME_MAX_PAGES: usize = 20;

/// Row of the top-transactions-per-user report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopTransactionRow {
    pub wallet: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Row of the top-users-by-outbound-value report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopUserRow {
    pub wallet: String,
    pub total_out: f64,
}

/// One calendar day of transaction volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBucket {
    pub date: NaiveDate,
    pub count: u64,
    pub amount: f64,
}

/// The finished volume aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReport {
    pub buckets: Vec<VolumeBucket>,
    /// Set when the page cap was reached with rows left on the server; the
    /// chart is undercounting and the UI says so.
    pub truncated: bool,
    pub rows_seen: usize,
}

/// Date-range query parameters for the reporting endpoints.
///
/// `date_to` is inclusive: the backend filters on timestamps strictly before
/// `dateTo`, so the start of the following day is sent.
pub fn date_range_params(date_from: NaiveDate, date_to: NaiveDate) -> Vec<(String, String)> {
    let exclusive_end = date_to.succ_opt().unwrap_or(date_to);
    vec![
        ("dateFrom".to_owned(), date_from.format("%Y-%m-%d").to_string()),
        ("dateTo".to_owned(), exclusive_end.format("%Y-%m-%d").to_string()),
    ]
}

/// Buckets transactions by calendar date, summing count and amount.
pub fn daily_volume(rows: &[Transaction]) -> Vec<VolumeBucket> {
    let mut buckets: BTreeMap<NaiveDate, (u64, f64)> = BTreeMap::new();
    for row in rows {
        let entry = buckets.entry(row.created_at.date_naive()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.amount;
    }
    buckets
        .into_iter()
        .map(|(date, (count, amount))| VolumeBucket {
            date,
            count,
            amount,
        })
        .collect()
}

/// Lifecycle of one report's data.
#[derive(Debug, Clone, Default)]
pub enum ReportResult<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> ReportResult<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

type ReportOutcome<T> = Result<Option<T>, ApiError>;

/// Loader for a flat (non-paged) report endpoint.
pub struct ReportLoader<T> {
    path: String,
    generation: u64,
    tx: flume::Sender<(u64, ReportOutcome<T>)>,
    rx: flume::Receiver<(u64, ReportOutcome<T>)>,
    result: ReportResult<T>,
    messages: ErrorMessages,
}

impl<T> ReportLoader<T>
where
    T: DeserializeOwned + Default + Send + 'static,
{
    pub fn new(path: impl Into<String>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            path: path.into(),
            generation: 0,
            tx,
            rx,
            result: ReportResult::Idle,
            messages: ErrorMessages::default(),
        }
    }

    pub fn result(&self) -> &ReportResult<T> {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.result.is_loading()
    }

    /// Issues a fetch for the given date range, superseding any in flight.
    pub fn fetch(
        &mut self,
        client: &ApiClient,
        fetcher: &dyn FetchService,
        token: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) {
        self.generation += 1;
        self.result = ReportResult::Loading;

        let request = ApiRequest::get(&self.path)
            .query(date_range_params(date_from, date_to))
            .token(Some(token));

        let generation = self.generation;
        let tx = self.tx.clone();
        client.send_json::<T>(
            fetcher,
            request,
            Box::new(move |outcome| {
                let _ = tx.send((generation, outcome));
            }),
        );
    }

    /// Applies completed fetches. Returns `true` when the result changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for (generation, outcome) in self.rx.try_iter() {
            if generation != self.generation {
                continue;
            }
            self.result = match outcome {
                Ok(value) => ReportResult::Loaded(value.unwrap_or_default()),
                Err(api_error) if api_error.is_unauthorized() => {
                    // The unauthorized observer owns the response to this.
                    ReportResult::Idle
                }
                Err(api_error) => {
                    error!("report {}: {api_error}", self.path);
                    ReportResult::Error(self.messages.describe(&api_error))
                }
            };
            changed = true;
        }
        changed
    }

    /// Drops any result and cancels acceptance of in-flight fetches.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.result = ReportResult::Idle;
    }
}

type VolumeOutcome = Result<Option<PageResult<Transaction>>, ApiError>;

/// Loader for the daily-volume aggregation.
///
/// Fetches the paged transactions endpoint sequentially (page 0, 1, …) until
/// a short page, the reported total, or the page cap, then buckets what it
/// has. The cap makes this a window, not a guarantee: `truncated` reports
/// when the server had more.
pub struct VolumeLoader {
    endpoint: String,
    generation: u64,
    draw: u64,
    next_page: usize,
    rows: Vec<Transaction>,
    range: Option<(NaiveDate, NaiveDate)>,
    tx: flume::Sender<(u64, VolumeOutcome)>,
    rx: flume::Receiver<(u64, VolumeOutcome)>,
    result: ReportResult<VolumeReport>,
    messages: ErrorMessages,
}

impl VolumeLoader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            endpoint: endpoint.into(),
            generation: 0,
            draw: 0,
            next_page: 0,
            rows: Vec::new(),
            range: None,
            tx,
            rx,
            result: ReportResult::Idle,
            messages: ErrorMessages::default(),
        }
    }

    pub fn result(&self) -> &ReportResult<VolumeReport> {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.result.is_loading()
    }

    /// Starts a fresh aggregation over the date range, superseding any in
    /// flight.
    pub fn start(
        &mut self,
        client: &ApiClient,
        fetcher: &dyn FetchService,
        token: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) {
        self.generation += 1;
        self.rows.clear();
        self.next_page = 0;
        self.range = Some((date_from, date_to));
        self.result = ReportResult::Loading;
        self.issue_page(client, fetcher, token);
    }

    /// Applies completed pages and chains the next fetch while more rows are
    /// wanted. Returns `true` when the visible result changed.
    pub fn poll(&mut self, client: &ApiClient, fetcher: &dyn FetchService, token: &str) -> bool {
        let mut changed = false;
        while let Ok((generation, outcome)) = self.rx.try_recv() {
            if generation != self.generation {
                continue;
            }
            match outcome {
                Ok(page) => {
                    let page = page.unwrap_or_default();
                    let page_len = page.data.len();
                    self.rows.extend(page.data);

                    let total = if page.records_filtered != 0 {
                        page.records_filtered
                    } else {
                        page.records_total
                    };
                    let fetched_pages = self.next_page + 1;
                    let more_on_server = (self.rows.len() as u64) < total;

                    if page_len == VOLUME_PAGE_SIZE
                        && more_on_server
                        && fetched_pages < VOLUME_MAX_PAGES
                    {
                        self.next_page += 1;
                        self.issue_page(client, fetcher, token);
                    } else {
                        self.result = ReportResult::Loaded(VolumeReport {
                            buckets: daily_volume(&self.rows),
                            truncated: more_on_server,
                            rows_seen: self.rows.len(),
                        });
                        changed = true;
                    }
                }
                Err(api_error) if api_error.is_unauthorized() => {
                    self.result = ReportResult::Idle;
                    changed = true;
                }
                Err(api_error) => {
                    error!("volume report: {api_error}");
                    self.result = ReportResult::Error(self.messages.describe(&api_error));
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.rows.clear();
        self.result = ReportResult::Idle;
    }

    fn issue_page(&mut self, client: &ApiClient, fetcher: &dyn FetchService, token: &str) {
        let Some((date_from, date_to)) = self.range else {
            return;
        };

        self.draw += 1;
        let exclusive_end = date_to.succ_opt().unwrap_or(date_to);
        let extra_filters = vec![
            (
                Ustr::from("date:from"),
                date_from.format("%Y-%m-%d").to_string(),
            ),
            (
                Ustr::from("date:to"),
                exclusive_end.format("%Y-%m-%d").to_string(),
            ),
        ];

        let query = TableQuery {
            page_index: self.next_page,
            page_size: VOLUME_PAGE_SIZE,
            search_term: "",
            sort_column: 1,
            sort_direction: SortDirection::Asc,
            extra_filters: &extra_filters,
        };

        let request = ApiRequest::get(&self.endpoint)
            .query(query.params(self.draw))
            .token(Some(token));

        let generation = self.generation;
        let tx = self.tx.clone();
        client.send_json::<PageResult<Transaction>>(
            fetcher,
            request,
            Box::new(move |outcome| {
                let _ = tx.send((generation, outcome));
            }),
        );
    }
}
