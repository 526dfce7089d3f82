//! The main application state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};
use walletboard_business::reports::{ReportLoader, TopTransactionRow, TopUserRow, VolumeLoader};
use walletboard_business::{
    ApiClient, BusinessConfig, EhttpFetcher, FetchService, FilterDef, LoginFlow, SelectOption,
    SortDirection, TableController, Transaction, UnauthorizedObserver,
};

/// Top-level navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Transactions,
    Reports,
}

/// Shared flag the transport layer raises when the backend answers 401.
///
/// Registered as the process's single unauthorized observer; the app drains
/// it once per frame, so one occurrence produces one session-expired notice.
#[derive(Debug, Default)]
pub struct SessionExpiredFlag(AtomicBool);

impl SessionExpiredFlag {
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

impl UnauthorizedObserver for SessionExpiredFlag {
    fn on_unauthorized(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// State of the reports page: date range inputs plus one loader per chart.
pub struct ReportsState {
    pub date_from_input: String,
    pub date_to_input: String,
    pub top_transactions: ReportLoader<Vec<TopTransactionRow>>,
    pub top_users: ReportLoader<Vec<TopUserRow>>,
    pub volume: VolumeLoader,
    /// Parse error of the date inputs, shown instead of fetching.
    pub range_error: Option<String>,
}

impl ReportsState {
    fn new() -> Self {
        let today = Utc::now().date_naive();
        let month_ago = today - Duration::days(30);
        Self {
            date_from_input: month_ago.format("%Y-%m-%d").to_string(),
            date_to_input: today.format("%Y-%m-%d").to_string(),
            top_transactions: ReportLoader::new("/reports/top-transactions"),
            top_users: ReportLoader::new("/reports/top-users"),
            volume: VolumeLoader::new("/transactions"),
            range_error: None,
        }
    }

    pub fn clear(&mut self) {
        self.top_transactions.clear();
        self.top_users.clear();
        self.volume.clear();
    }
}

pub struct AppState {
    pub client: ApiClient,
    pub fetcher: Arc<dyn FetchService>,
    pub session_expired: Arc<SessionExpiredFlag>,
    pub login: LoginFlow,
    pub active_page: Page,

    pub email_input: String,
    pub password_input: String,

    pub transactions: TableController<Transaction>,
    pub reports: ReportsState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(BusinessConfig::default(), Arc::new(EhttpFetcher))
    }
}

impl AppState {
    pub fn new(config: BusinessConfig, fetcher: Arc<dyn FetchService>) -> Self {
        let session_expired = Arc::new(SessionExpiredFlag::default());
        let mut client = ApiClient::new(config.api_url().as_str());
        client.set_unauthorized_observer(session_expired.clone());

        Self {
            client,
            fetcher,
            session_expired,
            login: LoginFlow::new(),
            active_page: Page::default(),
            email_input: String::new(),
            password_input: String::new(),
            transactions: transactions_table(),
            reports: ReportsState::new(),
        }
    }
}

/// The transactions table: endpoint, initial sort, and one filter per kind.
fn transactions_table() -> TableController<Transaction> {
    TableController::new(
        "/transactions",
        vec![
            FilterDef::text("wallet", "Wallet"),
            FilterDef::select(
                "direction",
                "Direction",
                vec![
                    SelectOption::new("", "All"),
                    SelectOption::new("in", "In"),
                    SelectOption::new("out", "Out"),
                ],
            ),
            FilterDef::number_range("amount", "Amount"),
            FilterDef::date_range("created_at", "Date").with_query_key("date"),
            FilterDef::select(
                "status",
                "Status",
                vec![
                    SelectOption::new("", "All"),
                    SelectOption::new("settled", "Settled"),
                    SelectOption::new("pending", "Pending"),
                    SelectOption::new("failed", "Failed"),
                ],
            ),
        ],
    )
    .with_sort(1, SortDirection::Desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_flag_drains_once() {
        let flag = SessionExpiredFlag::default();
        assert!(!flag.take(), "flag starts lowered");

        flag.on_unauthorized();
        assert!(flag.take(), "one 401 raises the flag once");
        assert!(!flag.take(), "taking the flag lowers it");
    }

    #[test]
    fn transactions_table_starts_date_descending() {
        let table = transactions_table();
        assert_eq!(table.sort_column(), 1);
        assert_eq!(table.sort_direction(), SortDirection::Desc);
        assert_eq!(table.filters().defs().len(), 5);
    }
}
