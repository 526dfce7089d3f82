pub mod api;
pub mod auth;
pub mod config;
pub mod fetch_service;
pub mod reports;
pub mod session;
pub mod table;
pub mod types;

pub use api::{ApiClient, ApiError, ApiRequest, ErrorMessages, Method, UnauthorizedObserver};
pub use auth::{AuthStatus, LoginFlow, LoginRequest, LoginResponse};
pub use config::BusinessConfig;
pub use fetch_service::{EhttpFetcher, FetchService};
pub use table::{
    DebouncedSearch, FilterDef, FilterKeys, FilterKind, FilterSet, PageItem, PageSummary,
    SelectOption, SortDirection, TableController, TableQuery, page_items,
};
pub use types::{Direction, PageResult, Transaction, UserProfile};
