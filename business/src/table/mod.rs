//! The server-driven data-table stack.
//!
//! Split into focused pieces, leaves first:
//! - `paging`: pure display/pagination math
//! - `search`: debounced search commitment
//! - `query`: the paged-list query-string convention
//! - `filters`: per-column filter state
//! - `controller`: the fetch orchestrator tying them together

mod controller;
mod filters;
mod paging;
mod query;
mod search;

pub use controller::TableController;
pub use filters::{FilterDef, FilterKind, FilterKeys, FilterSet, SelectOption};
pub use paging::{PageItem, PageSummary, clamp_page, page_items};
pub use query::{SortDirection, TableQuery, encode_params};
pub use search::DebouncedSearch;
