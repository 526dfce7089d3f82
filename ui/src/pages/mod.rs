//! Top-level pages of the dashboard.

pub mod login_page;
pub mod reports_page;
pub mod transactions_page;

pub use login_page::login_page;
pub use reports_page::reports_page;
pub use transactions_page::transactions_page;
