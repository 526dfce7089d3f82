//! Reusable widgets for the dashboard.

pub mod charts;
pub mod data_table;
pub mod pagination;
pub mod version;

pub use data_table::{ColumnSpec, ColumnWidth, data_table};
pub use pagination::pagination_controls;
pub use version::version_label;
