//! Wire types shared across the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a paged-list endpoint.
///
/// Every field is optional on the wire; missing fields default to an empty
/// page. `records_filtered` describes the result set after search/filters,
/// `records_total` the unfiltered collection.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResult<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, rename = "recordsTotal")]
    pub records_total: u64,
    #[serde(default, rename = "recordsFiltered")]
    pub records_filtered: u64,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            records_total: 0,
            records_filtered: 0,
        }
    }
}

/// Direction of a transaction relative to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Self::In => "In",
            Self::Out => "Out",
        }
    }
}

/// A wallet transaction as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub wallet: String,
    pub counterparty: String,
    pub direction: Direction,
    pub amount: f64,
    pub status: String,
}

/// Profile of the signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}
