use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One grouped cost line item from the billing API: a service name and the
/// unblended cost attributed to it within one time bucket.
///
/// The same service can appear in several buckets of one response; the
/// aggregator sums them, it never overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub service: String,
    pub amount: f64,
}

/// Per-service accumulated cost for one account within one reporting window.
pub type ServiceCostMap = HashMap<String, f64>;

/// Aggregated spend for one account within one reporting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCostEntry {
    pub account_id: String,
    pub account_name: String,
    /// Always equal to the sum of `services` values (within display rounding).
    pub total: f64,
    pub services: ServiceCostMap,
}

/// One reporting window's table: entries sorted by total descending plus the
/// organization grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTable {
    pub entries: Vec<AccountCostEntry>,
    pub grand_total: f64,
}

/// Time-bucketing resolution of a billing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Monthly,
    Daily,
}

/// A contiguous date range for one billing query: start inclusive, end
/// exclusive, billing-API style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}
