use chrono::{Duration, Months, NaiveDate};

use crate::core::models::cost::{DateRange, Granularity};

/// The two reporting windows of a run. Computed once, reused for every
/// account so all billing queries in one run see identical date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    pub monthly: DateRange,
    pub daily: DateRange,
}

impl ReportWindows {
    /// Compute both windows relative to `today`.
    ///
    /// Monthly: one calendar month back (clamped at short month ends) up to
    /// but excluding yesterday's date as the range end. Daily: yesterday up
    /// to but excluding today.
    pub fn compute(today: NaiveDate) -> Self {
        let yesterday = today - Duration::days(1);
        let month_ago = today
            .checked_sub_months(Months::new(1))
            .unwrap_or(yesterday);

        Self {
            monthly: DateRange {
                start: month_ago,
                end: yesterday,
                granularity: Granularity::Monthly,
            },
            daily: DateRange {
                start: yesterday,
                end: today,
                granularity: Granularity::Daily,
            },
        }
    }
}

/// Format a date the way the billing API expects it.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
