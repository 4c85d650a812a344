use crate::core::models::account::Account;
use crate::core::models::cost::{AccountCostEntry, CostRecord, CostTable, ServiceCostMap};

/// Fold grouped cost records into per-service totals. A service appearing in
/// several time buckets is summed, never overwritten.
pub fn sum_services(records: &[CostRecord]) -> ServiceCostMap {
    let mut services = ServiceCostMap::new();
    for record in records {
        *services.entry(record.service.clone()).or_insert(0.0) += record.amount;
    }
    services
}

/// Build one account's entry for one window from its grouped cost records.
pub fn account_entry(account: &Account, records: &[CostRecord]) -> AccountCostEntry {
    let services = sum_services(records);
    let total = services.values().sum();
    AccountCostEntry {
        account_id: account.id.clone(),
        account_name: account.name.clone(),
        total,
        services,
    }
}

/// Sort entries by total descending (stable for ties) and compute the
/// organization grand total. Each window builds its own table from its own
/// entries; nothing is shared between the monthly and daily collections.
pub fn build_table(mut entries: Vec<AccountCostEntry>) -> CostTable {
    entries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    let grand_total = entries.iter().map(|e| e.total).sum();
    CostTable {
        entries,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(service: &str, amount: f64) -> CostRecord {
        CostRecord {
            service: service.to_string(),
            amount,
        }
    }

    #[test]
    fn single_account_single_service() {
        let account = Account::new("111111111111", "Sandbox");
        let entry = account_entry(&account, &[record("AmazonEC2", 12.345)]);
        assert!((entry.total - 12.345).abs() < 0.01);
        assert_eq!(entry.services.len(), 1);

        let table = build_table(vec![entry]);
        assert!((table.grand_total - 12.345).abs() < 0.01);
    }

    #[test]
    fn repeated_service_key_is_summed() {
        let records = vec![record("AmazonS3", 3.00), record("AmazonS3", 4.50)];
        let services = sum_services(&records);
        assert_eq!(services.len(), 1);
        assert!((services["AmazonS3"] - 7.50).abs() < 1e-10);
    }

    #[test]
    fn entry_total_equals_service_sum() {
        let account = Account::new("222222222222", "Prod");
        let records = vec![
            record("AmazonEC2", 10.0),
            record("AmazonS3", 2.5),
            record("AmazonS3", 1.25),
            record("AWSLambda", 0.05),
        ];
        let entry = account_entry(&account, &records);
        let service_sum: f64 = entry.services.values().sum();
        assert!((entry.total - service_sum).abs() < 0.01);
        assert!((entry.total - 13.80).abs() < 0.01);
    }

    #[test]
    fn table_sorted_descending_with_grand_total() {
        let a = account_entry(&Account::new("aaaa", "A"), &[record("AmazonEC2", 50.00)]);
        let b = account_entry(&Account::new("bbbb", "B"), &[record("AmazonEC2", 120.00)]);
        let table = build_table(vec![a, b]);
        assert_eq!(table.entries[0].account_name, "B");
        assert_eq!(table.entries[1].account_name, "A");
        assert!((table.grand_total - 170.00).abs() < 0.01);
    }

    #[test]
    fn tie_keeps_insertion_order() {
        let first = account_entry(&Account::new("1", "First"), &[record("AmazonEC2", 5.0)]);
        let second = account_entry(&Account::new("2", "Second"), &[record("AmazonEC2", 5.0)]);
        let table = build_table(vec![first, second]);
        assert_eq!(table.entries[0].account_name, "First");
        assert_eq!(table.entries[1].account_name, "Second");
    }

    #[test]
    fn empty_organization_yields_zero_grand_total() {
        let table = build_table(Vec::new());
        assert!(table.entries.is_empty());
        assert!((table.grand_total - 0.0).abs() < 1e-10);
    }

    #[test]
    fn account_with_no_records_has_zero_total() {
        let entry = account_entry(&Account::new("3333", "Idle"), &[]);
        assert!(entry.services.is_empty());
        assert!((entry.total - 0.0).abs() < 1e-10);
    }

    #[test]
    fn windows_do_not_share_accumulator_state() {
        let account = Account::new("444444444444", "Shared");
        // Same service name in both windows; each window folds its own records.
        let monthly = account_entry(&account, &[record("AmazonEC2", 100.0)]);
        let daily = account_entry(&account, &[record("AmazonEC2", 3.0)]);

        let monthly_table = build_table(vec![monthly]);
        let daily_table = build_table(vec![daily]);

        assert!((monthly_table.grand_total - 100.0).abs() < 0.01);
        assert!((daily_table.grand_total - 3.0).abs() < 0.01);
    }

    #[test]
    fn grand_total_equals_entry_total_sum() {
        let entries: Vec<AccountCostEntry> = (0..5)
            .map(|i| {
                account_entry(
                    &Account::new(format!("{i}"), format!("acct-{i}")),
                    &[record("AmazonEC2", i as f64 * 1.11), record("AmazonS3", 0.4)],
                )
            })
            .collect();
        let table = build_table(entries);
        let entry_sum: f64 = table.entries.iter().map(|e| e.total).sum();
        assert!((table.grand_total - entry_sum).abs() < 0.01);
    }
}
