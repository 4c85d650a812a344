use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clients::{api_token, http_client, validate_endpoint};
use crate::core::models::cost::{CostRecord, DateRange, Granularity};
use crate::core::report::window::iso_date;

const GET_COST_AND_USAGE_TARGET: &str = "AWSInsightsIndexService.GetCostAndUsage";
const COST_METRIC: &str = "UnblendedCost";
const ACCOUNT_DIMENSION: &str = "LINKED_ACCOUNT";
const SERVICE_DIMENSION: &str = "SERVICE";

// ── Request wire shapes ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TimePeriod {
    start: String,
    end: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GroupDefinition {
    #[serde(rename = "Type")]
    group_type: &'static str,
    key: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DimensionFilter {
    key: &'static str,
    values: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Filter {
    dimensions: DimensionFilter,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CostAndUsageRequest {
    time_period: TimePeriod,
    granularity: Granularity,
    metrics: Vec<&'static str>,
    group_by: Vec<GroupDefinition>,
    filter: Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<String>,
}

// ── Response wire shapes ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricValue {
    amount: String,
}

#[derive(Deserialize)]
struct Group {
    #[serde(rename = "Keys")]
    keys: Vec<String>,
    #[serde(rename = "Metrics")]
    metrics: std::collections::HashMap<String, MetricValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultByTime {
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CostAndUsageResponse {
    #[serde(default)]
    results_by_time: Vec<ResultByTime>,
    next_page_token: Option<String>,
}

/// Pull the per-service cost records out of one response page. Group keys are
/// [linked account, service]; the service name is the second key.
fn flatten_groups(response: CostAndUsageResponse) -> Result<(Vec<CostRecord>, Option<String>)> {
    let mut records = Vec::new();
    for result in response.results_by_time {
        for group in result.groups {
            let service = group
                .keys
                .get(1)
                .context("Billing API group is missing the service key")?
                .clone();
            let metric = group
                .metrics
                .get(COST_METRIC)
                .with_context(|| format!("Billing API group is missing the {} metric", COST_METRIC))?;
            let amount: f64 = metric
                .amount
                .parse()
                .with_context(|| format!("Invalid cost amount: {:?}", metric.amount))?;
            records.push(CostRecord { service, amount });
        }
    }
    Ok((records, response.next_page_token))
}

/// Client for the billing/usage API.
#[derive(Debug)]
pub struct BillingClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl BillingClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        validate_endpoint(endpoint, "Billing")?;
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            token: api_token()?,
        })
    }

    /// Fetch grouped cost records for one account over one reporting window.
    ///
    /// The query groups by linked account and service, selects the unblended
    /// cost metric, and filters to exactly this account; the pipeline issues
    /// one call per account per window. Result pages are concatenated. Any
    /// failure aborts the run.
    pub async fn fetch_window(&self, account_id: &str, range: &DateRange) -> Result<Vec<CostRecord>> {
        let mut records: Vec<CostRecord> = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let request = CostAndUsageRequest {
                time_period: TimePeriod {
                    start: iso_date(range.start),
                    end: iso_date(range.end),
                },
                granularity: range.granularity,
                metrics: vec![COST_METRIC],
                group_by: vec![
                    GroupDefinition {
                        group_type: "DIMENSION",
                        key: ACCOUNT_DIMENSION,
                    },
                    GroupDefinition {
                        group_type: "DIMENSION",
                        key: SERVICE_DIMENSION,
                    },
                ],
                filter: Filter {
                    dimensions: DimensionFilter {
                        key: ACCOUNT_DIMENSION,
                        values: vec![account_id.to_string()],
                    },
                },
                next_page_token: next_page_token.clone(),
            };

            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("X-Amz-Target", GET_COST_AND_USAGE_TARGET)
                .json(&request)
                .send()
                .await
                .with_context(|| format!("Failed to query billing API for account {}", account_id))?;

            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                anyhow::bail!("Billing API: unauthorized - check your API token");
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!(
                    "HTTP {} from billing API for account {}: {}",
                    status.as_u16(),
                    account_id,
                    body
                );
            }

            let page: CostAndUsageResponse = response
                .json()
                .await
                .context("Failed to parse billing API response")?;

            let (page_records, token) = flatten_groups(page)?;
            records.extend(page_records);

            match token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(
            account_id,
            granularity = ?range.granularity,
            records = records.len(),
            "Fetched cost records"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 8, 14).unwrap(),
            granularity: Granularity::Monthly,
        }
    }

    #[test]
    fn serialize_request_shape() {
        let request = CostAndUsageRequest {
            time_period: TimePeriod {
                start: iso_date(sample_range().start),
                end: iso_date(sample_range().end),
            },
            granularity: Granularity::Monthly,
            metrics: vec![COST_METRIC],
            group_by: vec![
                GroupDefinition {
                    group_type: "DIMENSION",
                    key: ACCOUNT_DIMENSION,
                },
                GroupDefinition {
                    group_type: "DIMENSION",
                    key: SERVICE_DIMENSION,
                },
            ],
            filter: Filter {
                dimensions: DimensionFilter {
                    key: ACCOUNT_DIMENSION,
                    values: vec!["111111111111".to_string()],
                },
            },
            next_page_token: None,
        };

        let body: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(body["TimePeriod"]["Start"], "2026-07-15");
        assert_eq!(body["TimePeriod"]["End"], "2026-08-14");
        assert_eq!(body["Granularity"], "MONTHLY");
        assert_eq!(body["Metrics"][0], "UnblendedCost");
        assert_eq!(body["GroupBy"][0]["Type"], "DIMENSION");
        assert_eq!(body["GroupBy"][0]["Key"], "LINKED_ACCOUNT");
        assert_eq!(body["GroupBy"][1]["Key"], "SERVICE");
        assert_eq!(body["Filter"]["Dimensions"]["Key"], "LINKED_ACCOUNT");
        assert_eq!(body["Filter"]["Dimensions"]["Values"][0], "111111111111");
        assert!(body.get("NextPageToken").is_none());
    }

    #[test]
    fn deserialize_and_flatten_grouped_response() {
        let json = r#"{
            "ResultsByTime": [
                {
                    "Groups": [
                        {
                            "Keys": ["111111111111", "AmazonEC2"],
                            "Metrics": {"UnblendedCost": {"Amount": "12.345", "Unit": "USD"}}
                        },
                        {
                            "Keys": ["111111111111", "AmazonS3"],
                            "Metrics": {"UnblendedCost": {"Amount": "3.00", "Unit": "USD"}}
                        }
                    ]
                },
                {
                    "Groups": [
                        {
                            "Keys": ["111111111111", "AmazonS3"],
                            "Metrics": {"UnblendedCost": {"Amount": "4.50", "Unit": "USD"}}
                        }
                    ]
                }
            ]
        }"#;
        let response: CostAndUsageResponse = serde_json::from_str(json).unwrap();
        let (records, token) = flatten_groups(response).unwrap();

        assert!(token.is_none());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].service, "AmazonEC2");
        assert!((records[0].amount - 12.345).abs() < 1e-10);
        // AmazonS3 appears in two time buckets; both records survive for the
        // aggregator to sum.
        assert_eq!(records[1].service, "AmazonS3");
        assert_eq!(records[2].service, "AmazonS3");
        assert!((records[1].amount + records[2].amount - 7.50).abs() < 1e-10);
    }

    #[test]
    fn deserialize_empty_response() {
        let response: CostAndUsageResponse = serde_json::from_str("{}").unwrap();
        let (records, token) = flatten_groups(response).unwrap();
        assert!(records.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn flatten_propagates_page_token() {
        let json = r#"{"ResultsByTime": [], "NextPageToken": "page-2"}"#;
        let response: CostAndUsageResponse = serde_json::from_str(json).unwrap();
        let (_, token) = flatten_groups(response).unwrap();
        assert_eq!(token.as_deref(), Some("page-2"));
    }

    #[test]
    fn flatten_rejects_unparseable_amount() {
        let json = r#"{
            "ResultsByTime": [{
                "Groups": [{
                    "Keys": ["111111111111", "AmazonEC2"],
                    "Metrics": {"UnblendedCost": {"Amount": "not-a-number"}}
                }]
            }]
        }"#;
        let response: CostAndUsageResponse = serde_json::from_str(json).unwrap();
        let err = flatten_groups(response).unwrap_err();
        assert!(err.to_string().contains("Invalid cost amount"));
    }

    #[test]
    fn flatten_rejects_missing_service_key() {
        let json = r#"{
            "ResultsByTime": [{
                "Groups": [{
                    "Keys": ["111111111111"],
                    "Metrics": {"UnblendedCost": {"Amount": "1.00"}}
                }]
            }]
        }"#;
        let response: CostAndUsageResponse = serde_json::from_str(json).unwrap();
        let err = flatten_groups(response).unwrap_err();
        assert!(err.to_string().contains("service key"));
    }

    #[test]
    fn flatten_rejects_missing_metric() {
        let json = r#"{
            "ResultsByTime": [{
                "Groups": [{
                    "Keys": ["111111111111", "AmazonEC2"],
                    "Metrics": {}
                }]
            }]
        }"#;
        let response: CostAndUsageResponse = serde_json::from_str(json).unwrap();
        let err = flatten_groups(response).unwrap_err();
        assert!(err.to_string().contains("UnblendedCost"));
    }

    #[test]
    fn rejects_plain_http_endpoint() {
        std::env::set_var(crate::core::clients::API_TOKEN_ENV, "test-token");
        let err = BillingClient::new("http://billing.example.com").unwrap_err();
        assert!(err.to_string().contains("must use HTTPS"));
    }
}
