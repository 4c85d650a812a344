use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clients::{api_token, http_client, validate_endpoint};
use crate::core::models::account::Account;

const LIST_ACCOUNTS_TARGET: &str = "AWSOrganizationsV20161128.ListAccounts";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListAccountsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccountRecord {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListAccountsResponse {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
    next_token: Option<String>,
}

/// Client for the organization directory API.
#[derive(Debug)]
pub struct DirectoryClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl DirectoryClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        validate_endpoint(endpoint, "Directory")?;
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            token: api_token()?,
        })
    }

    /// Enumerate every member account of the organization.
    ///
    /// Continuation tokens are followed until the directory stops returning
    /// one; a truncated account list would silently under-report costs.
    /// Any failure aborts the run.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let request = ListAccountsRequest {
                next_token: next_token.clone(),
            };

            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("X-Amz-Target", LIST_ACCOUNTS_TARGET)
                .json(&request)
                .send()
                .await
                .context("Failed to send request to directory API")?;

            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                anyhow::bail!("Directory API: unauthorized - check your API token");
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("HTTP {} from directory API: {}", status.as_u16(), body);
            }

            let page: ListAccountsResponse = response
                .json()
                .await
                .context("Failed to parse directory API response")?;

            accounts.extend(
                page.accounts
                    .into_iter()
                    .map(|a| Account::new(a.id, a.name)),
            );

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(count = accounts.len(), "Enumerated organization accounts");
        Ok(accounts)
    }
}
