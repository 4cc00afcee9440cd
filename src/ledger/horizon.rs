// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Horizon REST client: account loading, transaction submission, and
//! friendbot funding.
//!
//! Non-2xx responses are decoded as Horizon problem documents
//! (title/detail/extras) and carried in [`LedgerError::Api`] so the failure
//! report can show result codes. A body that fails to decode degrades to a
//! status-only problem rather than an error of its own.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::LedgerError;

/// Per-request timeout for Horizon and friendbot calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An account record as returned by `GET /accounts/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    /// Current sequence number (Horizon serializes it as a string).
    #[serde(deserialize_with = "string_i64")]
    pub sequence: i64,
    #[serde(default)]
    pub balances: Vec<BalanceRecord>,
}

/// One balance line of an account record.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceRecord {
    pub balance: String,
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
}

/// The interesting subset of a `POST /transactions` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRecord {
    pub hash: String,
    #[serde(default)]
    pub successful: Option<bool>,
    #[serde(default)]
    pub ledger: Option<u64>,
}

/// A Horizon problem document (returned with every non-2xx status).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorizonProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    /// Arbitrary diagnostics; for failed transactions this holds the
    /// `result_codes` mapping.
    #[serde(default)]
    pub extras: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct HorizonClient {
    base_url: Url,
    http: Client,
}

impl HorizonClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Load the account record (sequence number and balances).
    pub async fn load_account(&self, account_id: &str) -> Result<AccountRecord, LedgerError> {
        let url = self.endpoint(&format!("accounts/{account_id}"));
        let response = self
            .http
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        decode(response).await
    }

    /// Submit a signed transaction envelope (base64 XDR).
    pub async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmitRecord, LedgerError> {
        let url = self.endpoint("transactions");
        let response = self
            .http
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await?;
        decode(response).await
    }

    /// Ask friendbot to create and fund a testnet account.
    pub async fn fund_with_friendbot(
        &self,
        friendbot_url: &Url,
        account_id: &str,
    ) -> Result<(), LedgerError> {
        let response = self
            .http
            .get(friendbot_url.clone())
            .timeout(REQUEST_TIMEOUT)
            .query(&[("addr", account_id)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(problem_error(status.as_u16(), response).await)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(LedgerError::from);
    }
    Err(problem_error(status.as_u16(), response).await)
}

async fn problem_error(status: u16, response: Response) -> LedgerError {
    // An unparseable error body still yields the status.
    let problem = response.json::<HorizonProblem>().await.unwrap_or_default();
    LedgerError::Api { status, problem }
}

fn string_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_record_parses_horizon_json() {
        let record: AccountRecord = serde_json::from_str(
            r#"{
                "account_id": "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ",
                "sequence": "103420918407103888",
                "balances": [
                    {"balance": "100.0000000", "asset_type": "native"},
                    {
                        "balance": "25.0000000",
                        "asset_type": "credit_alphanum4",
                        "asset_code": "USDC",
                        "asset_issuer": "GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.sequence, 103_420_918_407_103_888);
        assert_eq!(record.balances.len(), 2);
        assert_eq!(record.balances[0].asset_type, "native");
        assert_eq!(record.balances[1].asset_code.as_deref(), Some("USDC"));
    }

    #[test]
    fn bad_sequence_string_is_an_error() {
        let result: Result<AccountRecord, _> = serde_json::from_str(
            r#"{"account_id": "G", "sequence": "not-a-number", "balances": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn problem_document_tolerates_missing_fields() {
        let problem: HorizonProblem = serde_json::from_str(r#"{"status": 404}"#).unwrap();
        assert_eq!(problem.status, Some(404));
        assert!(problem.title.is_none());
        assert!(problem.extras.is_none());
    }

    #[test]
    fn submit_record_parses_success_payload() {
        let record: SubmitRecord = serde_json::from_str(
            r#"{"hash": "deadbeef", "ledger": 123, "successful": true}"#,
        )
        .unwrap();
        assert_eq!(record.hash, "deadbeef");
        assert_eq!(record.ledger, Some(123));
        assert_eq!(record.successful, Some(true));
    }
}
