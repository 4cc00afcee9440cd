// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! The session account: funding state, balances, and friendbot funding.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::ledger::{horizon::BalanceRecord, LedgerError};
use crate::models::{AccountResponse, AssetBalance};
use crate::report::FailureReport;
use crate::state::AppState;
use crate::store::OperationGuard;

#[utoipa::path(
    get,
    path = "/v1/account",
    tag = "Account",
    responses(
        (status = 200, description = "Account state", body = AccountResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn account_details(
    State(state): State<AppState>,
    Auth(session): Auth,
) -> Result<Json<AccountResponse>, ApiError> {
    match state.horizon.load_account(&session.account_id).await {
        Ok(record) => Ok(Json(AccountResponse {
            account_id: session.account_id,
            funded: true,
            balances: record.balances.iter().map(asset_balance).collect(),
        })),
        // An account Horizon has never seen simply is not funded yet.
        Err(LedgerError::Api { status: 404, .. }) => Ok(Json(AccountResponse {
            account_id: session.account_id,
            funded: false,
            balances: Vec::new(),
        })),
        Err(err) => Err(ApiError::bad_gateway(
            FailureReport::from(&err).describe("Could not load the account"),
        )),
    }
}

#[utoipa::path(
    post,
    path = "/v1/account/fund",
    tag = "Account",
    responses(
        (status = 200, description = "Account funded"),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Another operation is in flight"),
        (status = 503, description = "Friendbot is not configured")
    )
)]
pub async fn fund_account(
    State(state): State<AppState>,
    Auth(session): Auth,
) -> Result<StatusCode, ApiError> {
    let friendbot_url = state
        .config
        .friendbot_url
        .clone()
        .ok_or_else(|| ApiError::service_unavailable("Friendbot is not configured"))?;

    let guard = OperationGuard::begin(&state.store, &session.id).await?;
    let result = state
        .horizon
        .fund_with_friendbot(&friendbot_url, &session.account_id)
        .await;
    guard.finish().await;

    result.map_err(|err| {
        ApiError::bad_gateway(FailureReport::from(&err).describe("Friendbot funding failed"))
    })?;

    info!(account_id = %session.account_id, "account funded via friendbot");
    Ok(StatusCode::OK)
}

fn asset_balance(record: &BalanceRecord) -> AssetBalance {
    let asset = if record.asset_type == "native" {
        "native".to_string()
    } else {
        match (&record.asset_code, &record.asset_issuer) {
            (Some(code), Some(issuer)) => format!("{code}:{issuer}"),
            _ => record.asset_type.clone(),
        }
    };
    AssetBalance {
        asset,
        balance: record.balance.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        asset_type: &str,
        code: Option<&str>,
        issuer: Option<&str>,
        balance: &str,
    ) -> BalanceRecord {
        BalanceRecord {
            balance: balance.into(),
            asset_type: asset_type.into(),
            asset_code: code.map(Into::into),
            asset_issuer: issuer.map(Into::into),
        }
    }

    #[test]
    fn native_balances_are_labelled_native() {
        let balance = asset_balance(&record("native", None, None, "100.0000000"));
        assert_eq!(
            balance,
            AssetBalance {
                asset: "native".into(),
                balance: "100.0000000".into()
            }
        );
    }

    #[test]
    fn credit_balances_join_code_and_issuer() {
        let balance = asset_balance(&record(
            "credit_alphanum4",
            Some("USDC"),
            Some("GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5"),
            "25.0000000",
        ));
        assert_eq!(
            balance.asset,
            "USDC:GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5"
        );
    }

    #[test]
    fn malformed_credit_lines_fall_back_to_the_type() {
        let balance = asset_balance(&record("credit_alphanum4", None, None, "1"));
        assert_eq!(balance.asset, "credit_alphanum4");
    }
}
