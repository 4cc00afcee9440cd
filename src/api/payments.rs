// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Payment submission: build, sign, and submit a payment from the
//! session account.

use axum::{extract::State, Json};
use stellar_xdr::curr::Asset;
use tracing::info;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::ledger::{
    keys::parse_account_id,
    tx::{parse_amount, parse_asset},
    Keypair, LedgerError,
};
use crate::models::{PaymentRequest, SubmitResponse};
use crate::report::FailureReport;
use crate::state::AppState;
use crate::store::{OperationGuard, Session};

#[utoipa::path(
    post,
    path = "/v1/payments",
    tag = "Payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment submitted", body = SubmitResponse),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Another operation is in flight"),
        (status = 422, description = "Invalid payment request")
    )
)]
pub async fn submit_payment(
    State(state): State<AppState>,
    Auth(session): Auth,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let destination = parse_account_id(&request.destination)
        .map_err(|_| ApiError::unprocessable("Invalid destination account id"))?;
    let asset = requested_asset(&request)?;
    let amount =
        parse_amount(&request.amount).map_err(|err| ApiError::unprocessable(err.to_string()))?;

    let guard = OperationGuard::begin(&state.store, &session.id).await?;
    let result = send_payment(&state, &session, destination, asset, amount, &request).await;
    guard.finish().await;

    let response = result?;
    info!(
        account_id = %session.account_id,
        hash = %response.hash,
        "payment submitted"
    );
    Ok(Json(response))
}

async fn send_payment(
    state: &AppState,
    session: &Session,
    destination: [u8; 32],
    asset: Asset,
    amount: i64,
    request: &PaymentRequest,
) -> Result<SubmitResponse, ApiError> {
    let keypair = Keypair::from_seed(session.seed);
    let account = state
        .horizon
        .load_account(&session.account_id)
        .await
        .map_err(submit_error)?;

    let tx = state
        .tx_builder
        .payment(
            keypair.public_key(),
            account.sequence,
            destination,
            asset,
            amount,
            request.memo.as_deref(),
        )
        .map_err(|err| ApiError::unprocessable(err.to_string()))?;
    let signed = state
        .tx_builder
        .sign(&tx, &keypair)
        .map_err(submit_error)?;

    let record = state
        .horizon
        .submit_transaction(&signed.envelope_xdr)
        .await
        .map_err(submit_error)?;

    Ok(SubmitResponse {
        hash: record.hash,
        successful: record.successful.unwrap_or(true),
        ledger: record.ledger,
    })
}

fn requested_asset(request: &PaymentRequest) -> Result<Asset, ApiError> {
    match (&request.asset_code, &request.asset_issuer) {
        (None, None) => Ok(Asset::Native),
        (Some(code), Some(issuer)) => {
            parse_asset(code, issuer).map_err(|err| ApiError::unprocessable(err.to_string()))
        }
        _ => Err(ApiError::unprocessable(
            "asset_code and asset_issuer must be provided together",
        )),
    }
}

pub(super) fn submit_error(err: LedgerError) -> ApiError {
    ApiError::bad_gateway(FailureReport::from(&err).describe("Transaction submission failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: Option<&str>, issuer: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            destination: "GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5".into(),
            amount: "1".into(),
            asset_code: code.map(Into::into),
            asset_issuer: issuer.map(Into::into),
            memo: None,
        }
    }

    #[test]
    fn omitting_the_asset_means_native() {
        let asset = requested_asset(&request(None, None)).unwrap();
        assert!(matches!(asset, Asset::Native));
    }

    #[test]
    fn credit_assets_need_both_code_and_issuer() {
        let err = requested_asset(&request(Some("USDC"), None)).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn credit_assets_parse() {
        let asset = requested_asset(&request(
            Some("USDC"),
            Some("GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5"),
        ))
        .unwrap();
        assert!(matches!(asset, Asset::CreditAlphanum4(_)));
    }

    #[test]
    fn ledger_failures_become_gateway_errors() {
        let err = submit_error(LedgerError::Xdr("bad envelope".into()));
        assert_eq!(err.status, axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "XDR encoding failed: bad envelope");
    }
}
