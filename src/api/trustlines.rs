// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Trustline management: open (or resize) a trustline for a credit asset.

use axum::{extract::State, Json};
use tracing::info;

use crate::api::payments::submit_error;
use crate::auth::Auth;
use crate::error::ApiError;
use crate::ledger::{
    tx::{change_trust_line, parse_amount, parse_asset},
    Keypair,
};
use crate::models::{SubmitResponse, TrustlineRequest};
use crate::state::AppState;
use crate::store::OperationGuard;

#[utoipa::path(
    post,
    path = "/v1/trustlines",
    tag = "Trustlines",
    request_body = TrustlineRequest,
    responses(
        (status = 200, description = "Trustline change submitted", body = SubmitResponse),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Another operation is in flight"),
        (status = 422, description = "Invalid trustline request")
    )
)]
pub async fn change_trustline(
    State(state): State<AppState>,
    Auth(session): Auth,
    Json(request): Json<TrustlineRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let asset = parse_asset(&request.asset_code, &request.asset_issuer)
        .map_err(|err| ApiError::unprocessable(err.to_string()))?;
    let limit = trust_limit(request.limit.as_deref())?;

    let guard = OperationGuard::begin(&state.store, &session.id).await?;
    let result = submit_change_trust(&state, &session, asset, limit).await;
    guard.finish().await;

    let response = result?;
    info!(
        account_id = %session.account_id,
        asset_code = %request.asset_code,
        hash = %response.hash,
        "trustline change submitted"
    );
    Ok(Json(response))
}

async fn submit_change_trust(
    state: &AppState,
    session: &crate::store::Session,
    asset: stellar_xdr::curr::Asset,
    limit: i64,
) -> Result<SubmitResponse, ApiError> {
    let keypair = Keypair::from_seed(session.seed);
    let account = state
        .horizon
        .load_account(&session.account_id)
        .await
        .map_err(submit_error)?;

    let tx = state
        .tx_builder
        .change_trust(
            keypair.public_key(),
            account.sequence,
            change_trust_line(asset),
            limit,
        )
        .map_err(submit_error)?;
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

// No explicit limit means the maximum the ledger allows.
fn trust_limit(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw {
        None => Ok(i64::MAX),
        Some(value) => parse_amount(value).map_err(|err| ApiError::unprocessable(err.to_string())),
    }
}
