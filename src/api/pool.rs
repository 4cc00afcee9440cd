// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Lending pool collateral: supply and withdraw against the configured
//! Blend pool contract.

use axum::{extract::State, Json};
use tracing::info;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::ledger::{tx::parse_amount, Keypair};
use crate::models::{PoolRequest, SubmitResponse};
use crate::pool::CollateralAction;
use crate::report::FailureReport;
use crate::state::AppState;
use crate::store::{OperationGuard, Session};

#[utoipa::path(
    post,
    path = "/v1/pool/supply",
    tag = "Pool",
    request_body = PoolRequest,
    responses(
        (status = 200, description = "Collateral supplied", body = SubmitResponse),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Another operation is in flight"),
        (status = 503, description = "No pool contract is configured")
    )
)]
pub async fn supply_collateral(
    State(state): State<AppState>,
    Auth(session): Auth,
    Json(request): Json<PoolRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    collateral(state, session, request, CollateralAction::SupplyCollateral).await
}

#[utoipa::path(
    post,
    path = "/v1/pool/withdraw",
    tag = "Pool",
    request_body = PoolRequest,
    responses(
        (status = 200, description = "Collateral withdrawn", body = SubmitResponse),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Another operation is in flight"),
        (status = 503, description = "No pool contract is configured")
    )
)]
pub async fn withdraw_collateral(
    State(state): State<AppState>,
    Auth(session): Auth,
    Json(request): Json<PoolRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    collateral(state, session, request, CollateralAction::WithdrawCollateral).await
}

async fn collateral(
    state: AppState,
    session: Session,
    request: PoolRequest,
    action: CollateralAction,
) -> Result<Json<SubmitResponse>, ApiError> {
    let pool_contract_id = state
        .config
        .pool_contract_id
        .clone()
        .ok_or_else(|| ApiError::service_unavailable("No pool contract is configured"))?;
    let asset_contract_id = request
        .asset_contract_id
        .clone()
        .or_else(|| state.config.pool_asset_contract_id.clone())
        .ok_or_else(|| ApiError::service_unavailable("No pool asset contract is configured"))?;
    let amount = i128::from(
        parse_amount(&request.amount).map_err(|err| ApiError::unprocessable(err.to_string()))?,
    );

    let guard = OperationGuard::begin(&state.store, &session.id).await?;
    let keypair = Keypair::from_seed(session.seed);
    let result = state
        .pool
        .submit_collateral(
            &state.tx_builder,
            &state.horizon,
            &keypair,
            &pool_contract_id,
            &asset_contract_id,
            amount,
            action,
        )
        .await;
    guard.finish().await;

    let outcome = result.map_err(|err| {
        ApiError::bad_gateway(FailureReport::from(&err).describe("Pool submission failed"))
    })?;

    info!(
        account_id = %session.account_id,
        hash = %outcome.hash,
        ?action,
        "pool collateral change settled"
    );
    Ok(Json(SubmitResponse {
        hash: outcome.hash,
        successful: true,
        ledger: outcome.ledger,
    }))
}
