// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AccountResponse, AssetBalance, PaymentRequest, PoolRequest, RequestCodeRequest,
        RequestCodeResponse, SessionResponse, SubmitResponse, TrustlineRequest, VerifyCodeRequest,
    },
    state::AppState,
};

pub mod account;
pub mod auth;
pub mod health;
pub mod payments;
pub mod pool;
pub mod trustlines;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/code", post(auth::request_code))
        .route("/auth/verify", post(auth::verify_code))
        .route("/auth/session", delete(auth::logout))
        .route("/account", get(account::account_details))
        .route("/account/fund", post(account::fund_account))
        .route("/payments", post(payments::submit_payment))
        .route("/trustlines", post(trustlines::change_trustline))
        .route("/pool/supply", post(pool::supply_collateral))
        .route("/pool/withdraw", post(pool::withdraw_collateral))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::request_code,
        auth::verify_code,
        auth::logout,
        account::account_details,
        account::fund_account,
        payments::submit_payment,
        trustlines::change_trustline,
        pool::supply_collateral,
        pool::withdraw_collateral,
        health::health
    ),
    components(
        schemas(
            RequestCodeRequest,
            RequestCodeResponse,
            VerifyCodeRequest,
            SessionResponse,
            AccountResponse,
            AssetBalance,
            PaymentRequest,
            TrustlineRequest,
            PoolRequest,
            SubmitResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Email one-time-code login"),
        (name = "Account", description = "Session account state and funding"),
        (name = "Payments", description = "Payment submission"),
        (name = "Trustlines", description = "Trustline management"),
        (name = "Pool", description = "Lending pool collateral"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
