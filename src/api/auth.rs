// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Login endpoints: email one-time-code request/verify and logout.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::auth::{normalize_email, Auth};
use crate::error::ApiError;
use crate::ledger::Keypair;
use crate::models::{
    RequestCodeRequest, RequestCodeResponse, SessionResponse, VerifyCodeRequest,
};
use crate::report::FailureReport;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/auth/code",
    request_body = RequestCodeRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Code sent", body = RequestCodeResponse),
        (status = 400, description = "Invalid email"),
        (status = 502, description = "Identity provider unreachable"),
        (status = 503, description = "No identity provider configured")
    )
)]
pub async fn request_code(
    State(state): State<AppState>,
    Json(request): Json<RequestCodeRequest>,
) -> Result<Json<RequestCodeResponse>, ApiError> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }

    let method_id = match &state.idp {
        Some(idp) => Some(idp.send_code(&email).await.map_err(|err| {
            ApiError::bad_gateway(
                FailureReport::from(&err).describe("Could not send the login code"),
            )
        })?),
        // Without a provider, the dev build accepts its fixed code.
        None if cfg!(feature = "dev") => None,
        None => {
            return Err(ApiError::service_unavailable(
                "Identity provider is not configured",
            ))
        }
    };

    let login_id = state.store.write().await.begin_login(email, method_id);
    Ok(Json(RequestCodeResponse { login_id }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify",
    request_body = VerifyCodeRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Session established", body = SessionResponse),
        (status = 401, description = "Wrong or expired code"),
        (status = 404, description = "Unknown login id")
    )
)]
pub async fn verify_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let pending = state.store.write().await.take_login(&request.login_id)?;

    match (&state.idp, pending.method_id) {
        (Some(idp), Some(method_id)) => {
            idp.verify_code(&method_id, &request.code)
                .await
                .map_err(|err| match err {
                    crate::auth::otp::OtpError::Rejected { .. } => {
                        ApiError::unauthorized("The code is incorrect or has expired")
                    }
                    other => ApiError::bad_gateway(
                        FailureReport::from(&other)
                            .describe("Could not verify the login code"),
                    ),
                })?;
        }
        (Some(_), None) => {
            return Err(ApiError::unprocessable(
                "This login was started without a provider; request a new code.",
            ))
        }
        (None, _) => {
            #[cfg(feature = "dev")]
            if request.code != crate::auth::DEV_LOGIN_CODE {
                return Err(ApiError::unauthorized("The code is incorrect"));
            }
            #[cfg(not(feature = "dev"))]
            return Err(ApiError::service_unavailable(
                "Identity provider is not configured",
            ));
        }
    }

    // Provision the session keypair. The account exists only once funded.
    let keypair = Keypair::random();
    let session = state
        .store
        .write()
        .await
        .create_session(pending.email, &keypair);
    let (token, expires_at) = state
        .sessions
        .issue(&session.email, &session.id)
        .map_err(|err| ApiError::internal(err.to_string()))?;

    info!(account_id = %session.account_id, "session established");
    Ok(Json(SessionResponse {
        token,
        account_id: session.account_id,
        expires_at,
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/auth/session",
    tag = "Auth",
    responses((status = 204, description = "Session removed"))
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(session): Auth,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.remove_session(&session.id)?;
    Ok(StatusCode::NO_CONTENT)
}
