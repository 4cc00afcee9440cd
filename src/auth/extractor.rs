// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Axum extractor for authenticated sessions.
//!
//! Use the `Auth` extractor in handlers to require a logged-in session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(session): Auth) -> impl IntoResponse {
//!     // session is the live store::Session
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::state::AppState;
use crate::store::Session;

/// Extractor resolving the Bearer token to the live session.
///
/// The token is verified first (signature and expiry), then the session id
/// from its claims is looked up in the store; a valid token whose session
/// was logged out is rejected.
#[derive(Debug)]
pub struct Auth(pub Session);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.sessions.verify(token)?;

        let session = state
            .store
            .read()
            .await
            .session(&claims.sid)
            .map_err(|_| AuthError::SessionNotFound)?;

        // A token issued for a different login must not reach this session.
        if session.email != claims.sub {
            return Err(AuthError::SessionNotFound);
        }

        Ok(Auth(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    use crate::ledger::Keypair;

    async fn extract(state: &AppState, header: Option<String>) -> Result<Auth, AuthError> {
        let mut builder = Request::builder().uri("/v1/account");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        Auth::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = AppState::default();
        let err = extract(&state, None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingAuthHeader));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let state = AppState::default();
        let err = extract(&state, Some("Basic dXNlcg==".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidAuthHeader));
    }

    #[tokio::test]
    async fn valid_token_resolves_the_session() {
        let state = AppState::default();
        let session = state
            .store
            .write()
            .await
            .create_session("user@example.com", &Keypair::random());
        let (token, _) = state.sessions.issue(&session.email, &session.id).unwrap();

        let Auth(resolved) = extract(&state, Some(format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(resolved.id, session.id);
        assert_eq!(resolved.account_id, session.account_id);
    }

    #[tokio::test]
    async fn logged_out_session_is_rejected() {
        let state = AppState::default();
        let session = state
            .store
            .write()
            .await
            .create_session("user@example.com", &Keypair::random());
        let (token, _) = state.sessions.issue(&session.email, &session.id).unwrap();
        state.store.write().await.remove_session(&session.id).unwrap();

        let err = extract(&state, Some(format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }
}
