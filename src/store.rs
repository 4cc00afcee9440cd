// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! In-memory session store.
//!
//! Sessions and pending logins live only in memory: the keys are disposable
//! testnet keys provisioned per login, so losing them on restart is fine for
//! a demo. Each session carries an operation-in-flight flag so at most one
//! ledger operation can be pending per session at a time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::ledger::Keypair;

/// How long a started login may wait for its code.
const LOGIN_TTL_MINUTES: i64 = 10;

/// A login that has requested a code and waits for verification.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub email: String,
    /// Provider method id; `None` for the dev login path.
    pub method_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A logged-in session with its provisioned keypair.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub email: String,
    /// Seed of the session's ed25519 keypair.
    pub seed: [u8; 32],
    /// The session's account id (G...), derived from the seed.
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    operation_in_flight: bool,
}

#[derive(Default)]
pub struct SessionStore {
    pending: HashMap<String, PendingLogin>,
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a started login; returns the login id handed to the client.
    pub fn begin_login(&mut self, email: impl Into<String>, method_id: Option<String>) -> String {
        let login_id = Uuid::new_v4().to_string();
        self.pending.insert(
            login_id.clone(),
            PendingLogin {
                email: email.into(),
                method_id,
                created_at: Utc::now(),
            },
        );
        login_id
    }

    /// Consume a pending login. Expired or unknown logins are rejected; a
    /// login can only be consumed once regardless of outcome.
    pub fn take_login(&mut self, login_id: &str) -> Result<PendingLogin, ApiError> {
        let pending = self
            .pending
            .remove(login_id)
            .ok_or_else(|| ApiError::not_found("Login not found (request a new code)"))?;

        if Utc::now() - pending.created_at > Duration::minutes(LOGIN_TTL_MINUTES) {
            return Err(ApiError::unprocessable(
                "This login has expired; request a new code.",
            ));
        }
        Ok(pending)
    }

    /// Create a session holding the provisioned keypair.
    pub fn create_session(&mut self, email: impl Into<String>, keypair: &Keypair) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            seed: keypair.seed(),
            account_id: keypair.account_id(),
            created_at: Utc::now(),
            operation_in_flight: false,
        };
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn session(&self, session_id: &str) -> Result<Session, ApiError> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Session not found (log in again)"))
    }

    pub fn remove_session(&mut self, session_id: &str) -> Result<(), ApiError> {
        if self.sessions.remove(session_id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("Session not found"))
        }
    }

    /// Mark the session as having a ledger operation pending. Only one
    /// operation may be in flight per session at a time.
    pub fn begin_operation(&mut self, session_id: &str) -> Result<(), ApiError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::unauthorized("Session not found (log in again)"))?;

        if session.operation_in_flight {
            return Err(ApiError::conflict(
                "Another operation is already in flight for this session.",
            ));
        }
        session.operation_in_flight = true;
        Ok(())
    }

    /// Clear the operation-in-flight flag after completion or failure.
    pub fn finish_operation(&mut self, session_id: &str) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.operation_in_flight = false;
        }
    }
}

/// Holds a session's operation-in-flight flag for the duration of one
/// ledger operation.
///
/// Handlers acquire the guard before their first await on an upstream call.
/// The flag is released on [`OperationGuard::finish`], or from `Drop` when
/// the handler future is cancelled mid-flight (a disconnected client must
/// not leave the session stuck on 409).
pub struct OperationGuard {
    store: Arc<RwLock<SessionStore>>,
    session_id: String,
}

impl std::fmt::Debug for OperationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationGuard")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl OperationGuard {
    pub async fn begin(
        store: &Arc<RwLock<SessionStore>>,
        session_id: &str,
    ) -> Result<Self, ApiError> {
        store.write().await.begin_operation(session_id)?;
        Ok(Self {
            store: Arc::clone(store),
            session_id: session_id.to_string(),
        })
    }

    /// Release the flag on the normal path, synchronously.
    pub async fn finish(mut self) {
        let session_id = std::mem::take(&mut self.session_id);
        self.store.write().await.finish_operation(&session_id);
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        // Already released through `finish`.
        if self.session_id.is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        let session_id = std::mem::take(&mut self.session_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                store.write().await.finish_operation(&session_id);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn logins_are_single_use() {
        let mut store = SessionStore::new();
        let login_id = store.begin_login("user@example.com", Some("method-1".into()));

        let pending = store.take_login(&login_id).unwrap();
        assert_eq!(pending.email, "user@example.com");
        assert_eq!(pending.method_id.as_deref(), Some("method-1"));

        let err = store.take_login(&login_id).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn expired_logins_are_rejected() {
        let mut store = SessionStore::new();
        let login_id = store.begin_login("user@example.com", None);
        store
            .pending
            .get_mut(&login_id)
            .unwrap()
            .created_at = Utc::now() - Duration::minutes(LOGIN_TTL_MINUTES + 1);

        let err = store.take_login(&login_id).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn sessions_round_trip_with_keypair() {
        let mut store = SessionStore::new();
        let keypair = Keypair::random();
        let session = store.create_session("user@example.com", &keypair);

        let loaded = store.session(&session.id).unwrap();
        assert_eq!(loaded.account_id, keypair.account_id());
        assert_eq!(loaded.seed, keypair.seed());

        store.remove_session(&session.id).unwrap();
        let err = store.session(&session.id).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn only_one_operation_may_be_in_flight() {
        let mut store = SessionStore::new();
        let session = store.create_session("user@example.com", &Keypair::random());

        store.begin_operation(&session.id).unwrap();
        let err = store.begin_operation(&session.id).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        store.finish_operation(&session.id);
        store.begin_operation(&session.id).unwrap();
    }

    #[tokio::test]
    async fn guard_releases_the_flag_on_finish() {
        let store = Arc::new(RwLock::new(SessionStore::new()));
        let session = store
            .write()
            .await
            .create_session("user@example.com", &Keypair::random());

        let guard = OperationGuard::begin(&store, &session.id).await.unwrap();
        let err = OperationGuard::begin(&store, &session.id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        guard.finish().await;
        store.write().await.begin_operation(&session.id).unwrap();
    }

    #[tokio::test]
    async fn cancelled_operations_release_the_flag() {
        let store = Arc::new(RwLock::new(SessionStore::new()));
        let session = store
            .write()
            .await
            .create_session("user@example.com", &Keypair::random());

        let guard = OperationGuard::begin(&store, &session.id).await.unwrap();
        let task = tokio::spawn(async move {
            let _held = guard;
            std::future::pending::<()>().await;
        });
        tokio::task::yield_now().await;
        task.abort();
        let _ = task.await;

        // Dropping the guard schedules the release; wait for it to land.
        for _ in 0..100 {
            if store.write().await.begin_operation(&session.id).is_ok() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("operation flag was never released");
    }

    #[test]
    fn operations_require_a_live_session() {
        let mut store = SessionStore::new();
        let err = store.begin_operation("missing").unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        // Finishing a removed session is a no-op, not an error.
        store.finish_operation("missing");
    }
}
