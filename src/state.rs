// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{otp::OtpClient, SessionKeys};
use crate::config::Config;
use crate::ledger::{HorizonClient, TxBuilder};
use crate::pool::PoolClient;
use crate::store::SessionStore;

/// Shared application state. Every client is constructed once here from the
/// resolved configuration and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<RwLock<SessionStore>>,
    pub horizon: HorizonClient,
    pub pool: PoolClient,
    pub tx_builder: TxBuilder,
    pub sessions: Arc<SessionKeys>,
    /// Identity-provider client; `None` when no provider is configured.
    pub idp: Option<Arc<OtpClient>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let horizon = HorizonClient::new(config.horizon_url.clone());
        let pool = PoolClient::new(config.soroban_rpc_url.clone());
        let tx_builder = TxBuilder::new(&config.network_passphrase);
        let sessions = Arc::new(SessionKeys::new(
            &config.session_secret,
            config.session_ttl_minutes,
        ));
        let idp = config.idp.as_ref().map(|idp| Arc::new(OtpClient::new(idp)));

        Self {
            config: Arc::new(config),
            store: Arc::new(RwLock::new(SessionStore::new())),
            horizon,
            pool,
            tx_builder,
            sessions,
            idp,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
