// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! # Runtime Configuration
//!
//! All endpoints and credentials are read from the environment once at
//! startup and passed into each component at construction; nothing reads
//! environment variables after boot.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `HORIZON_URL` | Horizon API base URL | Stellar testnet Horizon |
//! | `SOROBAN_RPC_URL` | Soroban RPC endpoint | Stellar testnet RPC |
//! | `NETWORK_PASSPHRASE` | Network passphrase used for signing | testnet passphrase |
//! | `FRIENDBOT_URL` | Friendbot funding endpoint (empty disables) | testnet friendbot |
//! | `POOL_CONTRACT_ID` | Blend pool contract address (C...) | unset (pool endpoints disabled) |
//! | `POOL_ASSET_CONTRACT_ID` | Default collateral asset contract (C...) | unset |
//! | `IDP_BASE_URL` | Identity provider API base URL | provider test environment |
//! | `IDP_PROJECT_ID` | Identity provider project id | unset (dev login only) |
//! | `IDP_SECRET` | Identity provider secret | unset (dev login only) |
//! | `SESSION_SECRET` | HS256 secret for session tokens | random per boot |
//! | `SESSION_TTL_MINUTES` | Session token lifetime | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use url::Url;

pub const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const DEFAULT_SOROBAN_RPC_URL: &str = "https://soroban-testnet.stellar.org";
pub const DEFAULT_FRIENDBOT_URL: &str = "https://friendbot.stellar.org";
pub const DEFAULT_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const DEFAULT_IDP_BASE_URL: &str = "https://test.stytch.com";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value in {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Identity-provider credentials for the email one-time-code flow.
#[derive(Debug, Clone)]
pub struct IdpConfig {
    pub base_url: Url,
    pub project_id: String,
    pub secret: String,
}

/// Service configuration, resolved once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub horizon_url: Url,
    pub soroban_rpc_url: Url,
    pub network_passphrase: String,
    pub friendbot_url: Option<Url>,
    /// Blend pool contract address. Pool endpoints return 503 when unset.
    pub pool_contract_id: Option<String>,
    /// Default collateral asset contract address for pool operations.
    pub pool_asset_contract_id: Option<String>,
    /// Identity provider credentials. When unset, only the `dev` feature's
    /// fixed-code login path is available.
    pub idp: Option<IdpConfig>,
    pub session_secret: String,
    pub session_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                reason: format!("`{raw}` is not a valid port number"),
            })?,
            Err(_) => 8080,
        };

        let horizon_url = parse_url("HORIZON_URL", DEFAULT_HORIZON_URL)?;
        let soroban_rpc_url = parse_url("SOROBAN_RPC_URL", DEFAULT_SOROBAN_RPC_URL)?;
        let network_passphrase =
            env_or_default("NETWORK_PASSPHRASE", DEFAULT_NETWORK_PASSPHRASE);

        let friendbot_url = match env_or_default("FRIENDBOT_URL", DEFAULT_FRIENDBOT_URL) {
            raw if raw.is_empty() => None,
            raw => Some(raw.parse().map_err(|source| ConfigError::InvalidUrl {
                name: "FRIENDBOT_URL",
                source,
            })?),
        };

        let idp = match (env_opt("IDP_PROJECT_ID"), env_opt("IDP_SECRET")) {
            (Some(project_id), Some(secret)) => Some(IdpConfig {
                base_url: parse_url("IDP_BASE_URL", DEFAULT_IDP_BASE_URL)?,
                project_id,
                secret,
            }),
            _ => None,
        };

        let session_ttl_minutes = match env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "SESSION_TTL_MINUTES",
                    reason: format!("`{raw}` is not a positive number of minutes"),
                })?,
            Err(_) => DEFAULT_SESSION_TTL_MINUTES,
        };

        Ok(Self {
            host,
            port,
            horizon_url,
            soroban_rpc_url,
            network_passphrase,
            friendbot_url,
            pool_contract_id: env_opt("POOL_CONTRACT_ID"),
            pool_asset_contract_id: env_opt("POOL_ASSET_CONTRACT_ID"),
            idp,
            session_secret: env_opt("SESSION_SECRET").unwrap_or_else(random_secret),
            session_ttl_minutes,
        })
    }
}

impl Default for Config {
    /// Testnet defaults with a random session secret. Used by tests and as
    /// the baseline `from_env` builds on.
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            horizon_url: DEFAULT_HORIZON_URL.parse().expect("static URL"),
            soroban_rpc_url: DEFAULT_SOROBAN_RPC_URL.parse().expect("static URL"),
            network_passphrase: DEFAULT_NETWORK_PASSPHRASE.to_string(),
            friendbot_url: Some(DEFAULT_FRIENDBOT_URL.parse().expect("static URL")),
            pool_contract_id: None,
            pool_asset_contract_id: None,
            idp: None,
            session_secret: random_secret(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

fn parse_url(name: &'static str, default: &str) -> Result<Url, ConfigError> {
    env_or_default(name, default)
        .parse()
        .map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn random_secret() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_testnet() {
        let config = Config::default();
        assert_eq!(config.horizon_url.as_str(), "https://horizon-testnet.stellar.org/");
        assert_eq!(config.network_passphrase, DEFAULT_NETWORK_PASSPHRASE);
        assert!(config.friendbot_url.is_some());
        assert!(config.pool_contract_id.is_none());
        assert!(config.idp.is_none());
    }

    #[test]
    fn random_secrets_differ_between_boots() {
        assert_ne!(random_secret(), random_secret());
    }
}
