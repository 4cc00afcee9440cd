// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Auth**: email one-time-code login and session issuance
//! - **Account**: the session account's funding state and balances
//! - **Operations**: payments, trustlines, and pool collateral requests,
//!   all resolving to a [`SubmitResponse`]

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Auth Models
// =============================================================================

/// Request to start an email one-time-code login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestCodeRequest {
    /// Email address to send the code to.
    pub email: String,
}

/// A started login waiting for its code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestCodeResponse {
    /// Opaque id to pass back together with the received code.
    pub login_id: String,
}

/// Request to complete a login with the emailed code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    /// The login id returned when the code was requested.
    pub login_id: String,
    /// The one-time code from the email.
    pub code: String,
}

/// An established session with its provisioned Stellar account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The session's Stellar account id (G...).
    pub account_id: String,
    /// Token expiry (RFC 3339).
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Account Models
// =============================================================================

/// One balance line of the session account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AssetBalance {
    /// `native` for XLM, otherwise `CODE:ISSUER`.
    pub asset: String,
    /// Balance as a decimal string (7 decimal places).
    pub balance: String,
}

/// The session account as seen by Horizon.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    /// The session's Stellar account id (G...).
    pub account_id: String,
    /// False until the account exists on-ledger (friendbot or a payment).
    pub funded: bool,
    pub balances: Vec<AssetBalance>,
}

// =============================================================================
// Operation Models
// =============================================================================

/// Request to send a payment from the session account.
///
/// With no asset fields the payment is in the native asset (XLM); otherwise
/// both `asset_code` and `asset_issuer` are required.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Destination account id (G...).
    pub destination: String,
    /// Amount as a decimal string, e.g. `"12.5"`.
    pub amount: String,
    /// Asset code (1-12 alphanumeric characters) for non-native payments.
    #[serde(default)]
    pub asset_code: Option<String>,
    /// Asset issuer account id for non-native payments.
    #[serde(default)]
    pub asset_issuer: Option<String>,
    /// Optional text memo (at most 28 bytes).
    #[serde(default)]
    pub memo: Option<String>,
}

/// Request to open a trustline so the session account can hold an asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrustlineRequest {
    /// Asset code (1-12 alphanumeric characters).
    pub asset_code: String,
    /// Asset issuer account id (G...).
    pub asset_issuer: String,
    /// Optional trust limit as a decimal string; defaults to the maximum.
    #[serde(default)]
    pub limit: Option<String>,
}

/// Request to move collateral into or out of the lending pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PoolRequest {
    /// Amount as a decimal string, e.g. `"100"`.
    pub amount: String,
    /// Collateral asset contract address (C...); defaults to the configured
    /// pool asset.
    #[serde(default)]
    pub asset_contract_id: Option<String>,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    /// Transaction hash (hex).
    pub hash: String,
    /// Whether the ledger applied the transaction.
    pub successful: bool,
    /// Ledger sequence the transaction landed in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<u64>,
}
