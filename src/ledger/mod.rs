// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Stellar integration: session keypairs, Horizon client, and transaction
//! building/signing.

pub mod horizon;
pub mod keys;
pub mod tx;

pub use horizon::{HorizonClient, HorizonProblem};
pub use keys::Keypair;
pub use tx::TxBuilder;

use crate::report::{FailureReport, HorizonFailure};

/// Errors from the Stellar side of the service.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid memo: {0}")]
    InvalidMemo(String),

    #[error("XDR encoding failed: {0}")]
    Xdr(String),

    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Horizon returned HTTP {status}")]
    Api { status: u16, problem: HorizonProblem },
}

impl From<&LedgerError> for FailureReport {
    fn from(err: &LedgerError) -> Self {
        match err {
            LedgerError::Transport(inner) => FailureReport::from(inner),
            LedgerError::Api { status, problem } => {
                FailureReport::from_horizon(HorizonFailure {
                    status: *status,
                    title: problem.title.clone(),
                    detail: problem.detail.clone(),
                    extras: problem.extras.clone(),
                })
            }
            other => FailureReport::from_message(other.to_string()),
        }
    }
}
