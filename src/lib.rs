// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Lumen Demo Wallet - Demo Stellar Wallet Service
//!
//! This crate provides a demo custodial wallet service on the Stellar test
//! network: email one-time-code login, a per-session keypair, and endpoints
//! for payments, trustlines, and Blend lending-pool collateral.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Email one-time-code login and session tokens
//! - `ledger` - Stellar keys, Horizon client, transaction building
//! - `pool` - Blend lending-pool client (Soroban RPC)
//! - `report` - Upstream failure normalization

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod pool;
pub mod report;
pub mod state;
pub mod store;
