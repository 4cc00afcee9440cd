// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Blend lending-pool client over Soroban RPC.
//!
//! Collateral moves through the pool contract's `submit` entry point:
//! `submit(from, spender, to, requests)` where each request is a map of
//! {address, amount, request_type}. This client encodes the invocation,
//! simulates it, splices the simulation's resource data and auth entries
//! into the transaction, re-signs, sends, and polls until the network
//! settles it.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stellar_xdr::curr::{
    Hash, HostFunction, Int128Parts, InvokeContractArgs, InvokeHostFunctionOp, Limits,
    OperationBody, ReadXdr, ScAddress, ScMap, ScMapEntry, ScSymbol, ScVal, ScVec,
    SorobanAuthorizationEntry, SorobanTransactionData, Transaction, TransactionExt,
};
use tracing::debug;
use url::Url;

use crate::ledger::keys::{parse_contract_id, Keypair};
use crate::ledger::{HorizonClient, LedgerError, TxBuilder};
use crate::report::FailureReport;

/// Per-request timeout for RPC calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How often and how long to poll for transaction settlement.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const POLL_ATTEMPTS: u32 = 30;

/// The pool contract's entry point for all position changes.
const SUBMIT_FUNCTION: &str = "submit";

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("simulation failed: {0}")]
    Simulation(String),

    #[error("transaction failed on chain: {0}")]
    Failed(String),

    #[error("timed out waiting for transaction {0}")]
    Timeout(String),

    #[error("XDR encoding failed: {0}")]
    Xdr(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<&PoolError> for FailureReport {
    fn from(err: &PoolError) -> Self {
        match err {
            PoolError::Transport(inner) => FailureReport::from(inner),
            PoolError::Ledger(inner) => FailureReport::from(inner),
            other => FailureReport::from_message(other.to_string()),
        }
    }
}

/// The two collateral movements this service exposes, with the request-type
/// codes the pool contract assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateralAction {
    SupplyCollateral,
    WithdrawCollateral,
}

impl CollateralAction {
    fn request_type(self) -> u32 {
        match self {
            CollateralAction::SupplyCollateral => 2,
            CollateralAction::WithdrawCollateral => 3,
        }
    }
}

/// A settled pool transaction.
#[derive(Debug, Clone)]
pub struct PoolOutcome {
    /// Transaction hash (hex).
    pub hash: String,
    /// Ledger the transaction landed in, when the RPC reported it.
    pub ledger: Option<u64>,
}

#[derive(Clone)]
pub struct PoolClient {
    rpc_url: String,
    http: Client,
}

impl PoolClient {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            http: Client::new(),
        }
    }

    /// Move `amount` (stroops) of collateral into or out of the pool for the
    /// session account. Runs the full simulate → assemble → sign → send →
    /// poll sequence.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_collateral(
        &self,
        builder: &TxBuilder,
        horizon: &HorizonClient,
        keypair: &Keypair,
        pool_contract_id: &str,
        asset_contract_id: &str,
        amount: i128,
        action: CollateralAction,
    ) -> Result<PoolOutcome, PoolError> {
        let pool = parse_contract_id(pool_contract_id)?;
        let asset = parse_contract_id(asset_contract_id)?;

        let account = horizon.load_account(&keypair.account_id()).await?;
        let operation = submit_operation(keypair.public_key(), pool, asset, amount, action)?;
        let mut tx = builder.invoke_contract(keypair.public_key(), account.sequence, operation)?;

        // Simulate against a draft signature, then rebuild with the
        // simulation's resources and auth before the real submission.
        let draft = builder.sign(&tx, keypair)?;
        let simulation = self.simulate(&draft.envelope_xdr).await?;
        apply_simulation(&mut tx, &simulation)?;

        let signed = builder.sign(&tx, keypair)?;
        let hash = self.send(&signed.envelope_xdr).await?;
        debug!(%hash, "pool transaction sent, polling for settlement");
        self.wait_for_settlement(&hash).await
    }

    async fn simulate(&self, envelope_xdr: &str) -> Result<SimulateResponse, PoolError> {
        self.call(
            "simulateTransaction",
            json!({ "transaction": envelope_xdr }),
        )
        .await
    }

    async fn send(&self, envelope_xdr: &str) -> Result<String, PoolError> {
        let result: SendResult = self
            .call("sendTransaction", json!({ "transaction": envelope_xdr }))
            .await?;

        match result.status.as_str() {
            "ERROR" => Err(PoolError::Rpc(match result.error_result_xdr {
                Some(xdr) => format!("transaction rejected: {xdr}"),
                None => "transaction rejected".to_string(),
            })),
            "TRY_AGAIN_LATER" => Err(PoolError::Rpc(
                "the network asked to try again later".to_string(),
            )),
            _ => Ok(result.hash),
        }
    }

    async fn wait_for_settlement(&self, hash: &str) -> Result<PoolOutcome, PoolError> {
        for _ in 0..POLL_ATTEMPTS {
            let result: GetTransactionResult =
                self.call("getTransaction", json!({ "hash": hash })).await?;

            match result.status.as_str() {
                "SUCCESS" => {
                    return Ok(PoolOutcome {
                        hash: hash.to_string(),
                        ledger: result.ledger,
                    })
                }
                "FAILED" => {
                    return Err(PoolError::Failed(
                        result.result_xdr.unwrap_or_else(|| hash.to_string()),
                    ))
                }
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
        Err(PoolError::Timeout(hash.to_string()))
    }

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, PoolError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.rpc_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?;

        let envelope: RpcEnvelope<R> = response.json().await?;
        if let Some(fault) = envelope.error {
            return Err(PoolError::Rpc(format!(
                "{} (code {})",
                fault.message, fault.code
            )));
        }
        envelope
            .result
            .ok_or_else(|| PoolError::Rpc("empty RPC result".to_string()))
    }
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcEnvelope<R> {
    result: Option<R>,
    error: Option<RpcFault>,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcFault {
    code: i64,
    message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SimulateResponse {
    #[serde(default, rename = "transactionData")]
    transaction_data: Option<String>,
    #[serde(default, rename = "minResourceFee")]
    min_resource_fee: Option<String>,
    #[serde(default)]
    results: Option<Vec<SimulateResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SimulateResult {
    #[serde(default)]
    auth: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct SendResult {
    status: String,
    hash: String,
    #[serde(default, rename = "errorResultXdr")]
    error_result_xdr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GetTransactionResult {
    status: String,
    #[serde(default)]
    ledger: Option<u64>,
    #[serde(default, rename = "resultXdr")]
    result_xdr: Option<String>,
}

/// Encode the pool `submit` invocation. `from`, `spender`, and `to` are all
/// the session account; the single request names the collateral asset, the
/// amount, and the action's request type.
fn submit_operation(
    user: [u8; 32],
    pool: [u8; 32],
    asset: [u8; 32],
    amount: i128,
    action: CollateralAction,
) -> Result<InvokeHostFunctionOp, PoolError> {
    use stellar_xdr::curr::{AccountId, PublicKey, Uint256};

    let user_address = ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(
        user,
    ))));
    let asset_address = ScAddress::Contract(Hash(asset));

    // Struct maps are encoded with their symbol keys in sorted order.
    let request = ScVal::Map(Some(ScMap(
        vec![
            ScMapEntry {
                key: symbol("address")?,
                val: ScVal::Address(asset_address),
            },
            ScMapEntry {
                key: symbol("amount")?,
                val: i128_val(amount),
            },
            ScMapEntry {
                key: symbol("request_type")?,
                val: ScVal::U32(action.request_type()),
            },
        ]
        .try_into()
        .map_err(|_| PoolError::Xdr("request map too large".to_string()))?,
    )));

    let args = vec![
        ScVal::Address(user_address.clone()),
        ScVal::Address(user_address.clone()),
        ScVal::Address(user_address),
        ScVal::Vec(Some(ScVec(
            vec![request]
                .try_into()
                .map_err(|_| PoolError::Xdr("request vector too large".to_string()))?,
        ))),
    ];

    Ok(InvokeHostFunctionOp {
        host_function: HostFunction::InvokeContract(InvokeContractArgs {
            contract_address: ScAddress::Contract(Hash(pool)),
            function_name: ScSymbol(
                SUBMIT_FUNCTION
                    .try_into()
                    .map_err(|_| PoolError::Xdr("function name too long".to_string()))?,
            ),
            args: args
                .try_into()
                .map_err(|_| PoolError::Xdr("too many arguments".to_string()))?,
        }),
        auth: Default::default(),
    })
}

fn symbol(name: &str) -> Result<ScVal, PoolError> {
    Ok(ScVal::Symbol(ScSymbol(name.try_into().map_err(|_| {
        PoolError::Xdr(format!("`{name}` is not a valid symbol"))
    })?)))
}

fn i128_val(value: i128) -> ScVal {
    ScVal::I128(Int128Parts {
        hi: (value >> 64) as i64,
        lo: value as u64,
    })
}

/// Fold a simulation into the transaction: bump the fee by the resource fee,
/// attach the Soroban transaction data, and install the auth entries on the
/// invocation.
fn apply_simulation(tx: &mut Transaction, simulation: &SimulateResponse) -> Result<(), PoolError> {
    if let Some(error) = &simulation.error {
        return Err(PoolError::Simulation(error.clone()));
    }

    let data_xdr = simulation
        .transaction_data
        .as_deref()
        .filter(|data| !data.is_empty())
        .ok_or_else(|| PoolError::Simulation("simulation returned no transaction data".to_string()))?;
    let data = SorobanTransactionData::from_xdr_base64(data_xdr, Limits::none())
        .map_err(|err| PoolError::Xdr(err.to_string()))?;

    let resource_fee: u32 = simulation
        .min_resource_fee
        .as_deref()
        .unwrap_or("0")
        .parse()
        .map_err(|_| PoolError::Simulation("invalid minResourceFee".to_string()))?;
    tx.fee = tx
        .fee
        .checked_add(resource_fee)
        .ok_or_else(|| PoolError::Simulation("resource fee overflow".to_string()))?;
    tx.ext = TransactionExt::V1(data);

    let auth_entries = simulation
        .results
        .as_deref()
        .unwrap_or_default()
        .iter()
        .flat_map(|result| result.auth.iter().flatten())
        .map(|entry| {
            SorobanAuthorizationEntry::from_xdr_base64(entry, Limits::none())
                .map_err(|err| PoolError::Xdr(err.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !auth_entries.is_empty() {
        let mut operations = tx.operations.to_vec();
        if let Some(operation) = operations.first_mut() {
            if let OperationBody::InvokeHostFunction(ref mut invoke) = operation.body {
                invoke.auth = auth_entries
                    .try_into()
                    .map_err(|_| PoolError::Xdr("too many auth entries".to_string()))?;
            }
        }
        tx.operations = operations
            .try_into()
            .map_err(|_| PoolError::Xdr("too many operations".to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_id() -> [u8; 32] {
        [7u8; 32]
    }

    #[test]
    fn request_type_codes_match_the_pool_contract() {
        assert_eq!(CollateralAction::SupplyCollateral.request_type(), 2);
        assert_eq!(CollateralAction::WithdrawCollateral.request_type(), 3);
    }

    #[test]
    fn submit_operation_encodes_the_invocation() {
        let user = [1u8; 32];
        let op = submit_operation(
            user,
            contract_id(),
            [9u8; 32],
            10_000_000,
            CollateralAction::SupplyCollateral,
        )
        .unwrap();

        let HostFunction::InvokeContract(args) = &op.host_function else {
            panic!("expected an invoke-contract host function");
        };
        assert_eq!(args.contract_address, ScAddress::Contract(Hash(contract_id())));
        assert_eq!(args.function_name.0.as_slice(), b"submit");
        assert_eq!(args.args.len(), 4);

        // from == spender == to == the user.
        for arg in &args.args[..3] {
            let ScVal::Address(ScAddress::Account(_)) = arg else {
                panic!("expected an account address argument");
            };
        }

        let ScVal::Vec(Some(requests)) = &args.args[3] else {
            panic!("expected a request vector");
        };
        assert_eq!(requests.0.len(), 1);
        let ScVal::Map(Some(request)) = &requests.0[0] else {
            panic!("expected a request map");
        };
        assert_eq!(request.0.len(), 3);
        assert_eq!(request.0[2].val, ScVal::U32(2));
    }

    #[test]
    fn i128_values_split_into_parts() {
        assert_eq!(
            i128_val(1),
            ScVal::I128(Int128Parts { hi: 0, lo: 1 })
        );
        assert_eq!(
            i128_val((1i128 << 64) + 5),
            ScVal::I128(Int128Parts { hi: 1, lo: 5 })
        );
    }

    #[test]
    fn simulation_errors_are_surfaced() {
        let mut tx = sample_tx();
        let simulation = SimulateResponse {
            error: Some("host function failed".to_string()),
            ..Default::default()
        };
        let err = apply_simulation(&mut tx, &simulation).unwrap_err();
        assert!(matches!(err, PoolError::Simulation(_)));
    }

    #[test]
    fn missing_transaction_data_is_a_simulation_error() {
        let mut tx = sample_tx();
        let err = apply_simulation(&mut tx, &SimulateResponse::default()).unwrap_err();
        assert!(matches!(err, PoolError::Simulation(_)));
    }

    #[test]
    fn simulate_response_parses_rpc_json() {
        let simulation: SimulateResponse = serde_json::from_str(
            r#"{
                "transactionData": "AAAA",
                "minResourceFee": "58181",
                "results": [{"auth": ["BBBB"], "xdr": "CCCC"}],
                "latestLedger": 1234
            }"#,
        )
        .unwrap();
        assert_eq!(simulation.transaction_data.as_deref(), Some("AAAA"));
        assert_eq!(simulation.min_resource_fee.as_deref(), Some("58181"));
        assert_eq!(simulation.results.unwrap()[0].auth.as_ref().unwrap().len(), 1);
        assert!(simulation.error.is_none());
    }

    #[test]
    fn rpc_envelope_needs_only_deserialize_from_its_payload() {
        // Payload types are plain Deserialize; a missing result must still
        // decode as None.
        #[derive(Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            status: String,
        }

        let envelope: RpcEnvelope<Payload> = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "bad params"}}"#,
        )
        .unwrap();
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error.unwrap().code, -32602);
    }

    #[test]
    fn rpc_faults_parse() {
        let envelope: RpcEnvelope<SimulateResponse> = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32600, "message": "bad request"}}"#,
        )
        .unwrap();
        let fault = envelope.error.unwrap();
        assert_eq!(fault.code, -32600);
        assert_eq!(fault.message, "bad request");
    }

    fn sample_tx() -> Transaction {
        let builder = TxBuilder::new(crate::config::DEFAULT_NETWORK_PASSPHRASE);
        let keypair = Keypair::random();
        let op = submit_operation(
            keypair.public_key(),
            contract_id(),
            [9u8; 32],
            1,
            CollateralAction::SupplyCollateral,
        )
        .unwrap();
        builder
            .invoke_contract(keypair.public_key(), 1, op)
            .unwrap()
    }
}
