// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Transaction building and signing.
//!
//! Every operation this service submits is a single-operation transaction
//! built here: payments, trustline changes, and the Soroban invocation the
//! pool client prepares. Amounts are parsed from decimal strings straight to
//! stroops (7 decimal places) so no floating point touches money.

use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    AccountId, AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, ChangeTrustAsset,
    ChangeTrustOp, DecoratedSignature, Hash, InvokeHostFunctionOp, Limits, Memo, MuxedAccount,
    Operation, OperationBody, PaymentOp, Preconditions, PublicKey, SequenceNumber, Signature,
    SignatureHint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV1Envelope, Uint256, WriteXdr,
};

use super::keys::{parse_account_id, Keypair};
use super::LedgerError;

/// Fee per operation in stroops.
pub const BASE_FEE: u32 = 100;

/// Stroops per whole asset unit (7 decimal places).
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// A signed, submittable transaction.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Network transaction hash (hex).
    pub hash: String,
    /// Base64-encoded envelope XDR.
    pub envelope_xdr: String,
}

/// Builds and signs transactions for one network (identified by its
/// passphrase). Constructed once at startup from the service config.
#[derive(Clone)]
pub struct TxBuilder {
    network_id: Hash,
}

impl TxBuilder {
    pub fn new(network_passphrase: &str) -> Self {
        Self {
            network_id: Hash(Sha256::digest(network_passphrase.as_bytes()).into()),
        }
    }

    /// A payment of `amount` stroops of `asset` to `destination`.
    pub fn payment(
        &self,
        source: [u8; 32],
        sequence: i64,
        destination: [u8; 32],
        asset: Asset,
        amount: i64,
        memo: Option<&str>,
    ) -> Result<Transaction, LedgerError> {
        let operation = Operation {
            source_account: None,
            body: OperationBody::Payment(PaymentOp {
                destination: MuxedAccount::Ed25519(Uint256(destination)),
                asset,
                amount,
            }),
        };
        self.transaction(source, sequence, text_memo(memo)?, vec![operation])
    }

    /// A change-trust operation opening (or resizing) a trustline.
    pub fn change_trust(
        &self,
        source: [u8; 32],
        sequence: i64,
        line: ChangeTrustAsset,
        limit: i64,
    ) -> Result<Transaction, LedgerError> {
        let operation = Operation {
            source_account: None,
            body: OperationBody::ChangeTrust(ChangeTrustOp { line, limit }),
        };
        self.transaction(source, sequence, Memo::None, vec![operation])
    }

    /// A Soroban host-function invocation (the pool client prepares the op).
    pub fn invoke_contract(
        &self,
        source: [u8; 32],
        sequence: i64,
        operation: InvokeHostFunctionOp,
    ) -> Result<Transaction, LedgerError> {
        let operation = Operation {
            source_account: None,
            body: OperationBody::InvokeHostFunction(operation),
        };
        self.transaction(source, sequence, Memo::None, vec![operation])
    }

    fn transaction(
        &self,
        source: [u8; 32],
        sequence: i64,
        memo: Memo,
        operations: Vec<Operation>,
    ) -> Result<Transaction, LedgerError> {
        let next_sequence = sequence
            .checked_add(1)
            .ok_or_else(|| LedgerError::Xdr("sequence number overflow".to_string()))?;
        let fee = BASE_FEE * operations.len() as u32;

        Ok(Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(source)),
            fee,
            seq_num: SequenceNumber(next_sequence),
            cond: Preconditions::None,
            memo,
            operations: operations
                .try_into()
                .map_err(|_| LedgerError::Xdr("too many operations".to_string()))?,
            ext: TransactionExt::V0,
        })
    }

    /// The network hash of a transaction (what actually gets signed).
    pub fn hash(&self, tx: &Transaction) -> Result<[u8; 32], LedgerError> {
        let payload = TransactionSignaturePayload {
            network_id: self.network_id.clone(),
            tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
        };
        let bytes = payload.to_xdr(Limits::none()).map_err(xdr_error)?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// Sign a transaction and wrap it in a v1 envelope.
    pub fn sign(
        &self,
        tx: &Transaction,
        keypair: &Keypair,
    ) -> Result<SignedTransaction, LedgerError> {
        let digest = self.hash(tx)?;
        let signature = DecoratedSignature {
            hint: SignatureHint(keypair.hint()),
            signature: Signature(
                keypair
                    .sign(&digest)
                    .to_vec()
                    .try_into()
                    .map_err(|_| LedgerError::Xdr("signature length".to_string()))?,
            ),
        };
        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: tx.clone(),
            signatures: vec![signature]
                .try_into()
                .map_err(|_| LedgerError::Xdr("too many signatures".to_string()))?,
        });

        Ok(SignedTransaction {
            hash: hex::encode(digest),
            envelope_xdr: envelope.to_xdr_base64(Limits::none()).map_err(xdr_error)?,
        })
    }
}

/// Parse an asset from its code and issuer.
pub fn parse_asset(code: &str, issuer: &str) -> Result<Asset, LedgerError> {
    validate_asset_code(code)?;
    let issuer = AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(parse_account_id(
        issuer,
    )?)));

    if code.len() <= 4 {
        let mut buf = [0u8; 4];
        buf[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(buf),
            issuer,
        }))
    } else {
        let mut buf = [0u8; 12];
        buf[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Asset::CreditAlphanum12(AlphaNum12 {
            asset_code: AssetCode12(buf),
            issuer,
        }))
    }
}

/// The change-trust flavor of an asset.
pub fn change_trust_line(asset: Asset) -> ChangeTrustAsset {
    match asset {
        Asset::Native => ChangeTrustAsset::Native,
        Asset::CreditAlphanum4(inner) => ChangeTrustAsset::CreditAlphanum4(inner),
        Asset::CreditAlphanum12(inner) => ChangeTrustAsset::CreditAlphanum12(inner),
    }
}

/// Parse a positive decimal amount string into stroops.
pub fn parse_amount(raw: &str) -> Result<i64, LedgerError> {
    let invalid = || LedgerError::InvalidAmount(format!("`{raw}` is not a valid amount"));

    let trimmed = raw.trim();
    let (whole_raw, frac_raw) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    if whole_raw.is_empty() && frac_raw.is_empty() {
        return Err(invalid());
    }
    if !whole_raw.bytes().all(|b| b.is_ascii_digit())
        || !frac_raw.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    if frac_raw.len() > 7 {
        return Err(LedgerError::InvalidAmount(format!(
            "`{raw}` has more than 7 decimal places"
        )));
    }

    let whole: i64 = if whole_raw.is_empty() {
        0
    } else {
        whole_raw.parse().map_err(|_| invalid())?
    };
    let frac: i64 = format!("{frac_raw:0<7}").parse().map_err(|_| invalid())?;

    let stroops = whole
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|value| value.checked_add(frac))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("`{raw}` is too large")))?;

    if stroops == 0 {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(stroops)
}

fn validate_asset_code(code: &str) -> Result<(), LedgerError> {
    let valid = (1..=12).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidAsset(format!(
            "`{code}` is not a valid asset code (1-12 alphanumeric characters)"
        )))
    }
}

fn text_memo(text: Option<&str>) -> Result<Memo, LedgerError> {
    match text {
        None => Ok(Memo::None),
        Some(text) => Ok(Memo::Text(
            text.as_bytes()
                .to_vec()
                .try_into()
                .map_err(|_| LedgerError::InvalidMemo("text memos are limited to 28 bytes".to_string()))?,
        )),
    }
}

fn xdr_error(err: stellar_xdr::curr::Error) -> LedgerError {
    LedgerError::Xdr(err.to_string())
}
