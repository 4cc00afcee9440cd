// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Session keypairs and strkey parsing.
//!
//! Every session gets a fresh ed25519 keypair held in memory for its
//! lifetime. Keys are disposable testnet keys; only the 32-byte seed is
//! stored so a [`Keypair`] can be rebuilt on each use.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use super::LedgerError;

/// An ed25519 keypair for one session.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh random keypair.
    pub fn random() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from a stored seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// The seed to persist in the session store.
    pub fn seed(&self) -> [u8; 32] {
        self.signing.to_bytes()
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// The account id in strkey form (G...).
    pub fn account_id(&self) -> String {
        stellar_strkey::ed25519::PublicKey(self.public_key()).to_string()
    }

    /// Signature hint: the last four bytes of the public key, attached to
    /// each decorated signature so validators can match it to a signer.
    pub fn hint(&self) -> [u8; 4] {
        let public = self.public_key();
        [public[28], public[29], public[30], public[31]]
    }

    /// Sign a message (for transactions, the envelope hash).
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

/// Parse a G... account address into raw public key bytes.
pub fn parse_account_id(address: &str) -> Result<[u8; 32], LedgerError> {
    stellar_strkey::ed25519::PublicKey::from_string(address)
        .map(|key| key.0)
        .map_err(|_| LedgerError::InvalidAddress(address.to_string()))
}

/// Parse a C... contract address into its raw 32-byte id.
pub fn parse_contract_id(address: &str) -> Result<[u8; 32], LedgerError> {
    stellar_strkey::Contract::from_string(address)
        .map(|contract| contract.0)
        .map_err(|_| LedgerError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_round_trips() {
        let keypair = Keypair::random();
        let rebuilt = Keypair::from_seed(keypair.seed());
        assert_eq!(keypair.public_key(), rebuilt.public_key());
        assert_eq!(keypair.account_id(), rebuilt.account_id());
    }

    #[test]
    fn account_id_parses_back_to_public_key() {
        let keypair = Keypair::random();
        let parsed = parse_account_id(&keypair.account_id()).unwrap();
        assert_eq!(parsed, keypair.public_key());
    }

    #[test]
    fn account_id_is_strkey_shaped() {
        let keypair = Keypair::random();
        let account_id = keypair.account_id();
        assert!(account_id.starts_with('G'));
        assert_eq!(account_id.len(), 56);
    }

    #[test]
    fn hint_is_key_tail() {
        let keypair = Keypair::random();
        let public = keypair.public_key();
        assert_eq!(&keypair.hint()[..], &public[28..32]);
    }

    #[test]
    fn garbage_addresses_are_rejected() {
        assert!(parse_account_id("not-an-address").is_err());
        assert!(parse_account_id("").is_err());
        // A contract address is not an account address.
        assert!(parse_account_id(
            "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC"
        )
        .is_err());
    }

    #[test]
    fn contract_addresses_parse() {
        // The testnet XLM Stellar Asset Contract address.
        let parsed =
            parse_contract_id("CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC");
        assert!(parsed.is_ok());
    }
}
