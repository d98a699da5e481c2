// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provisioning: keypair generation and address derivation.
//!
//! Provisioning is pure and synchronous; it performs no network calls. The
//! caller is responsible for sealing the returned key material with the
//! [`crate::vault::KeyVault`] and persisting only the sealed blob plus the
//! derived address. Raw key material must not outlive that hand-off.

use alloy::primitives::{keccak256, Address};
use alloy::signers::local::PrivateKeySigner;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;

use crate::chain::ChainError;
use crate::vault::SecretBytes;

/// A freshly generated custodial wallet.
///
/// `key` zeroizes on drop; the address is derived once here and is immutable
/// for the lifetime of the owning identity.
pub struct ProvisionedWallet {
    /// Ethereum-style address derived from the public key
    pub address: Address,
    /// Raw secp256k1 private key (32 bytes), to be sealed by the vault
    pub key: SecretBytes,
}

/// Generates custodial keypairs from OS entropy.
pub struct WalletProvisioner;

impl WalletProvisioner {
    /// Generate a secp256k1 keypair and derive its Ethereum address.
    ///
    /// Address derivation follows the standard scheme: keccak256 of the
    /// uncompressed public key (without the 0x04 prefix), last 20 bytes.
    pub fn provision(&self) -> ProvisionedWallet {
        let signing_key = SigningKey::random(&mut OsRng);
        let address = derive_address(&signing_key);

        ProvisionedWallet {
            address,
            key: SecretBytes::new(signing_key.to_bytes().to_vec()),
        }
    }
}

fn derive_address(signing_key: &SigningKey) -> Address {
    let public_key = signing_key.verifying_key().to_encoded_point(false);
    // Skip the 0x04 prefix; hash the 64 bytes of x,y coordinates.
    let hash = keccak256(&public_key.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Rebuild a chain signer from decrypted key material.
///
/// Fails with [`ChainError::InvalidPrivateKey`] if the bytes are not a valid
/// secp256k1 scalar; the message carries no key-dependent detail.
pub fn signer_from_key(key: &SecretBytes) -> Result<PrivateKeySigner, ChainError> {
    PrivateKeySigner::from_slice(key.expose())
        .map_err(|_| ChainError::InvalidPrivateKey("not a valid secp256k1 key".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn provision_produces_valid_ethereum_address() {
        let wallet = WalletProvisioner.provision();

        let hex = format!("{:#x}", wallet.address);
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 42, "Ethereum address must be 42 characters");
        assert_eq!(wallet.key.expose().len(), 32);
    }

    #[test]
    fn provision_produces_unique_addresses() {
        let mut addresses = HashSet::new();
        for _ in 0..10 {
            let wallet = WalletProvisioner.provision();
            assert!(addresses.insert(wallet.address), "duplicate address");
        }
    }

    #[test]
    fn signer_rebuilt_from_key_matches_derived_address() {
        let wallet = WalletProvisioner.provision();
        let signer = signer_from_key(&wallet.key).unwrap();
        assert_eq!(signer.address(), wallet.address);
    }

    #[test]
    fn malformed_key_material_is_rejected() {
        let short = SecretBytes::new(vec![1, 2, 3]);
        assert!(matches!(
            signer_from_key(&short),
            Err(ChainError::InvalidPrivateKey(_))
        ));

        // All-zero bytes are not a valid scalar either.
        let zero = SecretBytes::new(vec![0u8; 32]);
        assert!(matches!(
            signer_from_key(&zero),
            Err(ChainError::InvalidPrivateKey(_))
        ));
    }
}
