// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key vault: authenticated encryption of signing-key material at rest.
//!
//! Keys are sealed with AES-256-GCM under a single process-wide master key
//! that is injected at construction and validated once. The nonce is freshly
//! random per encryption; the 16-byte GCM tag is stored separately so that
//! tag verification failures are distinguishable from malformed blobs.
//!
//! No code path in this module logs or formats plaintext or the master key.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Master key length in bytes (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Errors from vault operations.
///
/// Variants are deliberately sparse: a tag mismatch, a truncated blob and a
/// wrong-key decryption all surface as [`VaultError::Integrity`] with no
/// further detail.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The master key is absent or malformed. Raised at construction only;
    /// the vault never lazily retries key loading.
    #[error("master key unavailable: {0}")]
    KeyUnavailable(String),

    /// Tag verification failed or the blob is malformed.
    #[error("integrity check failed")]
    Integrity,

    /// The cipher itself rejected the operation (plaintext too large).
    #[error("cipher operation failed")]
    Cipher,
}

/// The process-wide master secret, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    /// Parse a master key from its hex representation (64 hex characters).
    ///
    /// The error message reports only the structural problem, never any part
    /// of the supplied value.
    pub fn from_hex(hex: &str) -> Result<Self, VaultError> {
        let bytes = alloy::hex::decode(hex.trim())
            .map_err(|_| VaultError::KeyUnavailable("master key is not valid hex".into()))?;
        Self::from_bytes(&bytes)
    }

    /// Build a master key from raw bytes; must be exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        let array: [u8; MASTER_KEY_LEN] = bytes.try_into().map_err(|_| {
            VaultError::KeyUnavailable(format!(
                "master key must be {MASTER_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Decrypted secret material, zeroized on drop.
///
/// Callers borrow the bytes via [`SecretBytes::expose`] and must not copy
/// them out beyond the stack frame that needs them.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretBytes(..)")
    }
}

/// A sealed secret: nonce, ciphertext and authentication tag.
///
/// Opaque to every component except the vault. The nonce is unique per
/// encryption call for the lifetime of the master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// Fresh random nonce used for this encryption
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted payload (same length as the plaintext)
    pub ciphertext: Vec<u8>,
    /// GCM authentication tag, verified before any plaintext is released
    pub tag: [u8; TAG_LEN],
}

/// AES-256-GCM vault bound to the process master key.
pub struct KeyVault {
    cipher: Aes256Gcm,
}

impl KeyVault {
    /// Build a vault from a validated master key.
    pub fn new(master: &MasterKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(master.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Seal plaintext under the master key with a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedSecret, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let mut sealed = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: &[],
                },
            )
            .map_err(|_| VaultError::Cipher)?;

        // aes-gcm appends the tag to the ciphertext; store it separately.
        if sealed.len() < TAG_LEN {
            return Err(VaultError::Cipher);
        }
        let tag_start = sealed.len() - TAG_LEN;
        let tag: [u8; TAG_LEN] = sealed[tag_start..]
            .try_into()
            .map_err(|_| VaultError::Cipher)?;
        sealed.truncate(tag_start);

        Ok(EncryptedSecret {
            nonce: nonce.into(),
            ciphertext: sealed,
            tag,
        })
    }

    /// Verify the tag and return the plaintext.
    ///
    /// The tag is checked before a single byte of plaintext is released;
    /// any mismatch or malformed input yields [`VaultError::Integrity`].
    pub fn decrypt(&self, secret: &EncryptedSecret) -> Result<SecretBytes, VaultError> {
        let nonce = Nonce::from_slice(&secret.nonce);

        let mut sealed = Vec::with_capacity(secret.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&secret.ciphertext);
        sealed.extend_from_slice(&secret.tag);

        let plaintext = self
            .cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &sealed,
                    aad: &[],
                },
            )
            .map_err(|_| VaultError::Integrity)?;

        Ok(SecretBytes::new(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_vault() -> KeyVault {
        let master = MasterKey::from_bytes(&[7u8; MASTER_KEY_LEN]).unwrap();
        KeyVault::new(&master)
    }

    #[test]
    fn roundtrip_restores_plaintext() {
        let vault = test_vault();
        let sealed = vault.encrypt(b"a1b2c3").unwrap();
        let plain = vault.decrypt(&sealed).unwrap();
        assert_eq!(plain.expose(), b"a1b2c3");
    }

    #[test]
    fn roundtrip_handles_empty_and_binary_payloads() {
        let vault = test_vault();
        for payload in [&b""[..], &[0u8, 1, 2, 255, 254][..]] {
            let sealed = vault.encrypt(payload).unwrap();
            assert_eq!(vault.decrypt(&sealed).unwrap().expose(), payload);
        }
    }

    #[test]
    fn flipping_any_ciphertext_bit_is_detected() {
        let vault = test_vault();
        let sealed = vault.encrypt(b"supply-key-material").unwrap();

        for byte in 0..sealed.ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.ciphertext[byte] ^= 1 << bit;
                assert!(
                    matches!(vault.decrypt(&tampered), Err(VaultError::Integrity)),
                    "bit {bit} of ciphertext byte {byte} not detected"
                );
            }
        }
    }

    #[test]
    fn flipping_any_tag_bit_is_detected() {
        let vault = test_vault();
        let sealed = vault.encrypt(b"supply-key-material").unwrap();

        for byte in 0..TAG_LEN {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.tag[byte] ^= 1 << bit;
                assert!(
                    matches!(vault.decrypt(&tampered), Err(VaultError::Integrity)),
                    "bit {bit} of tag byte {byte} not detected"
                );
            }
        }
    }

    #[test]
    fn decrypt_with_wrong_key_fails_closed() {
        let vault = test_vault();
        let sealed = vault.encrypt(b"secret").unwrap();

        let other = KeyVault::new(&MasterKey::from_bytes(&[8u8; MASTER_KEY_LEN]).unwrap());
        assert!(matches!(other.decrypt(&sealed), Err(VaultError::Integrity)));
    }

    #[test]
    fn nonces_are_pairwise_distinct_across_many_calls() {
        let vault = test_vault();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let sealed = vault.encrypt(b"x").unwrap();
            assert!(seen.insert(sealed.nonce), "nonce reused");
        }
    }

    #[test]
    fn master_key_rejects_malformed_input() {
        assert!(matches!(
            MasterKey::from_hex("not-hex"),
            Err(VaultError::KeyUnavailable(_))
        ));
        assert!(matches!(
            MasterKey::from_hex("abcd"),
            Err(VaultError::KeyUnavailable(_))
        ));
        let ok = MasterKey::from_hex(&"ab".repeat(MASTER_KEY_LEN));
        assert!(ok.is_ok());
    }

    #[test]
    fn key_unavailable_message_reports_structure_only() {
        let err = MasterKey::from_bytes(&[0u8; 16]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("32 bytes"));
        assert!(!msg.contains("00"), "message must not echo key bytes");
    }

    #[test]
    fn secret_types_do_not_leak_via_debug() {
        let master = MasterKey::from_bytes(&[9u8; MASTER_KEY_LEN]).unwrap();
        assert_eq!(format!("{master:?}"), "MasterKey(..)");
        let secret = SecretBytes::new(vec![1, 2, 3]);
        assert_eq!(format!("{secret:?}"), "SecretBytes(..)");
    }

    #[test]
    fn encrypted_secret_serde_roundtrip() {
        let vault = test_vault();
        let sealed = vault.encrypt(b"persist me").unwrap();
        let json = serde_json::to_string(&sealed).unwrap();
        let back: EncryptedSecret = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sealed);
        assert_eq!(vault.decrypt(&back).unwrap().expose(), b"persist me");
    }
}
