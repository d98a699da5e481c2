// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity records and the verification boundary.
//!
//! Identity verification (API-key lookup, registration, email flows) lives in
//! an external collaborator; this crate only consumes the [`IdentityVerifier`]
//! trait. The [`Identity`] record carries exactly the fields the execution
//! core's invariants need.

use alloy::primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ExecuteError;
use crate::vault::EncryptedSecret;

/// A verified user with a provisioned custodial wallet.
///
/// The wallet address is derived once at provisioning and never changes.
/// `encrypted_key` is opaque to every component except the vault; password
/// and API-key fields hold verifier digests, never the raw credentials.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Unique identity id
    pub id: Uuid,
    /// Unique email address
    pub email: String,
    /// Password verifier (hashed by the auth collaborator)
    pub password_hash: String,
    /// Public wallet address, immutable after provisioning
    pub wallet_address: Address,
    /// Sealed signing key, opaque outside the vault
    pub encrypted_key: EncryptedSecret,
    /// API-key verifier digest (see [`api_key_digest`])
    pub api_key_hash: String,
    /// When the identity was activated
    pub created_at: DateTime<Utc>,
}

/// External identity-verification collaborator.
///
/// Consumed, not implemented, by this crate: the executor calls `verify`
/// before touching any key material.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve an API key to its identity.
    ///
    /// Fails with [`ExecuteError::NotFound`] for unknown keys.
    async fn verify(&self, api_key: &str) -> Result<Identity, ExecuteError>;
}

/// SHA-256 digest of an API key, hex encoded.
///
/// Stored as the identity's `api_key_hash` so the raw key never persists.
pub fn api_key_digest(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    alloy::hex::encode(digest)
}
