// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The blockchain RPC boundary as an explicit interface.
//!
//! The executor and allowance manager only ever talk to [`ChainGateway`];
//! the production implementation lives in [`super::aave`]. Error variants
//! carry their transient/fatal classification via [`ChainError::is_transient`],
//! which is what the retry loop consults.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use super::types::TokenKind;

/// Errors crossing the chain boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Transport or node failure (connection, timeout, 5xx). Transient.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Read-only contract call failure. Transient.
    #[error("contract call error: {0}")]
    Contract(String),

    /// The node rejected the transaction up front (validation, nonce,
    /// signature, insufficient funds revealed on-chain). Fatal.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was mined but reverted. Fatal.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// No receipt appeared within the confirmation window. Transient; the
    /// broadcast transaction may still land, so callers must not assume it
    /// was dropped.
    #[error("confirmation timed out for {0}")]
    ConfirmationTimeout(String),
}

impl ChainError {
    /// Whether the retry loop may try again after this failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChainError::Rpc(_) | ChainError::Contract(_) | ChainError::ConfirmationTimeout(_)
        )
    }
}

/// Confirmation receipt for a submitted transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Transaction hash (0x prefixed)
    pub tx_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: u64,
    /// Whether the transaction succeeded on-chain
    pub success: bool,
}

/// A chain connection bound to one signer and one network.
///
/// Submissions consume the signer's address nonce; concurrent use for the
/// same signer must be serialized by the caller (the executor holds a
/// per-wallet lock).
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Current suggested gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Native-asset balance of an address.
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    /// ERC-20 balance of an address.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    /// Current ERC-20 spending allowance for (owner, spender).
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError>;

    /// Resolve the lending pool address (the approval spender).
    async fn pool_address(&self) -> Result<Address, ChainError>;

    /// Submit an ERC-20 `approve(spender, amount)` transaction.
    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        gas_price: u128,
    ) -> Result<TxHash, ChainError>;

    /// Submit a supply transaction for the given asset.
    async fn submit_supply(
        &self,
        asset: TokenKind,
        amount: U256,
        on_behalf_of: Address,
        gas_price: u128,
    ) -> Result<TxHash, ChainError>;

    /// Await on-chain confirmation of a submitted transaction.
    async fn await_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ChainError>;
}

/// Builds a [`ChainGateway`] bound to a freshly decrypted signer.
///
/// Constructor-style injection point: production wires
/// [`super::aave::AaveGatewayFactory`]; tests substitute a scripted mock.
pub trait ChainGatewayFactory: Send + Sync {
    fn bind(
        &self,
        signer: alloy::signers::local::PrivateKeySigner,
    ) -> Result<std::sync::Arc<dyn ChainGateway>, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_timeout_failures_are_transient() {
        assert!(ChainError::Rpc("connection reset".into()).is_transient());
        assert!(ChainError::Contract("eth_call failed".into()).is_transient());
        assert!(ChainError::ConfirmationTimeout("0xabc".into()).is_transient());
    }

    #[test]
    fn validation_failures_are_fatal() {
        assert!(!ChainError::Rejected("insufficient funds".into()).is_transient());
        assert!(!ChainError::Reverted("0xabc".into()).is_transient());
        assert!(!ChainError::InvalidPrivateKey("bad scalar".into()).is_transient());
        assert!(!ChainError::InvalidAmount("1.2.3".into()).is_transient());
    }
}
