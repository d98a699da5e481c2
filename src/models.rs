// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Core data model: actions, results and ledger records.

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// DeFi protocol an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Aave,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Aave => "aave",
        }
    }
}

/// Kind of on-chain operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Deposit a token into the lending pool
    Supply,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Supply => "supply",
        }
    }
}

/// An intended on-chain operation, immutable once built.
///
/// `amount` is in the token's native unit count (wei for ETH, 1e6 units for
/// USDC); use [`crate::chain::units::parse_amount`] to convert from a
/// human-readable decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Operation kind
    pub kind: ActionKind,
    /// Token symbol, resolved against the network's token registry
    pub token: String,
    /// Amount in the token's smallest unit
    pub amount: U256,
    /// Owning identity
    pub identity_id: Uuid,
}

impl Action {
    /// Build a supply action.
    pub fn supply(token: impl Into<String>, amount: U256, identity_id: Uuid) -> Self {
        Self {
            kind: ActionKind::Supply,
            token: token.into(),
            amount,
            identity_id,
        }
    }
}

/// Outcome of a confirmed action, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    /// On-chain transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Protocol tag
    pub protocol: Protocol,
    /// Action kind
    pub kind: ActionKind,
    /// Token symbol
    pub token: String,
    /// Human-readable amount (decimal string)
    pub amount: String,
}

/// Durable, append-only record of an executed action.
///
/// Created at most once per successfully submitted action and never mutated
/// afterwards. A failure before submission produces no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// On-chain transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Protocol tag
    pub protocol: Protocol,
    /// Action kind
    pub kind: ActionKind,
    /// Token symbol
    pub token: String,
    /// Human-readable amount (decimal string)
    pub amount: String,
    /// Whether the transaction succeeded on-chain
    pub success: bool,
    /// When the record was written
    pub created_at: DateTime<Utc>,
    /// Owning identity
    pub identity_id: Uuid,
}

impl TransactionRecord {
    /// Build the ledger record for a confirmed result.
    pub fn confirmed(result: &TransactionResult, identity_id: Uuid) -> Self {
        Self {
            tx_hash: result.tx_hash.clone(),
            protocol: result.protocol,
            kind: result.kind,
            token: result.token.clone(),
            amount: result.amount.clone(),
            success: true,
            created_at: Utc::now(),
            identity_id,
        }
    }
}
