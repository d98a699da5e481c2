// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for the execution core.
//!
//! Every externally surfaced error carries a stable [`ErrorKind`] tag so an
//! HTTP layer (or any other caller) can map failures to responses without
//! inspecting free-text messages. Messages never contain key material or
//! decrypted plaintext.

use crate::chain::ChainError;
use crate::ledger::LedgerError;
use crate::vault::VaultError;

/// Stable machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or inconsistent input
    Validation,
    /// Balance precondition failed before any network write
    InsufficientFunds,
    /// Allowance approval exhausted its retry budget
    ApprovalFailure,
    /// Action submission/confirmation exhausted its retry budget or hit a
    /// fatal on-chain error
    SubmissionFailure,
    /// Decryption tag mismatch or tampered key material
    Integrity,
    /// Master key absent or malformed at startup
    KeyUnavailable,
    /// Unknown identity or token
    NotFound,
    /// Failure outside the defined taxonomy (ledger write, precondition RPC)
    Internal,
}

impl ErrorKind {
    /// Tag string for wire representations and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::ApprovalFailure => "approval_failure",
            ErrorKind::SubmissionFailure => "submission_failure",
            ErrorKind::Integrity => "integrity",
            ErrorKind::KeyUnavailable => "key_unavailable",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Failure of a single custodial execution, from precondition checks through
/// ledger recording.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("not enough balance for requested supply amount")]
    InsufficientFunds,

    #[error("token approval failed after {attempts} attempts")]
    ApprovalFailure {
        attempts: u32,
        #[source]
        source: ChainError,
    },

    #[error("transaction submission failed after {attempts} attempts")]
    SubmissionFailure {
        attempts: u32,
        #[source]
        source: ChainError,
    },

    /// Tag verification failed, or the decrypted material is not a valid
    /// signing key. Deliberately carries no detail.
    #[error("encrypted signing key failed integrity check")]
    Integrity,

    #[error("master key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    /// RPC failure while reading preconditions (balance, allowance, pool
    /// resolution). Nothing was submitted.
    #[error("precondition query failed")]
    Precondition(#[source] ChainError),

    /// The action confirmed on-chain but the ledger write failed. The
    /// transaction hash is preserved for reconciliation.
    #[error("ledger write failed for confirmed transaction {tx_hash}")]
    LedgerWrite {
        tx_hash: String,
        #[source]
        source: LedgerError,
    },
}

impl ExecuteError {
    /// Stable category tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecuteError::Validation(_) => ErrorKind::Validation,
            ExecuteError::InsufficientFunds => ErrorKind::InsufficientFunds,
            ExecuteError::ApprovalFailure { .. } => ErrorKind::ApprovalFailure,
            ExecuteError::SubmissionFailure { .. } => ErrorKind::SubmissionFailure,
            ExecuteError::Integrity => ErrorKind::Integrity,
            ExecuteError::KeyUnavailable(_) => ErrorKind::KeyUnavailable,
            ExecuteError::NotFound(_) => ErrorKind::NotFound,
            ExecuteError::Precondition(_) | ExecuteError::LedgerWrite { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<VaultError> for ExecuteError {
    fn from(e: VaultError) -> Self {
        match e {
            VaultError::KeyUnavailable(msg) => ExecuteError::KeyUnavailable(msg),
            VaultError::Integrity | VaultError::Cipher => ExecuteError::Integrity,
        }
    }
}
