// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational DeFi - Custodial Execution Core
//!
//! This crate executes DeFi actions (Aave v3 supply) on behalf of custodial
//! identities: signing keys are sealed with authenticated encryption, each
//! action runs through balance preconditions, allowance management and a
//! bounded retry budget, and every confirmed transaction is appended to an
//! immutable ledger.
//!
//! ## Modules
//!
//! - `vault` - Sealing and unsealing of signing keys (AES-256-GCM)
//! - `wallet` - Key generation and address derivation
//! - `chain` - Ethereum/Aave integration behind the `ChainGateway` seam
//! - `exec` - Retry policy, per-wallet locks, allowances, the executor
//! - `ledger` - Append-only transaction persistence (redb)

pub mod chain;
pub mod config;
pub mod error;
pub mod exec;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod vault;
pub mod wallet;
