// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Execution pipeline: retry policy, per-wallet serialization, allowance
//! management and the transaction executor itself.

pub mod allowance;
pub mod executor;
pub mod locks;
pub mod retry;

pub use allowance::AllowanceManager;
pub use executor::TransactionExecutor;
pub use locks::WalletLocks;
pub use retry::{run_with_retry, Attempted, RetryFailure, RetryPolicy};

/// Gas price markup applied to the node's suggested price (5%), reducing the
/// chance of a transaction staying unconfirmed due to underpricing.
pub const GAS_MARKUP_PERCENT: u128 = 5;

/// Apply the fixed markup to a suggested gas price. Never returns less than
/// the suggested price; overflow saturates at `u128::MAX`.
pub fn apply_gas_markup(suggested: u128) -> u128 {
    suggested
        .checked_mul(100 + GAS_MARKUP_PERCENT)
        .map(|v| v / 100)
        .unwrap_or(u128::MAX)
}
