// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 allowance management for transfer-based actions.

use alloy::primitives::{Address, U256};

use super::retry::{run_with_retry, RetryPolicy};
use super::apply_gas_markup;
use crate::chain::{ChainError, ChainGateway};
use crate::error::ExecuteError;

/// Ensures a spender contract holds sufficient token allowance before a
/// transfer-based action, sharing the executor's gas markup and retry policy.
pub struct AllowanceManager {
    retry: RetryPolicy,
}

impl AllowanceManager {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Make sure `spender` may move at least `amount` of `token` on behalf
    /// of `owner`.
    ///
    /// If the current on-chain allowance already covers the amount this is
    /// an idempotent no-op with zero writes. Otherwise an unlimited approval
    /// is submitted and confirmed under the bounded retry budget; exhaustion
    /// surfaces as [`ExecuteError::ApprovalFailure`] wrapping the last cause.
    pub async fn ensure_allowance(
        &self,
        gateway: &dyn ChainGateway,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), ExecuteError> {
        let current = gateway
            .allowance(token, owner, spender)
            .await
            .map_err(ExecuteError::Precondition)?;

        if current >= amount {
            tracing::debug!(%token, %spender, "allowance already sufficient, skipping approval");
            return Ok(());
        }

        let attempted = run_with_retry(&self.retry, |attempt| async move {
            tracing::debug!(attempt, %token, %spender, "submitting approval");
            let gas_price = apply_gas_markup(gateway.gas_price().await?);
            let tx_hash = gateway
                .submit_approval(token, spender, U256::MAX, gas_price)
                .await?;
            let receipt = gateway.await_receipt(tx_hash).await?;
            if !receipt.success {
                return Err(ChainError::Reverted(format!("{tx_hash:?}")));
            }
            Ok(receipt)
        })
        .await
        .map_err(|f| ExecuteError::ApprovalFailure {
            attempts: f.attempts,
            source: f.last,
        })?;

        tracing::info!(
            tx_hash = ?attempted.value.tx_hash,
            attempts = attempted.attempts,
            %token,
            "approval confirmed"
        );
        Ok(())
    }
}
