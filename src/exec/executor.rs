// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The transaction executor: one custodial on-chain action, end to end.
//!
//! Per action: verify the caller, unseal the signing key, check the balance
//! precondition, ensure allowance for ERC-20 assets, submit with marked-up
//! gas under the bounded retry budget, await confirmation, and append the
//! outcome to the ledger exactly once.
//!
//! State machine per action:
//! `Init → BalanceChecked → [AllowanceEnsured] → Submitted ⇄(retry) →
//! Confirmed → Recorded`, with terminal failures for insufficient funds,
//! approval exhaustion and submission exhaustion. Retrying happens only
//! inside the submission stage.

use std::sync::Arc;

use crate::chain::units::format_amount;
use crate::chain::{ChainError, ChainGatewayFactory, NetworkConfig, TokenKind};
use crate::error::ExecuteError;
use crate::exec::allowance::AllowanceManager;
use crate::exec::apply_gas_markup;
use crate::exec::locks::WalletLocks;
use crate::exec::retry::{run_with_retry, RetryPolicy};
use crate::identity::{Identity, IdentityVerifier};
use crate::ledger::TransactionLedger;
use crate::models::{Action, Protocol, TransactionRecord, TransactionResult};
use crate::vault::KeyVault;
use crate::wallet::signer_from_key;

/// Orchestrates custodial on-chain actions.
///
/// Dependencies are injected at construction; there is no global state. The
/// executor is cheap to share behind an `Arc` and safe to call concurrently:
/// actions for different wallets proceed in parallel, actions for the same
/// wallet queue on its lock.
pub struct TransactionExecutor {
    network: NetworkConfig,
    vault: Arc<KeyVault>,
    verifier: Arc<dyn IdentityVerifier>,
    gateways: Arc<dyn ChainGatewayFactory>,
    ledger: Arc<dyn TransactionLedger>,
    allowance: AllowanceManager,
    locks: WalletLocks,
    retry: RetryPolicy,
}

impl TransactionExecutor {
    pub fn new(
        network: NetworkConfig,
        vault: Arc<KeyVault>,
        verifier: Arc<dyn IdentityVerifier>,
        gateways: Arc<dyn ChainGatewayFactory>,
        ledger: Arc<dyn TransactionLedger>,
    ) -> Self {
        let retry = RetryPolicy::default();
        Self {
            network,
            vault,
            verifier,
            gateways,
            ledger,
            allowance: AllowanceManager::new(retry.clone()),
            locks: WalletLocks::new(),
            retry,
        }
    }

    /// Override the submission retry policy (shared with approvals).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.allowance = AllowanceManager::new(retry.clone());
        self.retry = retry;
        self
    }

    /// Execute one on-chain action on behalf of `identity`.
    ///
    /// The balance precondition short-circuits before any network write and
    /// does not consume the retry budget. On success exactly one
    /// [`TransactionRecord`] is appended to the ledger.
    pub async fn execute(
        &self,
        action: Action,
        identity: &Identity,
        api_key: &str,
    ) -> Result<TransactionResult, ExecuteError> {
        // Caller verification is delegated to the external collaborator; the
        // resolved identity must be the one the action targets.
        let verified = self.verifier.verify(api_key).await?;
        if verified.id != identity.id {
            return Err(ExecuteError::Validation(
                "API key does not belong to this identity".into(),
            ));
        }
        if action.identity_id != identity.id {
            return Err(ExecuteError::Validation(
                "action owner does not match identity".into(),
            ));
        }
        if action.amount.is_zero() {
            return Err(ExecuteError::Validation("amount must be positive".into()));
        }

        let token = self
            .network
            .token(&action.token)
            .ok_or_else(|| ExecuteError::NotFound(format!("token {}", action.token)))?;

        // Unseal the signing key only now, and keep it alive just long
        // enough to build the signer.
        let signer = {
            let key = self.vault.decrypt(&identity.encrypted_key)?;
            signer_from_key(&key).map_err(|_| ExecuteError::Integrity)?
        };
        if signer.address() != identity.wallet_address {
            // The blob decrypted cleanly but belongs to a different wallet.
            return Err(ExecuteError::Integrity);
        }

        let gateway = self
            .gateways
            .bind(signer)
            .map_err(ExecuteError::Precondition)?;

        let owner = identity.wallet_address;
        let balance = match token.kind {
            TokenKind::Native => gateway.native_balance(owner).await,
            TokenKind::Erc20(contract) => gateway.token_balance(contract, owner).await,
        }
        .map_err(ExecuteError::Precondition)?;

        if balance < action.amount {
            tracing::debug!(
                identity = %identity.id,
                token = token.symbol,
                "balance below requested amount, rejecting before submission"
            );
            return Err(ExecuteError::InsufficientFunds);
        }

        // Everything from allowance through confirmation runs under the
        // wallet's lock: submissions consume the address nonce in order.
        let _guard = self.locks.acquire(owner).await;

        if let TokenKind::Erc20(contract) = token.kind {
            let spender = gateway
                .pool_address()
                .await
                .map_err(ExecuteError::Precondition)?;
            self.allowance
                .ensure_allowance(gateway.as_ref(), contract, owner, spender, action.amount)
                .await?;
        }

        let amount = action.amount;
        let asset = token.kind;
        let gw = Arc::clone(&gateway);
        let attempted = run_with_retry(&self.retry, move |attempt| {
            let gw = Arc::clone(&gw);
            async move {
                tracing::debug!(attempt, "submitting supply transaction");
                let gas_price = apply_gas_markup(gw.gas_price().await?);
                let tx_hash = gw.submit_supply(asset, amount, owner, gas_price).await?;
                let receipt = gw.await_receipt(tx_hash).await?;
                if !receipt.success {
                    return Err(ChainError::Reverted(format!("{tx_hash:?}")));
                }
                Ok(receipt)
            }
        })
        .await
        .map_err(|f| ExecuteError::SubmissionFailure {
            attempts: f.attempts,
            source: f.last,
        })?;

        let receipt = attempted.value;
        let result = TransactionResult {
            tx_hash: format!("{:?}", receipt.tx_hash),
            protocol: Protocol::Aave,
            kind: action.kind,
            token: token.symbol.to_string(),
            amount: format_amount(action.amount, token.decimals),
        };

        let record = TransactionRecord::confirmed(&result, identity.id);
        if let Err(e) = self.ledger.record(&record) {
            // The action is confirmed on-chain; this is a reconciliation
            // gap, not a reason to retry the submission.
            tracing::error!(
                tx_hash = %result.tx_hash,
                identity = %identity.id,
                error = %e,
                "ledger write failed for confirmed transaction"
            );
            return Err(ExecuteError::LedgerWrite {
                tx_hash: result.tx_hash,
                source: e,
            });
        }

        tracing::info!(
            tx_hash = %result.tx_hash,
            identity = %identity.id,
            token = %result.token,
            amount = %result.amount,
            attempts = attempted.attempts,
            "supply confirmed and recorded"
        );
        Ok(result)
    }
}
