// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-wallet submission serialization.
//!
//! Every submission consumes the signer address's on-chain nonce, so
//! concurrent unsynchronized submissions for the same wallet would race on
//! the sequence number. Executions for the same address queue on one async
//! mutex; different addresses proceed independently.

use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-wallet-address mutexes.
///
/// The registry tracks in-flight wallets, not every address ever seen: each
/// acquisition first drops entries whose mutex is referenced by nothing but
/// the map itself.
#[derive(Default)]
pub struct WalletLocks {
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a wallet address, waiting behind any in-flight
    /// execution for the same address.
    pub async fn acquire(&self, address: Address) -> OwnedMutexGuard<()> {
        // A strong count of 1 means no holder and no waiter: every other
        // path clones the Arc under the shard lock before awaiting, so
        // dropping such entries cannot race an acquisition.
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        let lock = Arc::clone(
            self.locks
                .entry(address)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        lock.lock_owned().await
    }
}
