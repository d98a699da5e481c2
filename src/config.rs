// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the service. Configuration is loaded from the environment once
//! at startup; a malformed master key fails fast rather than at the first
//! decryption.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DEFI_MASTER_KEY` | Hex-encoded 32-byte vault master key | Required |
//! | `DEFI_CHAIN_ID` | Target chain (1 = mainnet, 11155111 = Sepolia) | `1` |
//! | `DEFI_RPC_URL` | JSON-RPC endpoint | network default |
//! | `DEFI_LEDGER_PATH` | Path of the redb ledger file | `/data/ledger.redb` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;

use crate::chain::NetworkConfig;
use crate::vault::MasterKey;

/// Environment variable name for the hex-encoded vault master key.
///
/// Must decode to exactly 32 bytes. There is no default; the service refuses
/// to start without it.
pub const MASTER_KEY_ENV: &str = "DEFI_MASTER_KEY";

/// Environment variable name for the target chain id.
pub const CHAIN_ID_ENV: &str = "DEFI_CHAIN_ID";

/// Environment variable name for the JSON-RPC endpoint override.
pub const RPC_URL_ENV: &str = "DEFI_RPC_URL";

/// Environment variable name for the ledger database path.
pub const LEDGER_PATH_ENV: &str = "DEFI_LEDGER_PATH";

/// Default chain when [`CHAIN_ID_ENV`] is unset.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Default ledger path when [`LEDGER_PATH_ENV`] is unset.
pub const DEFAULT_LEDGER_PATH: &str = "/data/ledger.redb";

/// Configuration errors reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{0} is malformed: {1}")]
    Malformed(&'static str, String),

    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),
}

/// Resolved runtime configuration.
pub struct Config {
    pub master_key: MasterKey,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub ledger_path: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Fails fast on a missing or malformed master key and on an unknown
    /// chain id.
    pub fn from_env() -> Result<Self, ConfigError> {
        let master_key_hex =
            env::var(MASTER_KEY_ENV).map_err(|_| ConfigError::Missing(MASTER_KEY_ENV))?;
        let master_key = MasterKey::from_hex(&master_key_hex)
            .map_err(|e| ConfigError::Malformed(MASTER_KEY_ENV, e.to_string()))?;

        let chain_id = match env::var(CHAIN_ID_ENV) {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::Malformed(CHAIN_ID_ENV, e.to_string()))?,
            Err(_) => DEFAULT_CHAIN_ID,
        };
        let network = NetworkConfig::for_chain_id(chain_id)
            .ok_or(ConfigError::UnsupportedChain(chain_id))?;

        let rpc_url = env::var(RPC_URL_ENV).unwrap_or_else(|_| network.rpc_url.to_string());

        let ledger_path = env::var(LEDGER_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEDGER_PATH));

        Ok(Self {
            master_key,
            network,
            rpc_url,
            ledger_path,
        })
    }
}

/// Install the global `tracing` subscriber, honoring `RUST_LOG` and
/// defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
