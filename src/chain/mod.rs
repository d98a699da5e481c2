// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ethereum integration: the gateway boundary, the Aave v3 implementation,
//! network/token constants and unit conversion.

pub mod aave;
pub mod gateway;
pub mod types;
pub mod units;

pub use gateway::{ChainError, ChainGateway, ChainGatewayFactory, Receipt};
pub use types::{NetworkConfig, TokenInfo, TokenKind, ETH_MAINNET, ETH_SEPOLIA};
