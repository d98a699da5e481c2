// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network constants and the per-network token registry.

use alloy::primitives::{address, Address};

/// What a token symbol resolves to on a given network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The network's native asset (ETH)
    Native,
    /// An ERC-20 contract
    Erc20(Address),
}

/// Resolved token metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    /// Canonical symbol
    pub symbol: &'static str,
    /// Number of decimals in the native unit
    pub decimals: u8,
    /// Native asset or ERC-20 contract
    pub kind: TokenKind,
}

impl TokenInfo {
    /// Whether supplying this token requires a prior ERC-20 approval.
    pub fn requires_approval(&self) -> bool {
        matches!(self.kind, TokenKind::Erc20(_))
    }
}

/// Ethereum network configuration, including the Aave v3 anchor contracts.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL (overridable via configuration)
    pub rpc_url: &'static str,
    /// Aave v3 PoolAddressesProvider (resolves the pool proxy at runtime)
    pub pool_addresses_provider: Address,
    /// Aave v3 WrappedTokenGatewayV3 (native-asset deposits)
    pub wrapped_token_gateway: Address,
}

/// Ethereum mainnet configuration.
pub const ETH_MAINNET: NetworkConfig = NetworkConfig {
    name: "Ethereum Mainnet",
    chain_id: 1,
    rpc_url: "https://eth.llamarpc.com",
    pool_addresses_provider: address!("2f39d218133AFaB8F2B819B1066c7E434Ad94E9e"),
    wrapped_token_gateway: address!("D322A49006FC828F9B5B37Ab215F99B4E5caB19C"),
};

/// Sepolia testnet configuration.
pub const ETH_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia Testnet",
    chain_id: 11155111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    pool_addresses_provider: address!("012bAC54348C0E635dCAc9D5FB99f06F24136C9A"),
    wrapped_token_gateway: address!("387d311e47e80b498169e6fb51d3193167d89F7D"),
};

impl NetworkConfig {
    /// Look up a network by chain id.
    pub fn for_chain_id(chain_id: u64) -> Option<NetworkConfig> {
        match chain_id {
            1 => Some(ETH_MAINNET),
            11155111 => Some(ETH_SEPOLIA),
            _ => None,
        }
    }

    /// Resolve a token symbol on this network.
    ///
    /// Symbols are matched case-insensitively; unknown symbols return `None`
    /// and surface upstream as `NotFound`.
    pub fn token(&self, symbol: &str) -> Option<TokenInfo> {
        let upper = symbol.to_ascii_uppercase();
        match (self.chain_id, upper.as_str()) {
            (_, "ETH") => Some(TokenInfo {
                symbol: "ETH",
                decimals: 18,
                kind: TokenKind::Native,
            }),
            (1, "USDC") => Some(TokenInfo {
                symbol: "USDC",
                decimals: 6,
                kind: TokenKind::Erc20(address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
            }),
            (1, "DAI") => Some(TokenInfo {
                symbol: "DAI",
                decimals: 18,
                kind: TokenKind::Erc20(address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
            }),
            (11155111, "USDC") => Some(TokenInfo {
                symbol: "USDC",
                decimals: 6,
                kind: TokenKind::Erc20(address!("94a9D9AC8a22534E3FaCa9F4e7F2E2cf85d5E4C8")),
            }),
            (11155111, "DAI") => Some(TokenInfo {
                symbol: "DAI",
                decimals: 18,
                kind: TokenKind::Erc20(address!("FF34B3d4Aee8ddCd6F9AFFFB6Fe49bD371b8a357")),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_lookup() {
        assert_eq!(NetworkConfig::for_chain_id(1).unwrap().name, ETH_MAINNET.name);
        assert_eq!(
            NetworkConfig::for_chain_id(11155111).unwrap().chain_id,
            ETH_SEPOLIA.chain_id
        );
        assert!(NetworkConfig::for_chain_id(999).is_none());
    }

    #[test]
    fn token_lookup_is_case_insensitive() {
        let eth = ETH_MAINNET.token("eth").unwrap();
        assert_eq!(eth.kind, TokenKind::Native);
        assert_eq!(eth.decimals, 18);
        assert!(!eth.requires_approval());

        let usdc = ETH_MAINNET.token("usdc").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(usdc.requires_approval());
    }

    #[test]
    fn unknown_token_is_none() {
        assert!(ETH_MAINNET.token("DOGE").is_none());
        assert!(ETH_SEPOLIA.token("").is_none());
    }

    #[test]
    fn token_addresses_differ_per_network() {
        let mainnet = ETH_MAINNET.token("USDC").unwrap();
        let sepolia = ETH_SEPOLIA.token("USDC").unwrap();
        assert_ne!(mainnet.kind, sepolia.kind);
    }
}
