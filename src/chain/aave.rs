// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Aave v3 gateway over an alloy HTTP provider.
//!
//! One gateway is bound per execution to the identity's freshly decrypted
//! signer. The pool proxy is resolved through the PoolAddressesProvider at
//! call time; native-asset supplies go through the WrappedTokenGatewayV3,
//! ERC-20 supplies through `IPool::supply`.

use std::sync::Arc;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;

use super::gateway::{ChainError, ChainGateway, ChainGatewayFactory, Receipt};
use super::types::{NetworkConfig, TokenKind};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IPoolAddressesProvider {
        function getPool() external view returns (address);
    }

    #[sol(rpc)]
    interface IPool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
    }

    #[sol(rpc)]
    interface IWrappedTokenGatewayV3 {
        function depositETH(address pool, address onBehalfOf, uint16 referralCode) external payable;
    }
}

/// HTTP provider with signing capabilities (all fillers + wallet).
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// How often to poll for a receipt, and for how many rounds, before the
/// attempt is classified as a transient confirmation timeout.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_POLL_ROUNDS: u32 = 60;

/// Aave v3 chain gateway bound to one signer.
pub struct AaveGateway {
    network: NetworkConfig,
    provider: SignerProvider,
}

impl AaveGateway {
    /// Bind a gateway to a signer on the given network.
    pub fn bind(
        network: NetworkConfig,
        rpc_url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { network, provider })
    }
}

#[async_trait]
impl ChainGateway for AaveGateway {
    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        IERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))
    }

    async fn pool_address(&self) -> Result<Address, ChainError> {
        IPoolAddressesProvider::new(self.network.pool_addresses_provider, self.provider.clone())
            .getPool()
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))
    }

    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        gas_price: u128,
    ) -> Result<TxHash, ChainError> {
        let pending = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(classify_submit_error)?;

        Ok(*pending.tx_hash())
    }

    async fn submit_supply(
        &self,
        asset: TokenKind,
        amount: U256,
        on_behalf_of: Address,
        gas_price: u128,
    ) -> Result<TxHash, ChainError> {
        let pool = self.pool_address().await?;

        let pending = match asset {
            TokenKind::Erc20(token) => IPool::new(pool, self.provider.clone())
                .supply(token, amount, on_behalf_of, 0u16)
                .gas_price(gas_price)
                .send()
                .await
                .map_err(classify_submit_error)?,
            TokenKind::Native => {
                IWrappedTokenGatewayV3::new(self.network.wrapped_token_gateway, self.provider.clone())
                    .depositETH(pool, on_behalf_of, 0u16)
                    .value(amount)
                    .gas_price(gas_price)
                    .send()
                    .await
                    .map_err(classify_submit_error)?
            }
        };

        Ok(*pending.tx_hash())
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ChainError> {
        for _ in 0..RECEIPT_POLL_ROUNDS {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;

            if let Some(r) = receipt {
                if !r.status() {
                    return Err(ChainError::Reverted(format!("{tx_hash:?}")));
                }
                return Ok(Receipt {
                    tx_hash,
                    block_number: r.block_number.unwrap_or(0),
                    success: true,
                });
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(ChainError::ConfirmationTimeout(format!("{tx_hash:?}")))
    }
}

/// Split node-side submission failures into fatal rejections and transient
/// transport faults. The node reports validation problems in message text;
/// anything unrecognized is treated as transient and left to the bounded
/// retry loop.
fn classify_submit_error(e: alloy::contract::Error) -> ChainError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    let fatal = lower.contains("insufficient funds")
        || lower.contains("nonce too low")
        || lower.contains("invalid signature")
        || lower.contains("execution reverted")
        || lower.contains("gas limit")
        || lower.contains("intrinsic gas");
    if fatal {
        ChainError::Rejected(msg)
    } else {
        ChainError::Rpc(msg)
    }
}

/// Factory producing [`AaveGateway`]s for the configured network.
pub struct AaveGatewayFactory {
    network: NetworkConfig,
    rpc_url: String,
}

impl AaveGatewayFactory {
    /// Use the network with an explicit RPC endpoint.
    pub fn new(network: NetworkConfig, rpc_url: impl Into<String>) -> Self {
        Self {
            network,
            rpc_url: rpc_url.into(),
        }
    }

    /// Use the network's default RPC endpoint.
    pub fn with_default_rpc(network: NetworkConfig) -> Self {
        let rpc_url = network.rpc_url.to_string();
        Self { network, rpc_url }
    }
}

impl ChainGatewayFactory for AaveGatewayFactory {
    fn bind(&self, signer: PrivateKeySigner) -> Result<Arc<dyn ChainGateway>, ChainError> {
        let gateway = AaveGateway::bind(self.network.clone(), &self.rpc_url, signer)?;
        Ok(Arc::new(gateway))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::ETH_SEPOLIA;
    use k256::ecdsa::SigningKey;
    use k256::elliptic_curve::rand_core::OsRng;

    fn test_signer() -> PrivateKeySigner {
        let key = SigningKey::random(&mut OsRng);
        PrivateKeySigner::from_slice(&key.to_bytes()).unwrap()
    }

    #[test]
    fn bind_rejects_malformed_rpc_url() {
        let result = AaveGateway::bind(ETH_SEPOLIA, "not a url", test_signer());
        assert!(matches!(result, Err(ChainError::InvalidRpcUrl(_))));
    }

    #[test]
    fn factory_binds_with_default_rpc() {
        let factory = AaveGatewayFactory::with_default_rpc(ETH_SEPOLIA);
        assert!(factory.bind(test_signer()).is_ok());
    }
}
