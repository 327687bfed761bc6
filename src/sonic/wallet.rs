use crate::config::NetworkConfig;
use crate::error::GuardianError;
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Signer session state. Never connected with a null address; the three
/// writers (`connect`, `disconnect`, account-change notifications) all go
/// through the client's session lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    pub account: Option<Address>,
}

impl Session {
    pub fn connected(account: Address) -> Self {
        Self {
            connected: true,
            account: Some(account),
        }
    }
}

/// What a bridge hands back when the user authorizes a connection.
#[derive(Clone)]
pub struct WalletGrant {
    pub address: Address,
    pub wallet: EthereumWallet,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("the user declined the connection request")]
    Refused,
    #[error("the wallet does not recognize the requested chain")]
    UnknownChain,
    #[error("wallet provider error (code {code:?}): {message}")]
    Provider {
        code: Option<i64>,
        message: String,
    },
}

/// `wallet_addEthereumChain` payload. Field names follow the wallet RPC
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainRequest {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl AddChainRequest {
    pub fn from_network(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id_hex(),
            chain_name: network.name.clone(),
            native_currency: NativeCurrency {
                name: network.currency_symbol.clone(),
                symbol: network.currency_symbol.clone(),
                decimals: 18,
            },
            rpc_urls: vec![network.rpc_url.clone()],
            block_explorer_urls: vec![network.explorer_url.clone()],
        }
    }
}

/// Host-environment seam: whatever supplies signing authority and wallet
/// RPC passthrough. A browser extension in the original deployment; an
/// in-process key for tooling. Absence of a bridge is a normal condition,
/// not an error.
///
/// Implementations translate the provider's "unrecognized chain" code
/// (4902 in wallet RPC terms) into [`BridgeError::UnknownChain`] so the
/// client can run its add-then-retry sequence.
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Ask the host to authorize an account for signing.
    async fn authorize(&self) -> Result<WalletGrant, BridgeError>;

    /// `wallet_switchEthereumChain` with a `0x`-prefixed hex chain id.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), BridgeError>;

    /// `wallet_addEthereumChain`.
    async fn add_chain(&self, spec: AddChainRequest) -> Result<(), BridgeError>;
}

/// Bridge backed by an in-process private key. Used by the deploy and
/// smoke-test tools; a local key signs for any chain, so the chain-switch
/// calls are no-ops.
#[derive(Debug, Clone)]
pub struct LocalKeyBridge {
    signer: PrivateKeySigner,
}

impl LocalKeyBridge {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_hex_key(key: &str) -> Result<Self, GuardianError> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer = PrivateKeySigner::from_str(key)
            .map_err(|e| GuardianError::config(format!("invalid private key: {}", e)))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl WalletBridge for LocalKeyBridge {
    async fn authorize(&self) -> Result<WalletGrant, BridgeError> {
        Ok(WalletGrant {
            address: self.signer.address(),
            wallet: EthereumWallet::from(self.signer.clone()),
        })
    }

    async fn switch_chain(&self, _chain_id_hex: &str) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn add_chain(&self, _spec: AddChainRequest) -> Result<(), BridgeError> {
        Ok(())
    }
}
