//! Client library and deployment tooling for the SonicGuardian contracts
//! on Sonic Testnet: paid contract-risk, tokenomics, social, and monitoring
//! analyses, an S-token fee contract, and a universal messaging contract.

pub mod config;
pub mod confirm;
pub mod error;
pub mod sonic;

pub use config::{Config, NetworkConfig};
pub use error::GuardianError;
pub use sonic::client::GuardianClient;
pub use sonic::registry::{ContractKind, ContractRegistry, DeploymentRecord};
pub use sonic::wallet::{LocalKeyBridge, Session, WalletBridge};
pub use sonic::{AnalysisKind, AnalysisRequest, TxOutcome};
