use crate::config::NetworkConfig;
use crate::error::GuardianError;
use crate::sonic::AnalysisKind;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// The six deployed Guardian contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    ContractAnalysis,
    Tokenomics,
    SocialAnalysis,
    Monitoring,
    SToken,
    Universal,
}

impl ContractKind {
    pub const ALL: [ContractKind; 6] = [
        ContractKind::SToken,
        ContractKind::ContractAnalysis,
        ContractKind::Tokenomics,
        ContractKind::SocialAnalysis,
        ContractKind::Monitoring,
        ContractKind::Universal,
    ];

    /// Canonical name, as used in the deployment record.
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::ContractAnalysis => "ContractAnalysis",
            ContractKind::Tokenomics => "Tokenomics",
            ContractKind::SocialAnalysis => "SocialAnalysis",
            ContractKind::Monitoring => "Monitoring",
            ContractKind::SToken => "SToken",
            ContractKind::Universal => "Universal",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<AnalysisKind> for ContractKind {
    fn from(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::ContractAnalysis => ContractKind::ContractAnalysis,
            AnalysisKind::Tokenomics => ContractKind::Tokenomics,
            AnalysisKind::SocialAnalysis => ContractKind::SocialAnalysis,
            AnalysisKind::Monitoring => ContractKind::Monitoring,
        }
    }
}

/// Deployed addresses for one network. Fixed for the lifetime of a client;
/// switching networks means loading a fresh registry from that network's
/// deployment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRegistry {
    contract_analysis: Address,
    tokenomics: Address,
    social_analysis: Address,
    monitoring: Address,
    s_token: Address,
    universal: Address,
}

impl ContractRegistry {
    pub fn address(&self, kind: ContractKind) -> Address {
        match kind {
            ContractKind::ContractAnalysis => self.contract_analysis,
            ContractKind::Tokenomics => self.tokenomics,
            ContractKind::SocialAnalysis => self.social_analysis,
            ContractKind::Monitoring => self.monitoring,
            ContractKind::SToken => self.s_token,
            ContractKind::Universal => self.universal,
        }
    }

    pub fn entries(&self) -> [(ContractKind, Address); 6] {
        ContractKind::ALL.map(|kind| (kind, self.address(kind)))
    }
}

impl From<&DeploymentRecord> for ContractRegistry {
    fn from(record: &DeploymentRecord) -> Self {
        Self {
            contract_analysis: record.contract_analysis,
            tokenomics: record.tokenomics,
            social_analysis: record.social_analysis,
            monitoring: record.monitoring,
            s_token: record.s_token,
            universal: record.universal,
        }
    }
}

/// The hand-off file between the deploy tool and everything that runs
/// later. The field names are a stable schema shared by producer and
/// consumer; do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(rename = "SToken")]
    pub s_token: Address,
    #[serde(rename = "ContractAnalysis")]
    pub contract_analysis: Address,
    #[serde(rename = "Tokenomics")]
    pub tokenomics: Address,
    #[serde(rename = "SocialAnalysis")]
    pub social_analysis: Address,
    #[serde(rename = "Monitoring")]
    pub monitoring: Address,
    #[serde(rename = "Universal")]
    pub universal: Address,
    #[serde(rename = "Network")]
    pub network: NetworkRecord,
}

/// Nested network descriptor inside the deployment record, mirroring
/// [`NetworkConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub currency: String,
    pub explorer: String,
}

impl From<&NetworkConfig> for NetworkRecord {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            name: network.name.clone(),
            rpc_url: network.rpc_url.clone(),
            chain_id: network.chain_id,
            currency: network.currency_symbol.clone(),
            explorer: network.explorer_url.clone(),
        }
    }
}

impl NetworkRecord {
    pub fn to_network_config(&self) -> NetworkConfig {
        NetworkConfig {
            name: self.name.clone(),
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id,
            currency_symbol: self.currency.clone(),
            explorer_url: self.explorer.clone(),
        }
    }
}

impl DeploymentRecord {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, GuardianError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            GuardianError::config(format!(
                "failed to read deployment record {:?}: {}",
                path, e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            GuardianError::config(format!(
                "failed to parse deployment record {:?}: {}",
                path, e
            ))
        })
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GuardianError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            GuardianError::config(format!("failed to serialize deployment record: {}", e))
        })?;

        fs::write(path, content).await.map_err(|e| {
            GuardianError::config(format!(
                "failed to write deployment record {:?}: {}",
                path, e
            ))
        })
    }
}
