pub mod abi;
pub mod client;
pub mod registry;
pub mod utils;
pub mod wallet;

use alloy::primitives::{Address, TxHash, U256};
use std::fmt;

/// The four requestable analysis services. Adding or removing a service is
/// a compile-time-checked change: every lookup over this enum is an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    ContractAnalysis,
    Tokenomics,
    SocialAnalysis,
    Monitoring,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::ContractAnalysis,
        AnalysisKind::Tokenomics,
        AnalysisKind::SocialAnalysis,
        AnalysisKind::Monitoring,
    ];
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisKind::ContractAnalysis => "contract analysis",
            AnalysisKind::Tokenomics => "tokenomics analysis",
            AnalysisKind::SocialAnalysis => "social analysis",
            AnalysisKind::Monitoring => "monitoring",
        })
    }
}

/// A stored analysis request as read back from the chain. This layer only
/// decodes these; it never constructs one and never flips `completed`,
/// which is the oracle's job on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub user: Address,
    pub target: String,
    pub payment: U256,
    pub completed: bool,
    pub risk_score: U256,
    pub analysis: String,
    pub timestamp: U256,
}

impl From<abi::StoredRequest> for AnalysisRequest {
    fn from(raw: abi::StoredRequest) -> Self {
        Self {
            user: raw.user,
            target: raw.target,
            payment: raw.payment,
            completed: raw.completed,
            risk_score: raw.riskScore,
            analysis: raw.analysis,
            timestamp: raw.timestamp,
        }
    }
}

/// Summary of a mined transaction, handed back to the caller and not
/// retained by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_requests_keep_chain_values_verbatim() {
        let raw = abi::StoredRequest {
            user: Address::repeat_byte(0xaa),
            target: "0x1234567890123456789012345678901234567890".to_string(),
            payment: U256::from(5u64),
            completed: false,
            riskScore: U256::from(0u64),
            analysis: String::new(),
            timestamp: U256::from(1_700_000_000u64),
        };

        let request = AnalysisRequest::from(raw);
        assert_eq!(request.user, Address::repeat_byte(0xaa));
        assert_eq!(
            request.target,
            "0x1234567890123456789012345678901234567890"
        );
        assert_eq!(request.payment, U256::from(5u64));
        // Completion is the remote oracle's to flip, never ours.
        assert!(!request.completed);
        assert_eq!(request.timestamp, U256::from(1_700_000_000u64));
    }
}
