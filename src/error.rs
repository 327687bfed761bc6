use thiserror::Error;

/// Failure modes of the Guardian client.
///
/// `connect` and `switch_network` report the expected "nothing to talk to"
/// condition through their boolean return instead of an error; everything
/// else surfaces here.
#[derive(Debug, Error)]
pub enum GuardianError {
    /// A state-mutating call was attempted without a signer session, or a
    /// query was attempted before any provider had been established.
    #[error("wallet session is not connected")]
    NotConnected,

    /// An operation that strictly requires a wallet bridge found none.
    #[error("no wallet provider is available in this environment")]
    NoProvider,

    /// The user explicitly declined the connection request.
    #[error("wallet authorization was declined")]
    WalletRefused,

    /// The wallet provider reported an error other than a plain refusal.
    #[error("wallet provider failure: {message}")]
    Wallet {
        code: Option<i64>,
        message: String,
    },

    /// The network rejected or reverted a submitted transaction.
    #[error("transaction submission failed: {message}")]
    Submission {
        message: String,
        revert_reason: Option<String>,
        code: Option<i64>,
    },

    /// The chain switch/add sequence failed.
    #[error("network switch failed: {message}")]
    NetworkSwitch { message: String },

    /// A query response did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Unusable configuration or deployment record.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl GuardianError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
