use crate::config::NetworkConfig;
use crate::error::GuardianError;
use crate::sonic::abi::{IGuardian, IUniversal};
use crate::sonic::registry::{ContractKind, ContractRegistry};
use crate::sonic::utils;
use crate::sonic::wallet::{AddChainRequest, BridgeError, Session, WalletBridge};
use crate::sonic::{AnalysisKind, AnalysisRequest, TxOutcome};
use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionReceipt,
    transports::http::{Client, Http},
};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Default)]
struct SignerSlot {
    session: Session,
    wallet: Option<EthereumWallet>,
}

/// Mediates all outbound calls to the Guardian contracts and all inbound
/// reads through one connect/call/query protocol.
///
/// Construct one per process and hand it by reference to consumers. Each
/// request is independent: there is no queuing, batching, or retry here,
/// and the signer is not locked across submissions. Two unawaited
/// submissions from the same account can race on nonces at the provider,
/// which is the caller's responsibility to avoid.
pub struct GuardianClient {
    network: NetworkConfig,
    registry: ContractRegistry,
    bridge: Option<Arc<dyn WalletBridge>>,
    signer: Mutex<SignerSlot>,
    read_provider: OnceLock<RootProvider<Http<Client>>>,
}

impl GuardianClient {
    pub fn new(
        network: NetworkConfig,
        registry: ContractRegistry,
        bridge: Option<Arc<dyn WalletBridge>>,
    ) -> Self {
        Self {
            network,
            registry,
            bridge,
            signer: Mutex::new(SignerSlot::default()),
            read_provider: OnceLock::new(),
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Attempts to acquire signing authority from the host environment.
    ///
    /// Returns `Ok(false)` when no wallet bridge is installed; that is a
    /// normal condition, not an error. An explicit refusal by the user is
    /// reported as [`GuardianError::WalletRefused`] rather than `false`.
    pub async fn connect(&self) -> Result<bool, GuardianError> {
        let Some(bridge) = self.bridge.as_ref() else {
            debug!("no wallet bridge installed; staying disconnected");
            return Ok(false);
        };

        let grant = bridge.authorize().await.map_err(|e| match e {
            BridgeError::Refused => GuardianError::WalletRefused,
            BridgeError::Provider { code, message } => GuardianError::Wallet { code, message },
            other => GuardianError::Wallet {
                code: None,
                message: other.to_string(),
            },
        })?;

        // The read path only needs a provider to have been established
        // once; it survives later disconnects and account changes.
        if self.read_provider.get().is_none() {
            let provider = self.build_read_provider()?;
            let _ = self.read_provider.set(provider);
        }

        let mut slot = self.signer.lock().await;
        slot.session = Session::connected(grant.address);
        slot.wallet = Some(grant.wallet);
        info!("wallet connected: {}", grant.address);
        Ok(true)
    }

    pub async fn disconnect(&self) {
        let mut slot = self.signer.lock().await;
        if slot.session.connected {
            info!("wallet disconnected");
        }
        slot.session = Session::default();
        slot.wallet = None;
    }

    /// Provider-reported account change. The session is reset rather than
    /// rebound; callers reconnect to pick up the new account.
    pub async fn handle_accounts_changed(&self) {
        debug!("provider reported an account change; resetting session");
        let mut slot = self.signer.lock().await;
        slot.session = Session::default();
        slot.wallet = None;
    }

    /// Cached session address. `None` iff the session is disconnected; no
    /// provider round trip.
    pub async fn current_address(&self) -> Option<Address> {
        self.signer.lock().await.session.account
    }

    pub async fn session(&self) -> Session {
        self.signer.lock().await.session.clone()
    }

    /// Submits an analysis request and suspends until it is mined.
    ///
    /// The mapping from `kind` to the remote function is fixed one-to-one.
    /// Payment is deducted by the contract in S tokens; no native value is
    /// attached. A failed submission leaves the session untouched and can
    /// be retried immediately; no retry happens here.
    pub async fn request_analysis(
        &self,
        kind: AnalysisKind,
        target: &str,
    ) -> Result<TxOutcome, GuardianError> {
        let wallet = self.signer_wallet().await?;
        let provider = self.wallet_provider(wallet)?;
        let contract = IGuardian::new(self.registry.address(kind.into()), provider);

        debug!("submitting {} request for '{}'", kind, target);
        let pending = match kind {
            AnalysisKind::ContractAnalysis => {
                contract.requestContractAnalysis(target.to_owned()).send().await
            }
            AnalysisKind::Tokenomics => {
                contract.requestTokenomicsAnalysis(target.to_owned()).send().await
            }
            AnalysisKind::SocialAnalysis => {
                contract.requestSocialAnalysis(target.to_owned()).send().await
            }
            AnalysisKind::Monitoring => contract.requestMonitoring(target.to_owned()).send().await,
        }
        .map_err(map_call_error)?;

        let tx_hash = *pending.tx_hash();
        info!("{} request submitted: {}", kind, tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| utils::submission_failure(&e.to_string()))?;
        Ok(outcome(&receipt))
    }

    /// Sends a message through the Universal contract and waits for it to
    /// be mined.
    pub async fn send_message(&self, message: &str) -> Result<TxOutcome, GuardianError> {
        let wallet = self.signer_wallet().await?;
        let provider = self.wallet_provider(wallet)?;
        let contract = IUniversal::new(self.registry.address(ContractKind::Universal), provider);

        let pending = contract
            .sendMessage(message.to_owned())
            .send()
            .await
            .map_err(map_call_error)?;
        let tx_hash = *pending.tx_hash();
        info!("universal message submitted: {}", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| utils::submission_failure(&e.to_string()))?;
        Ok(outcome(&receipt))
    }

    /// Reads the stored requests one user has made against one analysis
    /// contract, in the order the contract returns them (append order
    /// on-chain); nothing is re-sorted locally.
    ///
    /// Needs only a once-established provider, not a connected session.
    pub async fn get_user_requests(
        &self,
        kind: AnalysisKind,
        user: Address,
    ) -> Result<Vec<AnalysisRequest>, GuardianError> {
        let provider = self.reader()?;
        let contract = IGuardian::new(self.registry.address(kind.into()), provider);

        let result = contract
            .getUserRequests(user)
            .call()
            .await
            .map_err(map_call_error)?;
        Ok(result.requests.into_iter().map(AnalysisRequest::from).collect())
    }

    pub async fn s_token_address(&self, kind: AnalysisKind) -> Result<Address, GuardianError> {
        let provider = self.reader()?;
        let contract = IGuardian::new(self.registry.address(kind.into()), provider);
        let result = contract
            .getSTokenAddress()
            .call()
            .await
            .map_err(map_call_error)?;
        Ok(result.token)
    }

    pub async fn contract_token_balance(&self, kind: AnalysisKind) -> Result<U256, GuardianError> {
        let provider = self.reader()?;
        let contract = IGuardian::new(self.registry.address(kind.into()), provider);
        let result = contract
            .getContractSTokenBalance()
            .call()
            .await
            .map_err(map_call_error)?;
        Ok(result.balance)
    }

    pub async fn user_token_balance(
        &self,
        kind: AnalysisKind,
        user: Address,
    ) -> Result<U256, GuardianError> {
        let provider = self.reader()?;
        let contract = IGuardian::new(self.registry.address(kind.into()), provider);
        let result = contract
            .getUserSTokenBalance(user)
            .call()
            .await
            .map_err(map_call_error)?;
        Ok(result.balance)
    }

    /// Asks the host environment to switch to the configured network. If
    /// the host does not recognize the chain, registers it and retries the
    /// switch exactly once. Failures are logged and reported as `false`;
    /// the host's active network is left unchanged.
    pub async fn switch_network(&self) -> bool {
        match self.try_switch_network().await {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    async fn try_switch_network(&self) -> Result<(), GuardianError> {
        let bridge = self.bridge.as_ref().ok_or(GuardianError::NoProvider)?;
        let chain_id_hex = self.network.chain_id_hex();

        match bridge.switch_chain(&chain_id_hex).await {
            Ok(()) => Ok(()),
            Err(BridgeError::UnknownChain) => {
                debug!(
                    "wallet does not recognize {}; registering it",
                    self.network.name
                );
                bridge
                    .add_chain(AddChainRequest::from_network(&self.network))
                    .await
                    .map_err(|e| GuardianError::NetworkSwitch {
                        message: format!("failed to register {}: {}", self.network.name, e),
                    })?;
                // One retry after registering; no third attempt.
                bridge
                    .switch_chain(&chain_id_hex)
                    .await
                    .map_err(|e| GuardianError::NetworkSwitch {
                        message: format!(
                            "switch to {} failed after registering it: {}",
                            self.network.name, e
                        ),
                    })
            }
            Err(e) => Err(GuardianError::NetworkSwitch {
                message: e.to_string(),
            }),
        }
    }

    async fn signer_wallet(&self) -> Result<EthereumWallet, GuardianError> {
        let slot = self.signer.lock().await;
        slot.wallet.clone().ok_or(GuardianError::NotConnected)
    }

    fn reader(&self) -> Result<RootProvider<Http<Client>>, GuardianError> {
        self.read_provider
            .get()
            .cloned()
            .ok_or(GuardianError::NotConnected)
    }

    fn build_read_provider(&self) -> Result<RootProvider<Http<Client>>, GuardianError> {
        let url = self.network.rpc_url.parse().map_err(|e| {
            GuardianError::config(format!("invalid RPC URL '{}': {}", self.network.rpc_url, e))
        })?;
        Ok(ProviderBuilder::new().on_http(url))
    }

    fn wallet_provider(
        &self,
        wallet: EthereumWallet,
    ) -> Result<impl Provider<Http<Client>> + Clone, GuardianError> {
        let url = self.network.rpc_url.parse().map_err(|e| {
            GuardianError::config(format!("invalid RPC URL '{}': {}", self.network.rpc_url, e))
        })?;
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(url))
    }
}

fn outcome(receipt: &TransactionReceipt) -> TxOutcome {
    TxOutcome {
        hash: receipt.transaction_hash,
        success: receipt.status(),
        block_number: receipt.block_number,
        gas_used: receipt.gas_used() as u64,
    }
}

fn map_call_error(err: alloy::contract::Error) -> GuardianError {
    match err {
        alloy::contract::Error::AbiError(e) => GuardianError::Decode {
            message: e.to_string(),
        },
        other => utils::submission_failure(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sonic::registry::{DeploymentRecord, NetworkRecord};
    use crate::sonic::wallet::WalletGrant;
    use alloy::primitives::address;
    use alloy::signers::local::PrivateKeySigner;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::str::FromStr;
    use std::sync::Mutex as StdMutex;

    // Well-known test key (anvil account 0).
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn test_signer() -> PrivateKeySigner {
        PrivateKeySigner::from_str(TEST_KEY).unwrap()
    }

    fn test_registry() -> ContractRegistry {
        let record = DeploymentRecord {
            s_token: Address::repeat_byte(0x01),
            contract_analysis: Address::repeat_byte(0x02),
            tokenomics: Address::repeat_byte(0x03),
            social_analysis: Address::repeat_byte(0x04),
            monitoring: Address::repeat_byte(0x05),
            universal: Address::repeat_byte(0x06),
            network: NetworkRecord::from(&NetworkConfig::sonic_testnet()),
        };
        ContractRegistry::from(&record)
    }

    #[derive(Debug, Clone, PartialEq)]
    enum BridgeCall {
        Authorize,
        Switch(String),
        Add(AddChainRequest),
    }

    struct MockBridge {
        refuse_authorize: bool,
        switch_results: StdMutex<VecDeque<Result<(), BridgeError>>>,
        add_result: StdMutex<Result<(), BridgeError>>,
        calls: StdMutex<Vec<BridgeCall>>,
    }

    impl MockBridge {
        fn new() -> Self {
            Self {
                refuse_authorize: false,
                switch_results: StdMutex::new(VecDeque::new()),
                add_result: StdMutex::new(Ok(())),
                calls: StdMutex::new(Vec::new()),
            }
        }

        fn refusing() -> Self {
            Self {
                refuse_authorize: true,
                ..Self::new()
            }
        }

        fn with_switch_script(results: Vec<Result<(), BridgeError>>) -> Self {
            let bridge = Self::new();
            *bridge.switch_results.lock().unwrap() = results.into();
            bridge
        }

        fn failing_add(self) -> Self {
            *self.add_result.lock().unwrap() = Err(BridgeError::Provider {
                code: Some(-32602),
                message: "bad chain params".to_string(),
            });
            self
        }

        fn calls(&self) -> Vec<BridgeCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletBridge for MockBridge {
        async fn authorize(&self) -> Result<WalletGrant, BridgeError> {
            self.calls.lock().unwrap().push(BridgeCall::Authorize);
            if self.refuse_authorize {
                return Err(BridgeError::Refused);
            }
            let signer = test_signer();
            Ok(WalletGrant {
                address: signer.address(),
                wallet: EthereumWallet::from(signer),
            })
        }

        async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), BridgeError> {
            self.calls
                .lock()
                .unwrap()
                .push(BridgeCall::Switch(chain_id_hex.to_string()));
            self.switch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn add_chain(&self, spec: AddChainRequest) -> Result<(), BridgeError> {
            self.calls.lock().unwrap().push(BridgeCall::Add(spec));
            self.add_result.lock().unwrap().clone()
        }
    }

    fn client_with(bridge: Option<Arc<dyn WalletBridge>>) -> GuardianClient {
        GuardianClient::new(NetworkConfig::sonic_testnet(), test_registry(), bridge)
    }

    #[tokio::test]
    async fn connect_without_bridge_returns_false_and_requests_fail() {
        let client = client_with(None);

        assert!(!client.connect().await.unwrap());
        assert_eq!(client.session().await, Session::default());

        for kind in AnalysisKind::ALL {
            let err = client
                .request_analysis(kind, "0xabc0000000000000000000000000000000000000")
                .await
                .unwrap_err();
            assert!(matches!(err, GuardianError::NotConnected), "{}", kind);
        }

        // No provider was ever established, so reads refuse too.
        let err = client
            .get_user_requests(AnalysisKind::Monitoring, Address::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, GuardianError::NotConnected));
    }

    #[tokio::test]
    async fn connect_caches_the_granted_address() {
        let bridge = Arc::new(MockBridge::new());
        let client = client_with(Some(bridge.clone() as Arc<dyn WalletBridge>));

        assert!(client.current_address().await.is_none());
        assert!(client.connect().await.unwrap());
        assert_eq!(client.current_address().await, Some(TEST_ADDRESS));
        assert_eq!(client.session().await, Session::connected(TEST_ADDRESS));
    }

    #[tokio::test]
    async fn refused_authorization_is_an_error_not_false() {
        let bridge = Arc::new(MockBridge::refusing());
        let client = client_with(Some(bridge as Arc<dyn WalletBridge>));

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, GuardianError::WalletRefused));
        assert_eq!(client.session().await, Session::default());
    }

    #[tokio::test]
    async fn disconnect_resets_session_but_keeps_read_provider() {
        let bridge = Arc::new(MockBridge::new());
        let client = client_with(Some(bridge as Arc<dyn WalletBridge>));

        assert!(client.connect().await.unwrap());
        client.disconnect().await;

        assert!(client.current_address().await.is_none());
        assert_eq!(client.session().await, Session::default());
        assert!(client.read_provider.get().is_some());
    }

    #[tokio::test]
    async fn account_change_resets_session() {
        let bridge = Arc::new(MockBridge::new());
        let client = client_with(Some(bridge as Arc<dyn WalletBridge>));

        assert!(client.connect().await.unwrap());
        client.handle_accounts_changed().await;

        assert_eq!(client.session().await, Session::default());
        assert!(client
            .request_analysis(AnalysisKind::SocialAnalysis, "TestProject")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn switch_on_recognized_chain_switches_once() {
        let bridge = Arc::new(MockBridge::new());
        let client = client_with(Some(bridge.clone() as Arc<dyn WalletBridge>));

        assert!(client.switch_network().await);
        assert_eq!(
            bridge.calls(),
            vec![BridgeCall::Switch("0x3909".to_string())]
        );
    }

    #[tokio::test]
    async fn switch_on_unknown_chain_adds_then_retries_once() {
        let bridge = Arc::new(MockBridge::with_switch_script(vec![
            Err(BridgeError::UnknownChain),
            Ok(()),
        ]));
        let client = client_with(Some(bridge.clone() as Arc<dyn WalletBridge>));

        assert!(client.switch_network().await);

        let calls = bridge.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], BridgeCall::Switch("0x3909".to_string()));
        assert_eq!(
            calls[1],
            BridgeCall::Add(AddChainRequest::from_network(
                &NetworkConfig::sonic_testnet()
            ))
        );
        assert_eq!(calls[2], BridgeCall::Switch("0x3909".to_string()));
    }

    #[tokio::test]
    async fn switch_gives_up_after_the_single_retry() {
        let bridge = Arc::new(MockBridge::with_switch_script(vec![
            Err(BridgeError::UnknownChain),
            Err(BridgeError::Provider {
                code: Some(4001),
                message: "user rejected".to_string(),
            }),
        ]));
        let client = client_with(Some(bridge.clone() as Arc<dyn WalletBridge>));

        assert!(!client.switch_network().await);
        // switch, add, retry switch; never a third switch attempt.
        assert_eq!(bridge.calls().len(), 3);
    }

    #[tokio::test]
    async fn switch_stops_when_the_chain_cannot_be_added() {
        let bridge = Arc::new(
            MockBridge::with_switch_script(vec![Err(BridgeError::UnknownChain)]).failing_add(),
        );
        let client = client_with(Some(bridge.clone() as Arc<dyn WalletBridge>));

        assert!(!client.switch_network().await);
        let calls = bridge.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[1], BridgeCall::Add(_)));
    }

    #[tokio::test]
    async fn switch_without_bridge_is_false() {
        let client = client_with(None);
        assert!(!client.switch_network().await);
    }
}
