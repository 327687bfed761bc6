//! One-shot smoke test against a deployed SonicGuardian installation.
//! Loads the deployment record, connects a local key through the client,
//! exercises every request method plus the token reads, and logs failures
//! without aborting the run.

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::Address,
    providers::ProviderBuilder,
    signers::local::PrivateKeySigner,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, Command};
use sonic_guardian::{
    config::Config,
    confirm::ConfirmationStatus,
    sonic::abi::ISToken,
    sonic::registry::{ContractKind, ContractRegistry, DeploymentRecord},
    sonic::utils::{format_s, parse_s, validate_address},
    sonic::wallet::{LocalKeyBridge, WalletBridge},
    AnalysisKind, GuardianClient,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let matches = Command::new("smoke")
        .version("0.1.0")
        .about("Exercises the deployed SonicGuardian contracts end to end")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("addresses")
                .short('a')
                .long("addresses")
                .value_name("FILE")
                .help("Deployment record produced by the deploy tool"),
        )
        .arg(
            Arg::new("recipient")
                .long("recipient")
                .value_name("ADDRESS")
                .help("Optional address to receive a 10 S transfer during the run"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let config = Config::load_or_default(config_path).await;
    let addresses_path = matches
        .get_one::<String>("addresses")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.addresses_file.clone());

    let record = DeploymentRecord::load(&addresses_path).await?;
    // The record is the hand-off from deployment; its embedded network
    // descriptor wins over the local config.
    let network = record.network.to_network_config();
    let registry = ContractRegistry::from(&record);
    info!(
        "Smoke testing SonicGuardian on {} ({})",
        network.name, network.rpc_url
    );

    let private_key =
        std::env::var("PRIVATE_KEY").context("PRIVATE_KEY environment variable is required")?;
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let signer = PrivateKeySigner::from_str(key).context("invalid PRIVATE_KEY")?;
    let user = signer.address();

    let bridge = Arc::new(LocalKeyBridge::new(signer.clone()));
    let client = GuardianClient::new(
        network.clone(),
        registry.clone(),
        Some(bridge as Arc<dyn WalletBridge>),
    );

    if !client.connect().await? {
        return Err(anyhow!("no wallet available; cannot run the smoke test"));
    }
    info!("Testing with account {}", user);

    if !client.switch_network().await {
        warn!("could not switch the wallet to {}", network.name);
    }

    // S token sanity checks.
    let read_provider = ProviderBuilder::new().on_http(network.rpc_url.parse()?);
    let token = ISToken::new(registry.address(ContractKind::SToken), read_provider);
    info!(
        "User S token balance: {}",
        format_s(token.balanceOf(user).call().await?.balance)
    );
    info!(
        "Total supply: {}",
        format_s(token.totalSupply().call().await?.supply)
    );
    info!(
        "Feature cost: {}",
        format_s(token.getFeatureCost().call().await?.cost)
    );

    let reported_token = client.s_token_address(AnalysisKind::ContractAnalysis).await?;
    if reported_token != registry.address(ContractKind::SToken) {
        warn!(
            "ContractAnalysis points at a different S token: {}",
            reported_token
        );
    }

    if let Some(recipient) = matches.get_one::<String>("recipient") {
        let recipient = validate_address(recipient)?;
        transfer_test_tokens(&network.rpc_url, &registry, signer.clone(), recipient).await?;
    }

    let targets = [
        (
            AnalysisKind::ContractAnalysis,
            "0x1234567890123456789012345678901234567890",
        ),
        (
            AnalysisKind::Tokenomics,
            "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
        ),
        (AnalysisKind::SocialAnalysis, "TestProject"),
        (
            AnalysisKind::Monitoring,
            "0x9876543210987654321098765432109876543210",
        ),
    ];

    let mut failures = 0usize;
    for (kind, target) in targets {
        match client.request_analysis(kind, target).await {
            Ok(outcome) => info!(
                "{} request mined in block {:?}: {}",
                kind, outcome.block_number, outcome.hash
            ),
            Err(e) => {
                failures += 1;
                error!("{} request failed: {}", kind, e);
            }
        }
    }

    match client.send_message("Hello Sonic Network!").await {
        Ok(outcome) => {
            // Drive the confirmation panel state the way the UI would.
            let mut status = ConfirmationStatus::new("Hello Sonic Network!");
            status.record_source_tx(outcome.hash.to_string());
            status.refresh_destination();
            info!("{}", status.headline());
        }
        Err(e) => {
            failures += 1;
            error!("universal message failed: {}", e);
        }
    }

    match client
        .get_user_requests(AnalysisKind::ContractAnalysis, user)
        .await
    {
        Ok(requests) => {
            info!(
                "{} stored contract-analysis requests for {}",
                requests.len(),
                user
            );
            for request in &requests {
                info!(
                    "  target '{}' (completed: {}, paid {} S)",
                    request.target,
                    request.completed,
                    format_s(request.payment)
                );
            }
        }
        Err(e) => {
            failures += 1;
            error!("reading stored requests failed: {}", e);
        }
    }

    // Final balances.
    info!(
        "Final user S token balance: {}",
        format_s(token.balanceOf(user).call().await?.balance)
    );
    info!(
        "User balance as seen by ContractAnalysis: {}",
        format_s(
            client
                .user_token_balance(AnalysisKind::ContractAnalysis, user)
                .await?
        )
    );
    for kind in AnalysisKind::ALL {
        match client.contract_token_balance(kind).await {
            Ok(balance) => info!("{} contract balance: {} S", kind, format_s(balance)),
            Err(e) => warn!("could not read the {} contract balance: {}", kind, e),
        }
    }
    let universal_balance = token
        .balanceOf(registry.address(ContractKind::Universal))
        .call()
        .await?
        .balance;
    info!("Universal contract balance: {} S", format_s(universal_balance));

    if failures > 0 {
        warn!("{} of the exercised operations failed", failures);
    }
    info!("Smoke test completed");
    Ok(())
}

async fn transfer_test_tokens(
    rpc_url: &str,
    registry: &ContractRegistry,
    signer: PrivateKeySigner,
    recipient: Address,
) -> Result<()> {
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(rpc_url.parse()?);
    let token = ISToken::new(registry.address(ContractKind::SToken), provider);

    let amount = parse_s("10")?;
    let receipt = token
        .transfer(recipient, amount)
        .send()
        .await?
        .get_receipt()
        .await?;
    if !receipt.status() {
        return Err(anyhow!("transferring 10 S to {} was reverted", recipient));
    }
    info!("Transferred 10 S to {}", recipient);
    Ok(())
}
