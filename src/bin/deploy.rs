//! One-shot deployment of the SonicGuardian contracts: deploys the S token
//! and the five service contracts, authorizes the services to draw S
//! tokens, mints a test balance for the deployer, and writes the
//! deployment record consumed by the rest of the tooling.

use alloy::{
    dyn_abi::DynSolValue,
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{
        utils::{format_ether, parse_ether},
        Address, Bytes,
    },
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, Command};
use serde::Deserialize;
use sonic_guardian::{
    config::Config,
    sonic::abi::ISToken,
    sonic::registry::{ContractRegistry, DeploymentRecord, NetworkRecord},
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Compiled contract artifact, as produced by the contract build. Only the
/// creation bytecode is needed here.
#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let matches = Command::new("deploy")
        .version("0.1.0")
        .about("Deploys the SonicGuardian contracts and records their addresses")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("rpc-url")
                .short('r')
                .long("rpc-url")
                .value_name("URL")
                .help("RPC endpoint URL"),
        )
        .arg(
            Arg::new("artifacts")
                .short('a')
                .long("artifacts")
                .value_name("DIR")
                .help("Directory holding compiled contract artifacts (default: artifacts)"),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("FILE")
                .help("Where to write the deployment record (default: configured addresses file)"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = Config::load_or_default(config_path).await;

    if let Some(rpc_url) = matches.get_one::<String>("rpc-url") {
        config.network.rpc_url = rpc_url.clone();
    }

    let artifacts = matches
        .get_one::<String>("artifacts")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let out = matches
        .get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.addresses_file.clone());

    let private_key =
        std::env::var("PRIVATE_KEY").context("PRIVATE_KEY environment variable is required")?;
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let signer = PrivateKeySigner::from_str(key).context("invalid PRIVATE_KEY")?;
    let deployer = signer.address();

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(alloy::network::EthereumWallet::from(signer))
        .on_http(config.network.rpc_url.parse()?);

    info!(
        "Deploying SonicGuardian contracts to {} ({})",
        config.network.name, config.network.rpc_url
    );
    let balance = provider.get_balance(deployer).await?;
    info!(
        "Deployer {} balance: {} {}",
        deployer,
        format_ether(balance),
        config.network.currency_symbol
    );

    let s_token = deploy_contract(&provider, &artifacts, "SToken", None).await?;
    let contract_analysis =
        deploy_contract(&provider, &artifacts, "ContractAnalysis", Some(s_token)).await?;
    let tokenomics = deploy_contract(&provider, &artifacts, "Tokenomics", Some(s_token)).await?;
    let social_analysis =
        deploy_contract(&provider, &artifacts, "SocialAnalysis", Some(s_token)).await?;
    let monitoring = deploy_contract(&provider, &artifacts, "Monitoring", Some(s_token)).await?;
    let universal = deploy_contract(&provider, &artifacts, "Universal", Some(s_token)).await?;

    // Let the service contracts draw S tokens for their fees.
    let token = ISToken::new(s_token, provider.clone());
    let services = [
        ("ContractAnalysis", contract_analysis),
        ("Tokenomics", tokenomics),
        ("SocialAnalysis", social_analysis),
        ("Monitoring", monitoring),
        ("Universal", universal),
    ];
    for (name, address) in services {
        let receipt = token
            .authorizeContract(address, true)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            bail!("authorizing {} was reverted", name);
        }
        info!("{} authorized to spend S tokens", name);
    }

    // Give the deployer a working balance for smoke testing.
    let mint_amount = parse_ether("1000")?;
    let receipt = token
        .mint(deployer, mint_amount)
        .send()
        .await?
        .get_receipt()
        .await?;
    if !receipt.status() {
        bail!("minting test S tokens was reverted");
    }
    info!("Minted {} S to {}", format_ether(mint_amount), deployer);

    let record = DeploymentRecord {
        s_token,
        contract_analysis,
        tokenomics,
        social_analysis,
        monitoring,
        universal,
        network: NetworkRecord::from(&config.network),
    };
    record.save(&out).await?;
    info!("Deployment record saved to {:?}", out);

    info!(
        "Deployment complete on {} (chain id {})",
        config.network.name, config.network.chain_id
    );
    for (kind, address) in ContractRegistry::from(&record).entries() {
        info!("{}: {}", kind, address);
    }

    Ok(())
}

async fn deploy_contract<P>(
    provider: &P,
    artifacts: &Path,
    name: &str,
    constructor_arg: Option<Address>,
) -> Result<Address>
where
    P: Provider<Http<Client>>,
{
    let path = artifacts.join(format!("{}.json", name));
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read artifact {:?}", path))?;
    let artifact: Artifact = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse artifact {:?}", path))?;

    let mut code = hex::decode(artifact.bytecode.trim_start_matches("0x"))
        .with_context(|| format!("artifact {:?} has invalid bytecode", path))?;
    if let Some(address) = constructor_arg {
        code.extend(DynSolValue::Address(address).abi_encode());
    }

    let tx = TransactionRequest::default().with_deploy_code(Bytes::from(code));
    let receipt = provider.send_transaction(tx).await?.get_receipt().await?;
    if !receipt.status() {
        bail!("deployment of {} was reverted", name);
    }

    let address = receipt
        .contract_address()
        .ok_or_else(|| anyhow!("no contract address in the {} deployment receipt", name))?;
    info!("{} deployed at {}", name, address);
    Ok(address)
}
