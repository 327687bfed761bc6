use crate::error::GuardianError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Descriptor of the target chain. Created at startup and never mutated;
/// pointing the client at a different network means loading a new config
/// and a new contract registry, not editing this one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub currency_symbol: String,
    pub explorer_url: String,
}

impl NetworkConfig {
    pub fn sonic_testnet() -> Self {
        Self {
            name: "Sonic Testnet".to_string(),
            rpc_url: "https://rpc.testnet.soniclabs.com".to_string(),
            chain_id: 14601,
            currency_symbol: "S".to_string(),
            explorer_url: "https://testnet.soniclabs.com".to_string(),
        }
    }

    /// Chain id in the `0x`-prefixed hexadecimal form wallet RPC methods
    /// expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::sonic_testnet()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    /// Where the deployment record produced by the deploy tool lives.
    pub addresses_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::sonic_testnet(),
            addresses_file: PathBuf::from("contract-addresses.json"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GuardianError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            GuardianError::config(format!("failed to read config file {:?}: {}", path, e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            GuardianError::config(format!("failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GuardianError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| GuardianError::config(format!("failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    GuardianError::config(format!(
                        "failed to create config directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        fs::write(path, content).await.map_err(|e| {
            GuardianError::config(format!("failed to write config file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub async fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let mut config = match path {
            Some(path) => match Self::load_from_file(path).await {
                Ok(config) => {
                    tracing::info!("Loaded configuration from file");
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {}", e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.apply_env_vars();
        config
    }

    /// Apply environment variable substitutions to configuration
    fn apply_env_vars(&mut self) {
        if let Ok(rpc_url) = std::env::var("SONIC_RPC_URL") {
            tracing::info!("Using SONIC_RPC_URL environment variable for the RPC endpoint");
            self.network.rpc_url = rpc_url;
        }

        if let Ok(addresses_file) = std::env::var("SONIC_ADDRESSES_FILE") {
            tracing::debug!("Using SONIC_ADDRESSES_FILE environment variable");
            self.addresses_file = PathBuf::from(addresses_file);
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<PathBuf, GuardianError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GuardianError::config("could not determine config directory"))?;
        Ok(config_dir.join("sonic-guardian").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_network_is_sonic_testnet() {
        let network = NetworkConfig::default();
        assert_eq!(network.name, "Sonic Testnet");
        assert_eq!(network.rpc_url, "https://rpc.testnet.soniclabs.com");
        assert_eq!(network.chain_id, 14601);
        assert_eq!(network.currency_symbol, "S");
        assert_eq!(network.explorer_url, "https://testnet.soniclabs.com");
    }

    #[test]
    fn chain_id_hex_is_zero_x_prefixed() {
        assert_eq!(NetworkConfig::sonic_testnet().chain_id_hex(), "0x3909");
    }

    #[tokio::test]
    async fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.network, config.network);
        assert_eq!(loaded.addresses_file, config.addresses_file);
    }
}
