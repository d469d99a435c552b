//! Crossx configuration: origin chain RPC, factory address, the destination
//! domain table and the storage endpoint.
//!
//! Loaded once at startup into validated structures; a malformed or
//! inconsistent table fails fast here instead of mid-flow.

use std::path::Path;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fees::{DomainEntry, DomainTable};

/// The default name for the crossx configuration file.
pub const CROSSX_CONF_FILENAME: &str = "Crossx.toml";

/// Well-known deterministic-deployment factory address, identical on every
/// supported chain.
pub const DEFAULT_FACTORY_ADDRESS: &str = "0x4e59b44847b379578588920cA78FbF26c0B4956C";

/// Default relay fee per destination: 0.01 ether in wei.
pub const DEFAULT_RELAY_FEE_WEI: u64 = 10_000_000_000_000_000;

/// One destination chain entry in the configured domain table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Human-readable chain name used in destination selections.
    pub name: String,
    /// Relay network domain identifier.
    pub domain: u64,
    /// Relay fee for this destination, in origin-chain wei.
    pub relay_fee_wei: u64,
}

/// Content-addressed storage endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the storage HTTP API.
    pub api_url: String,
    /// Optional bearer token for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Complete crossx configuration, serializable to `Crossx.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossxConfig {
    /// Origin chain JSON-RPC endpoint.
    pub rpc_url: String,
    /// The deterministic-deployment factory address.
    pub factory_address: String,
    /// Unlocked account used to submit the origin transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
    /// Host used to build shareable deployment links.
    pub link_host: String,
    /// Relay explorer URL prefix; the origin tx hash is appended.
    pub explorer_url: String,
    /// Storage network endpoint.
    pub storage: StorageConfig,
    /// Destination domain table.
    pub chains: Vec<ChainEntry>,
}

impl Default for CrossxConfig {
    fn default() -> Self {
        let chain = |name: &str, domain: u64| ChainEntry {
            name: name.to_string(),
            domain,
            relay_fee_wei: DEFAULT_RELAY_FEE_WEI,
        };
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            factory_address: DEFAULT_FACTORY_ADDRESS.to_string(),
            sender_address: None,
            link_host: "crossx.vercel.app".to_string(),
            explorer_url: "https://testnet.axelarscan.io/gmp/".to_string(),
            storage: StorageConfig {
                api_url: "https://api.web3.storage/".to_string(),
                auth_token: None,
            },
            chains: vec![
                chain("bsc-testnet", 1),
                chain("polygon-mumbai", 2),
                chain("base-goerli", 3),
                chain("arbitrum-goerli", 4),
                chain("avalanche-fuji", 5),
                chain("optimism-goerli", 6),
            ],
        }
    }
}

impl CrossxConfig {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize crossx config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load and validate the configuration from a TOML file or a directory
    /// containing `Crossx.toml`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file or directory not found: {}",
                path.display()
            );
        }

        let config_path = if path.is_dir() {
            path.join(CROSSX_CONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config from {}", config_path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        config.validate()?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Validate the configuration: parseable addresses and a consistent,
    /// non-empty domain table.
    pub fn validate(&self) -> Result<()> {
        self.factory()
            .context("Invalid factory_address in config")?;
        if let Some(sender) = &self.sender_address {
            sender
                .parse::<Address>()
                .context("Invalid sender_address in config")?;
        }
        url::Url::parse(&self.storage.api_url).context("Invalid storage.api_url in config")?;

        if self.chains.is_empty() {
            anyhow::bail!("Config must declare at least one destination chain");
        }
        for (i, entry) in self.chains.iter().enumerate() {
            if entry.name.is_empty() {
                anyhow::bail!("Chain entry {} has an empty name", i);
            }
            if self.chains[..i].iter().any(|seen| seen.name == entry.name) {
                anyhow::bail!("Duplicate chain name in config: {}", entry.name);
            }
            if self.chains[..i].iter().any(|seen| seen.domain == entry.domain) {
                anyhow::bail!(
                    "Duplicate relay domain {} in config (chain {})",
                    entry.domain,
                    entry.name
                );
            }
        }
        Ok(())
    }

    /// The parsed factory address.
    pub fn factory(&self) -> Result<Address> {
        self.factory_address
            .parse::<Address>()
            .context(format!("Malformed factory address: {}", self.factory_address))
    }

    /// The parsed sender address, if configured.
    pub fn sender(&self) -> Result<Option<Address>> {
        self.sender_address
            .as_deref()
            .map(|s| {
                s.parse::<Address>()
                    .context(format!("Malformed sender address: {s}"))
            })
            .transpose()
    }

    /// Build the validated destination domain table.
    pub fn domain_table(&self) -> DomainTable {
        DomainTable::new(
            self.chains
                .iter()
                .map(|entry| DomainEntry {
                    name: entry.name.clone(),
                    domain: entry.domain,
                    fee: U256::from(entry.relay_fee_wei),
                })
                .collect(),
        )
    }

    /// Relay explorer URL for an origin transaction hash.
    pub fn explorer_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_url, tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrossxConfig::default();
        config.validate().expect("default config must validate");
        assert_eq!(config.chains.len(), 6);
        assert_eq!(config.factory().unwrap().to_string(), DEFAULT_FACTORY_ADDRESS);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let tmp = TempDir::new("crossx-config").unwrap();
        let path = tmp.path().join(CROSSX_CONF_FILENAME);

        let mut config = CrossxConfig::default();
        config.sender_address =
            Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = CrossxConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        // Loading by directory resolves Crossx.toml inside it.
        let loaded = CrossxConfig::load_from_file(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_duplicate_chain_name() {
        let mut config = CrossxConfig::default();
        config.chains[1].name = config.chains[0].name.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_domain() {
        let mut config = CrossxConfig::default();
        config.chains[1].domain = config.chains[0].domain;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_factory() {
        let mut config = CrossxConfig::default();
        config.factory_address = "0x1234".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let mut config = CrossxConfig::default();
        config.chains.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_domain_table_matches_entries() {
        let config = CrossxConfig::default();
        let table = config.domain_table();
        let entry = table.lookup("polygon-mumbai").unwrap();
        assert_eq!(entry.domain, 2);
        assert_eq!(entry.fee, U256::from(DEFAULT_RELAY_FEE_WEI));
        assert!(table.lookup("unknown-chain").is_none());
    }
}
