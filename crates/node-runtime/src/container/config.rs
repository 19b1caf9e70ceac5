//! # Node Configuration
//!
//! Defaults, then an optional TOML file named by `HM_CONFIG`, then
//! environment overrides.
//!
//! ```toml
//! [identity]
//! seed_hex = "000102030405060708090a0b0c0d0e0f"
//! role = "host"
//!
//! [gossip]
//! topic = "heartbeat"
//! interval_ms = 3000
//!
//! [registry]
//! rp_name = "HD Wallet Authentication"
//! rp_id = "127.0.0.1"
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `HM_SEED` | `identity.seed_hex` |
//! | `HM_ROLE` | `identity.role` (unknown names fall back to environment) |
//! | `HM_GOSSIP_INTERVAL_MS` | `gossip.interval_ms` |
//! | `HM_GOSSIP_TOPIC` | `gossip.topic` |

use hm_01_identity::Role;
use hm_03_gossip::GossipConfig;
use hm_04_registry::RegistryConfig;
use rand::RngCore;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_PATH_VAR: &str = "HM_CONFIG";
pub const SEED_VAR: &str = "HM_SEED";
pub const ROLE_VAR: &str = "HM_ROLE";
pub const GOSSIP_INTERVAL_VAR: &str = "HM_GOSSIP_INTERVAL_MS";
pub const GOSSIP_TOPIC_VAR: &str = "HM_GOSSIP_TOPIC";

/// Length of a generated seed when none is configured.
const EPHEMERAL_SEED_LEN: usize = 32;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Seed is not valid hex: {0}")]
    InvalidSeed(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Which identity this node runs as.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Hex-encoded seed. A random seed is used when absent.
    pub seed_hex: Option<String>,
    pub role: Role,
}

impl IdentityConfig {
    /// Seed bytes. Without a configured seed, a fresh random one is returned
    /// and the node gets a new identity every run.
    pub fn seed(&self) -> Result<Vec<u8>, ConfigError> {
        match &self.seed_hex {
            Some(seed_hex) => {
                hex::decode(seed_hex.trim()).map_err(|e| ConfigError::InvalidSeed(e.to_string()))
            }
            None => {
                warn!("No seed configured, using an ephemeral identity");
                let mut seed = vec![0u8; EPHEMERAL_SEED_LEN];
                rand::thread_rng().fill_bytes(&mut seed);
                Ok(seed)
            }
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("seed_hex", &self.seed_hex.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub identity: IdentityConfig,
    pub gossip: GossipConfig,
    pub registry: RegistryConfig,
}

impl NodeConfig {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse a TOML string. Missing sections and fields take defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup`, usually the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(SEED_VAR) {
            self.identity.seed_hex = Some(seed);
            info!("Loaded seed from environment");
        }
        if let Some(role) = lookup(ROLE_VAR) {
            self.identity.role = Role::from_name_lenient(&role);
        }
        if let Some(interval) = lookup(GOSSIP_INTERVAL_VAR) {
            self.gossip.interval_ms =
                interval
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        var: GOSSIP_INTERVAL_VAR,
                        value: interval.clone(),
                    })?;
        }
        if let Some(topic) = lookup(GOSSIP_TOPIC_VAR) {
            if topic.trim().is_empty() {
                return Err(ConfigError::InvalidOverride {
                    var: GOSSIP_TOPIC_VAR,
                    value: topic,
                });
            }
            self.gossip.topic = topic;
        }
        Ok(())
    }
}

/// Load configuration from `HM_CONFIG` (if set) and the environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            NodeConfig::load(path)?
        }
        Err(_) => NodeConfig::default(),
    };
    config.apply_overrides(|var| std::env::var(var).ok())?;
    Ok(config)
}
