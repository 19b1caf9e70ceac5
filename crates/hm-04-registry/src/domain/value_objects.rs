//! Registry configuration.

use hm_01_identity::Role;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RP_NAME: &str = "HD Wallet Authentication";
pub const DEFAULT_RP_ID: &str = "127.0.0.1";
pub const DEFAULT_CREDENTIAL_TIMEOUT_MS: u64 = 60_000;

/// Settings for the registration facade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Relying-party name placed in credential options.
    pub rp_name: String,
    /// Relying-party id. `None` omits it from the options.
    pub rp_id: Option<String>,
    pub timeout_ms: u64,
    /// Role used by `insert` and `register_credential`.
    pub default_role: Role,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rp_name: DEFAULT_RP_NAME.to_string(),
            rp_id: Some(DEFAULT_RP_ID.to_string()),
            timeout_ms: DEFAULT_CREDENTIAL_TIMEOUT_MS,
            default_role: Role::Client,
        }
    }
}
