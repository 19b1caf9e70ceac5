//! # Credential Creation Options
//!
//! Public-key credential options handed to an authenticator when an entity
//! registers. Field names follow the WebAuthn JSON shape.

use hm_01_identity::Identity;
use serde::{Deserialize, Serialize};

use super::value_objects::RegistryConfig;

/// COSE algorithm id for ES256.
pub const ALG_ES256: i64 = -7;
/// COSE algorithm id for RS256.
pub const ALG_RS256: i64 = -257;

/// Byte length of a registration challenge.
pub const CHALLENGE_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOptions {
    /// Hex-encoded random challenge.
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: CredentialUser,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub authenticator_selection: AuthenticatorSelection,
    pub timeout: u64,
    pub attestation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUser {
    /// `<derivation path>/<public key hex>`.
    pub id: String,
    /// Peer id of the registered identity.
    pub name: String,
    /// Entity name as given at registration.
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub kind: String,
    pub alg: i64,
}

impl PubKeyCredParam {
    fn public_key(alg: i64) -> Self {
        Self {
            kind: "public-key".to_string(),
            alg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub user_verification: String,
    pub resident_key: String,
    pub require_resident_key: bool,
}

impl Default for AuthenticatorSelection {
    fn default() -> Self {
        Self {
            user_verification: "preferred".to_string(),
            resident_key: "required".to_string(),
            require_resident_key: true,
        }
    }
}

impl CredentialOptions {
    /// Options for `identity` registered under `entity`.
    pub fn new(
        entity: &str,
        identity: &Identity,
        challenge: &[u8; CHALLENGE_LEN],
        config: &RegistryConfig,
    ) -> Self {
        Self {
            challenge: hex::encode(challenge),
            rp: RelyingParty {
                name: config.rp_name.clone(),
                id: config.rp_id.clone(),
            },
            user: CredentialUser {
                id: format!("{}/{}", identity.path(), identity.public_key().to_hex()),
                name: identity.peer_id().to_string(),
                display_name: entity.to_string(),
            },
            pub_key_cred_params: vec![
                PubKeyCredParam::public_key(ALG_ES256),
                PubKeyCredParam::public_key(ALG_RS256),
            ],
            authenticator_selection: AuthenticatorSelection::default(),
            timeout: config.timeout_ms,
            attestation: "direct".to_string(),
        }
    }

    /// Raw challenge bytes.
    pub fn challenge_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.challenge)
    }
}
