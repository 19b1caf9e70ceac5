//! Derivation entry points used by the node runtime and the registry.

use tracing::debug;

use super::entities::Identity;
use super::errors::IdentityError;
use super::value_objects::Role;

/// Derive the identity for `role` from a seed.
///
/// `None` derives the environment node (`m/369/0`).
pub fn derive(seed: &[u8], role: Option<Role>) -> Result<Identity, IdentityError> {
    let role = role.unwrap_or_default();
    let identity = Identity::from_seed(seed)?.derive_path(&role.path())?;
    debug!(
        role = %role,
        path = %identity.path(),
        peer_id = identity.peer_id().short(),
        "Identity derived"
    );
    Ok(identity)
}

/// Derive from a free-form role name. Unknown names derive the environment
/// node and log a warning.
pub fn derive_for_role_name(seed: &[u8], name: &str) -> Result<Identity, IdentityError> {
    derive(seed, Some(Role::from_name_lenient(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &[u8] = b"hypergraph mesh test seed 000001";

    #[test]
    fn test_host_derives_at_host_path() {
        let host = derive(SEED, Some(Role::Host)).unwrap();
        assert_eq!(host.path().to_string(), "m/369/0/0");
    }

    #[test]
    fn test_default_role_is_environment() {
        let env = derive(SEED, None).unwrap();
        assert_eq!(env.path().to_string(), "m/369/0");
        assert_eq!(env, derive(SEED, Some(Role::Environment)).unwrap());
    }

    #[test]
    fn test_client_and_host_have_distinct_peer_ids() {
        let host = derive(SEED, Some(Role::Host)).unwrap();
        let client = derive(SEED, Some(Role::Client)).unwrap();
        assert_ne!(host.peer_id(), client.peer_id());
    }

    #[test]
    fn test_unknown_role_name_uses_environment() {
        let fallback = derive_for_role_name(SEED, "validator").unwrap();
        assert_eq!(fallback, derive(SEED, None).unwrap());

        let provider = derive_for_role_name(SEED, "provider").unwrap();
        assert_eq!(provider.path().to_string(), "m/369/0/1");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive(SEED, Some(Role::Context)).unwrap();
        let b = derive(SEED, Some(Role::Context)).unwrap();
        assert_eq!(a.peer_id(), b.peer_id());
    }
}
