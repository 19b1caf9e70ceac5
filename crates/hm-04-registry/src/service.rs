//! # Registry Service
//!
//! Mints entity identities below the environment node and indexes them in
//! two tries: name to path, path to key material.
//!
//! ```text
//! search("jane_doe")
//!   LayerTrie:    jane_doe        ──▶ m/369/0/2/0'
//!   ProtocolTrie: m/369/0/2/0'    ──▶ KeyMaterial
//! ```

use hm_01_identity::{derive, DerivationPath, Identity, Role};
use parking_lot::RwLock;
use rand::RngCore;
use shared_crypto::HARDENED_OFFSET;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

use crate::domain::{
    CredentialOptions, KeyMaterial, LayerTrie, ProtocolTrie, RegistryConfig, RegistryError,
    SealedKey, CHALLENGE_LEN,
};

/// Registration and lookup facade.
///
/// Entity `n` of role `r` lives at `m/369/0/<r>/<n>'`. The counter is shared
/// across roles and never reused, so every entity has a distinct path.
pub struct Registry {
    environment: Identity,
    config: RegistryConfig,
    names: RwLock<LayerTrie>,
    keys: RwLock<ProtocolTrie>,
    next_entity: AtomicU32,
}

impl Registry {
    /// Derive the environment node from `root_seed`.
    pub fn new(root_seed: &[u8], config: RegistryConfig) -> Result<Self, RegistryError> {
        let environment = derive(root_seed, None)?;
        info!(
            root = %environment.path(),
            peer_id = environment.peer_id().short(),
            "Registry initialized"
        );
        Ok(Self {
            environment,
            config,
            names: RwLock::new(LayerTrie::new()),
            keys: RwLock::new(ProtocolTrie::new()),
            next_entity: AtomicU32::new(0),
        })
    }

    /// Register `name` under the configured default role.
    pub fn insert(&self, name: &str) -> Result<Identity, RegistryError> {
        self.insert_with_role(name, self.config.default_role)
    }

    /// Register `name` under `role` with a fresh identity.
    ///
    /// Registering an existing name rebinds it to the new identity.
    pub fn insert_with_role(&self, name: &str, role: Role) -> Result<Identity, RegistryError> {
        let identity = self.next_identity(role)?;
        self.store(name, KeyMaterial::Plain(identity.clone()));
        Ok(identity)
    }

    /// Two-hop lookup: name to path, then path to key material.
    pub fn search(&self, name: &str) -> Option<(DerivationPath, KeyMaterial)> {
        let Some(path) = self.names.read().search(name).cloned() else {
            debug!(name, "Registry miss: unknown name");
            return None;
        };
        let Some(material) = self.keys.read().search(&path.to_string()).cloned() else {
            debug!(name, path = %path, "Registry miss: path has no key material");
            return None;
        };
        Some((path, material))
    }

    /// Register `name` with a sealed identity and return the credential
    /// options carrying the challenge that opens it.
    pub fn register_credential(&self, name: &str) -> Result<CredentialOptions, RegistryError> {
        let identity = self.next_identity(self.config.default_role)?;

        let mut challenge = [0u8; CHALLENGE_LEN];
        rand::thread_rng().fill_bytes(&mut challenge);

        let sealed = SealedKey::seal(&identity, &challenge)?;
        self.store(name, KeyMaterial::Sealed(sealed));

        let options = CredentialOptions::new(name, &identity, &challenge, &self.config);
        info!(
            entity = name,
            path = %identity.path(),
            peer_id = identity.peer_id().short(),
            "Credential registration prepared"
        );
        Ok(options)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    /// Environment node every entity is derived from.
    pub fn environment(&self) -> &Identity {
        &self.environment
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn next_identity(&self, role: Role) -> Result<Identity, RegistryError> {
        let n = self
            .next_entity
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < HARDENED_OFFSET - 1).then_some(n + 1)
            })
            .map_err(|_| RegistryError::Exhausted)?;

        let parent = match role.index() {
            Some(index) => self.environment.derive_child(index)?,
            None => self.environment.clone(),
        };
        Ok(parent.derive_child(HARDENED_OFFSET + n)?)
    }

    fn store(&self, name: &str, material: KeyMaterial) {
        let path = material.path().clone();
        // Key material first so a concurrent search never sees a dangling name.
        self.keys.write().insert(&path.to_string(), material);
        if let Some(previous) = self.names.write().insert(name, path.clone()) {
            warn!(name, previous = %previous, path = %path, "Name rebound to new entity");
        } else {
            debug!(name, path = %path, "Entity registered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const SEED: &[u8] = b"hypergraph mesh registry seed 01";

    fn registry() -> Registry {
        Registry::new(SEED, RegistryConfig::default()).unwrap()
    }

    #[test]
    fn test_insert_then_search() {
        let registry = registry();
        let identity = registry.insert("jane_doe").unwrap();

        let (path, material) = registry.search("jane_doe").unwrap();
        assert_eq!(&path, identity.path());
        assert_eq!(material.identity(), Some(&identity));
    }

    #[test]
    fn test_unknown_name() {
        let registry = registry();
        registry.insert("jane_doe").unwrap();
        assert!(registry.search("john_doe").is_none());
        assert!(registry.search("").is_none());
    }

    #[test]
    fn test_entity_paths() {
        let registry = registry();
        let first = registry.insert("a").unwrap();
        let second = registry.insert_with_role("b", Role::Host).unwrap();
        let third = registry.insert_with_role("c", Role::Environment).unwrap();

        assert_eq!(first.path().to_string(), "m/369/0/2/0'");
        assert_eq!(second.path().to_string(), "m/369/0/0/1'");
        assert_eq!(third.path().to_string(), "m/369/0/2'");
    }

    #[test]
    fn test_entity_matches_absolute_derivation() {
        let registry = registry();
        let identity = registry.insert("jane_doe").unwrap();
        let expected = Identity::from_seed(SEED)
            .unwrap()
            .derive_path(identity.path())
            .unwrap();
        assert_eq!(identity, expected);
    }

    #[test]
    fn test_reinsert_rebinds_name() {
        let registry = registry();
        let first = registry.insert("jane_doe").unwrap();
        let second = registry.insert("jane_doe").unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(registry.search("jane_doe").unwrap().0, *second.path());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_credential_stores_sealed_key() {
        let registry = registry();
        let options = registry.register_credential("jane_doe").unwrap();

        let (path, material) = registry.search("jane_doe").unwrap();
        let KeyMaterial::Sealed(sealed) = material else {
            panic!("expected sealed key material");
        };
        let identity = sealed.open(&options.challenge_bytes().unwrap()).unwrap();

        assert_eq!(identity.path(), &path);
        assert_eq!(options.user.name, identity.peer_id().as_str());
        assert_eq!(
            options.user.id,
            format!("{}/{}", path, identity.public_key().to_hex())
        );
        assert_eq!(options.user.display_name, "jane_doe");
    }

    #[test]
    fn test_challenges_are_fresh() {
        let registry = registry();
        let a = registry.register_credential("a").unwrap();
        let b = registry.register_credential("b").unwrap();
        assert_ne!(a.challenge, b.challenge);
        assert_eq!(a.challenge.len(), CHALLENGE_LEN * 2);
    }

    #[test]
    fn test_invalid_seed() {
        assert!(matches!(
            Registry::new(&[0u8; 32], RegistryConfig::default()),
            Err(RegistryError::Identity(_))
        ));
    }

    #[test]
    fn test_concurrent_inserts_get_distinct_paths() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..4)
                        .map(|i| {
                            registry
                                .insert(&format!("entity_{t}_{i}"))
                                .unwrap()
                                .path()
                                .to_string()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let paths: HashSet<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(paths.len(), 32);
        assert_eq!(registry.len(), 32);
    }
}
