//! # Registry Flows
//!
//! Registration, two-hop lookup and the sealed credential round trip, plus
//! how registry entities relate to node identities from the same seed.

#[cfg(test)]
mod tests {
    use hm_01_identity::{derive, Identity, Role};
    use hm_04_registry::{KeyMaterial, Registry, RegistryConfig};
    use shared_crypto::recover_public_key;

    const SEED: &[u8] = b"hypergraph mesh integration seed";

    fn registry() -> Registry {
        Registry::new(SEED, RegistryConfig::default()).unwrap()
    }

    /// Test: insert("jane_doe") then search("jane_doe") yields its path
    #[test]
    fn test_jane_doe_round_trip() {
        let registry = registry();
        let jane = registry.insert("jane_doe").unwrap();

        let (path, material) = registry.search("jane_doe").unwrap();
        assert_eq!(&path, jane.path());
        assert!(path.starts_with(&Role::Client.path()));
        assert_eq!(material.identity(), Some(&jane));
        assert!(registry.search("john_doe").is_none());
    }

    /// Test: registered identities sign like any other identity
    #[test]
    fn test_registered_identity_signs() {
        let registry = registry();
        registry.insert("signer").unwrap();

        let (_, material) = registry.search("signer").unwrap();
        let identity = material.identity().unwrap();
        let message = [0x5a; 32];
        let signature = identity.sign(&message).unwrap();
        assert_eq!(
            &recover_public_key(&message, &signature).unwrap(),
            identity.public_key()
        );
    }

    /// Test: the credential challenge opens the sealed entity, and the
    /// options describe that entity
    #[test]
    fn test_credential_round_trip() {
        let registry = registry();
        let options = registry.register_credential("alice").unwrap();

        let (path, material) = registry.search("alice").unwrap();
        let KeyMaterial::Sealed(sealed) = material else {
            panic!("credential registration must store sealed key material");
        };
        assert!(sealed.open(&[0u8; 32]).is_err());

        let identity = sealed.open(&options.challenge_bytes().unwrap()).unwrap();
        assert_eq!(identity.path(), &path);
        assert_eq!(options.user.name, identity.peer_id().as_str());
        assert_eq!(options.user.display_name, "alice");

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["rp"]["name"], "HD Wallet Authentication");
        assert_eq!(json["pubKeyCredParams"].as_array().unwrap().len(), 2);
    }

    /// Test: entities never collide with role nodes or with each other
    #[test]
    fn test_entities_distinct_from_node_identities() {
        let registry = registry();
        let roles: Vec<Identity> = Role::ALL
            .iter()
            .map(|role| derive(SEED, Some(*role)).unwrap())
            .collect();

        let entities: Vec<Identity> = Role::ALL
            .iter()
            .enumerate()
            .map(|(i, role)| registry.insert_with_role(&format!("e{i}"), *role).unwrap())
            .collect();

        for entity in &entities {
            for node in &roles {
                assert_ne!(entity.peer_id(), node.peer_id());
                assert_ne!(entity.path(), node.path());
            }
        }
        assert_eq!(registry.environment(), &roles[0]);
        assert_eq!(registry.len(), Role::ALL.len());
    }

    /// Test: two registries on the same seed mint the same entities in the
    /// same order
    #[test]
    fn test_registration_is_deterministic() {
        let a = registry();
        let b = registry();
        for name in ["one", "two", "three"] {
            assert_eq!(a.insert(name).unwrap(), b.insert(name).unwrap());
        }
    }
}
