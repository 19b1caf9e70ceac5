//! Value objects: derivation paths and peer roles.

use serde::{Deserialize, Serialize};
use shared_crypto::HARDENED_OFFSET;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::errors::IdentityError;

/// First index under the master node for every mesh identity.
pub const ROOT_INDEX: u32 = 369;

/// Second index: the environment layer all roles hang off.
pub const ENVIRONMENT_INDEX: u32 = 0;

/// A BIP32-style derivation path such as `m/369/0/2` or `m/44'/0'`.
///
/// Stored as raw child indices; an index at or above
/// [`HARDENED_OFFSET`] is hardened and renders with a trailing `'`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath {
    indices: Vec<u32>,
}

impl DerivationPath {
    /// The master path `m`.
    pub fn master() -> Self {
        Self::default()
    }

    /// Build from raw child indices.
    pub fn from_indices(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    /// Parse a path string.
    ///
    /// Accepts `m` followed by `/`-separated decimal indices below 2^31, each
    /// optionally suffixed by `'` or `h` for hardened derivation.
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        let invalid = |reason: &str| IdentityError::InvalidPath {
            path: value.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = value.trim().split('/');
        match segments.next() {
            Some("m") | Some("M") => {}
            _ => return Err(invalid("must start with 'm'")),
        }

        let mut indices = Vec::new();
        for segment in segments {
            let (digits, hardened) = match segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("segments must be decimal indices"));
            }
            let index: u32 = digits
                .parse()
                .map_err(|_| invalid("index does not fit in 32 bits"))?;
            if index >= HARDENED_OFFSET {
                return Err(invalid("index must be below 2^31"));
            }
            indices.push(if hardened { index + HARDENED_OFFSET } else { index });
        }

        Ok(Self { indices })
    }

    /// Path extended by one child index.
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    /// Raw child indices from the master.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of derivation steps below the master.
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Whether this is `m`.
    pub fn is_master(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether `prefix` is an ancestor of (or equal to) this path.
    pub fn starts_with(&self, prefix: &DerivationPath) -> bool {
        self.indices.starts_with(&prefix.indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.indices {
            if *index >= HARDENED_OFFSET {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

/// Role a peer plays in the mesh. Each role owns a fixed path.
///
/// | Role | Path |
/// |------|------|
/// | `Environment` (default) | `m/369/0` |
/// | `Host` | `m/369/0/0` |
/// | `Provider` | `m/369/0/1` |
/// | `Client` | `m/369/0/2` |
/// | `Context` | `m/369/0/3` |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Environment,
    Host,
    Provider,
    Client,
    Context,
}

impl Role {
    /// Every role, environment first.
    pub const ALL: [Role; 5] = [
        Role::Environment,
        Role::Host,
        Role::Provider,
        Role::Client,
        Role::Context,
    ];

    /// Lowercase role name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Environment => "environment",
            Role::Host => "host",
            Role::Provider => "provider",
            Role::Client => "client",
            Role::Context => "context",
        }
    }

    /// Child index below the environment node, `None` for the environment
    /// itself.
    pub fn index(&self) -> Option<u32> {
        match self {
            Role::Environment => None,
            Role::Host => Some(0),
            Role::Provider => Some(1),
            Role::Client => Some(2),
            Role::Context => Some(3),
        }
    }

    /// Absolute derivation path for this role.
    pub fn path(&self) -> DerivationPath {
        let environment = DerivationPath::from_indices(vec![ROOT_INDEX, ENVIRONMENT_INDEX]);
        match self.index() {
            Some(index) => environment.child(index),
            None => environment,
        }
    }

    /// Parse a role name, falling back to `Environment` for anything
    /// unrecognised.
    pub fn from_name_lenient(name: &str) -> Role {
        name.parse().unwrap_or_else(|_| {
            warn!(role = name, "Unknown role, falling back to environment path");
            Role::Environment
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.name() == normalized)
            .ok_or_else(|| IdentityError::UnknownRole(s.to_string()))
    }
}
