/// Identity model and resolution
///
/// Defines the identity kinds, the opaque registered-identity handle, and the
/// option payloads passed to the identity provider. Resolution caching lives
/// in `cache`, the provider capability interface in `provider`.
pub mod cache;
pub mod provider;

pub use cache::{CacheConfig, IdentityCache};
pub use provider::{IdentityProvider, LocalIdentityProvider, SeedBundle};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an identity, selecting which provider operation applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Agent,
    Twin,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentityKind::User => "user",
            IdentityKind::Agent => "agent",
            IdentityKind::Twin => "twin",
        };
        write!(f, "{}", s)
    }
}

/// Registered identity handle returned by the provider
///
/// Opaque to the bridge core beyond the stable DID; the document payload is
/// whatever the provider registered and is never interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRef {
    pub did: String,
    pub kind: IdentityKind,
    pub key_name: String,
    pub document: serde_json::Value,
}

impl IdentityRef {
    /// Stable identifier for this identity
    pub fn did(&self) -> &str {
        &self.did
    }
}

/// Options for creating a new identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityOpts {
    /// Seed bytes in base58 text form
    pub seed: String,
    /// Key name under the seed
    pub key: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Display name
    pub name: String,
    /// Re-register even if the document already exists
    #[serde(default, rename = "override")]
    pub override_existing: bool,
}

/// Options for fetching an already registered identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetIdentityOpts {
    /// Seed bytes in base58 text form
    pub seed: String,
    /// DID of the registered identity
    pub did: String,
    pub key: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl GetIdentityOpts {
    /// Decode the base58 seed text into raw bytes
    pub fn seed_bytes(&self) -> Result<Vec<u8>, bs58::decode::Error> {
        bs58::decode(&self.seed).into_vec()
    }
}

impl CreateIdentityOpts {
    /// Decode the base58 seed text into raw bytes
    pub fn seed_bytes(&self) -> Result<Vec<u8>, bs58::decode::Error> {
        bs58::decode(&self.seed).into_vec()
    }
}
