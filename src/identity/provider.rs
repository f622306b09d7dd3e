/// Identity provider capability interface and the bundled local binding
///
/// Seed generation, mnemonic encoding, key material and DID document signing
/// are collaborator concerns behind the `IdentityProvider` trait. The bridge
/// core never constructs identities itself; it only passes options through
/// and caches the returned handles.
use crate::{
    error::{BridgeError, BridgeResult},
    identity::{CreateIdentityOpts, GetIdentityOpts, IdentityKind, IdentityRef},
};
use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::Duration;
use url::Url;

/// A freshly generated seed together with its mnemonic rendering
#[derive(Debug, Clone)]
pub struct SeedBundle {
    /// Seed bytes in base58 text form
    pub seed: String,
    /// Human-transcribable mnemonic encoding of the same bytes
    pub mnemonics: String,
}

/// External identity/resolver provider capability
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Generate a new default-length seed and its mnemonics
    async fn create_default_seed(&self) -> BridgeResult<SeedBundle>;

    /// Create and register an identity of the given kind
    async fn create_identity(
        &self,
        kind: IdentityKind,
        resolver_address: &Url,
        opts: &CreateIdentityOpts,
    ) -> BridgeResult<IdentityRef>;

    /// Fetch an already registered identity of the given kind
    async fn get_identity(
        &self,
        kind: IdentityKind,
        opts: &GetIdentityOpts,
    ) -> BridgeResult<IdentityRef>;

    /// Issue an auth token for an agent acting on behalf of a subject
    async fn create_auth_token(
        &self,
        agent: &IdentityRef,
        subject_did: &str,
        duration: Duration,
        audience: &str,
    ) -> BridgeResult<String>;
}

/// In-process provider binding used by the shipped binary
///
/// Derives DIDs deterministically from (seed, key name, kind) so the same
/// options always resolve to the same identity, and issues HS256 JWTs as auth
/// tokens. Real DID-method cryptography belongs to an external provider; this
/// binding keeps the bridge operational without one.
pub struct LocalIdentityProvider {
    token_secret: String,
}

/// 16-word alphabet for the nibble-wise mnemonic rendering
const MNEMONIC_WORDS: [&str; 16] = [
    "amber", "birch", "cedar", "delta", "ember", "frost", "grove", "haze", "iris", "juniper",
    "kelp", "lunar", "moss", "nectar", "opal", "pine",
];

impl LocalIdentityProvider {
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
        }
    }

    /// Deterministic DID for a (seed, key, kind) triple
    fn derive_did(seed: &[u8], key: &str, kind: IdentityKind) -> String {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(key.as_bytes());
        hasher.update(kind.to_string().as_bytes());
        let digest = hasher.finalize();
        format!("did:iot:{}", bs58::encode(&digest[..20]).into_string())
    }

    fn document_for(did: &str, kind: IdentityKind, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": did,
            "type": kind.to_string(),
            "name": name,
        })
    }

    fn mnemonic_for(seed: &[u8]) -> String {
        let mut words = Vec::with_capacity(seed.len() * 2);
        for byte in seed {
            words.push(MNEMONIC_WORDS[(byte >> 4) as usize]);
            words.push(MNEMONIC_WORDS[(byte & 0x0f) as usize]);
        }
        words.join(" ")
    }

    fn decode_seed(seed: &str) -> BridgeResult<Vec<u8>> {
        let bytes = bs58::decode(seed)
            .into_vec()
            .map_err(|e| BridgeError::InvalidArgument(format!("invalid base58 seed: {}", e)))?;
        if bytes.is_empty() {
            return Err(BridgeError::InvalidArgument(
                "seed must not be empty".to_string(),
            ));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_default_seed(&self) -> BridgeResult<SeedBundle> {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Ok(SeedBundle {
            seed: bs58::encode(seed).into_string(),
            mnemonics: Self::mnemonic_for(&seed),
        })
    }

    async fn create_identity(
        &self,
        kind: IdentityKind,
        resolver_address: &Url,
        opts: &CreateIdentityOpts,
    ) -> BridgeResult<IdentityRef> {
        let seed = Self::decode_seed(&opts.seed)?;
        if opts.key.is_empty() {
            return Err(BridgeError::InvalidArgument(
                "key name must not be empty".to_string(),
            ));
        }

        let did = Self::derive_did(&seed, &opts.key, kind);
        tracing::debug!(kind = %kind, did = %did, resolver = %resolver_address, "creating identity");

        Ok(IdentityRef {
            document: Self::document_for(&did, kind, &opts.name),
            did,
            kind,
            key_name: opts.key.clone(),
        })
    }

    async fn get_identity(
        &self,
        kind: IdentityKind,
        opts: &GetIdentityOpts,
    ) -> BridgeResult<IdentityRef> {
        let seed = Self::decode_seed(&opts.seed)?;
        let derived = Self::derive_did(&seed, &opts.key, kind);
        if !opts.did.is_empty() && opts.did != derived {
            return Err(BridgeError::Provider(format!(
                "DID {} does not belong to the supplied seed and key",
                opts.did
            )));
        }

        Ok(IdentityRef {
            document: Self::document_for(&derived, kind, &opts.name),
            did: derived,
            kind,
            key_name: opts.key.clone(),
        })
    }

    async fn create_auth_token(
        &self,
        agent: &IdentityRef,
        subject_did: &str,
        duration: Duration,
        audience: &str,
    ) -> BridgeResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        struct Claims {
            iss: String,
            sub: String,
            aud: String,
            iat: i64,
            exp: i64,
        }

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: agent.did.clone(),
            sub: subject_did.to_string(),
            aud: audience.to_string(),
            iat: now,
            exp: now + duration.as_secs() as i64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.token_secret.as_bytes()),
        )
        .map_err(|e| BridgeError::Provider(format!("failed to generate token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new("test-secret")
    }

    fn create_opts(seed: &str, key: &str) -> CreateIdentityOpts {
        CreateIdentityOpts {
            seed: seed.to_string(),
            key: key.to_string(),
            password: None,
            name: "n1".to_string(),
            override_existing: false,
        }
    }

    #[tokio::test]
    async fn test_seed_generation_is_well_formed() {
        let bundle = provider().create_default_seed().await.unwrap();
        let bytes = bs58::decode(&bundle.seed).into_vec().unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bundle.mnemonics.split_whitespace().count(), 64);
    }

    #[tokio::test]
    async fn test_did_is_deterministic_per_seed_key_kind() {
        let p = provider();
        let resolver = Url::parse("https://resolver.example").unwrap();
        let a = p
            .create_identity(IdentityKind::Agent, &resolver, &create_opts("ABC123", "k1"))
            .await
            .unwrap();
        let b = p
            .create_identity(IdentityKind::Agent, &resolver, &create_opts("ABC123", "k1"))
            .await
            .unwrap();
        assert_eq!(a.did, b.did);

        let other_kind = p
            .create_identity(IdentityKind::User, &resolver, &create_opts("ABC123", "k1"))
            .await
            .unwrap();
        assert_ne!(a.did, other_kind.did);
    }

    #[tokio::test]
    async fn test_get_identity_rejects_foreign_did() {
        let p = provider();
        let opts = GetIdentityOpts {
            seed: "ABC123".to_string(),
            did: "did:iot:not-mine".to_string(),
            key: "k1".to_string(),
            password: None,
            name: String::new(),
        };
        let err = p.get_identity(IdentityKind::Agent, &opts).await.unwrap_err();
        assert_eq!(err.error_code(), "ProviderFailed");
    }

    #[tokio::test]
    async fn test_auth_token_is_nonempty_jwt() {
        let p = provider();
        let resolver = Url::parse("https://resolver.example").unwrap();
        let agent = p
            .create_identity(IdentityKind::Agent, &resolver, &create_opts("ABC123", "k1"))
            .await
            .unwrap();
        let token = p
            .create_auth_token(&agent, "did:iot:subject", Duration::from_secs(1), "aud")
            .await
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_invalid_seed_rejected() {
        let p = provider();
        let resolver = Url::parse("https://resolver.example").unwrap();
        let err = p
            .create_identity(IdentityKind::Agent, &resolver, &create_opts("0OIl", "k1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "InvalidArgument");
    }
}
