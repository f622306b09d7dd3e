/// Test support: in-memory collaborator bindings with call counters
///
/// Used by unit and integration tests to observe exactly how many provider
/// and resolver calls an operation performed.
use crate::{
    error::{BridgeError, BridgeResult},
    identity::{
        CreateIdentityOpts, GetIdentityOpts, IdentityKind, IdentityProvider, IdentityRef,
        SeedBundle,
    },
    resolver::ResolverClient,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Identity provider that counts calls and returns deterministic references
#[derive(Debug, Default)]
pub struct CountingProvider {
    create_calls: AtomicUsize,
    get_calls: AtomicUsize,
    token_calls: AtomicUsize,
    fail_gets: AtomicBool,
}

impl CountingProvider {
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    /// Make all subsequent identity lookups fail
    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    fn reference(did: &str, kind: IdentityKind, key: &str) -> IdentityRef {
        IdentityRef {
            did: did.to_string(),
            kind,
            key_name: key.to_string(),
            document: serde_json::json!({"id": did, "type": kind.to_string()}),
        }
    }
}

#[async_trait]
impl IdentityProvider for CountingProvider {
    async fn create_default_seed(&self) -> BridgeResult<SeedBundle> {
        Ok(SeedBundle {
            seed: "ABC123".to_string(),
            mnemonics: "amber birch cedar delta".to_string(),
        })
    }

    async fn create_identity(
        &self,
        kind: IdentityKind,
        _resolver_address: &Url,
        opts: &CreateIdentityOpts,
    ) -> BridgeResult<IdentityRef> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let did = format!("did:iot:{}-{}", kind, opts.key);
        Ok(Self::reference(&did, kind, &opts.key))
    }

    async fn get_identity(
        &self,
        kind: IdentityKind,
        opts: &GetIdentityOpts,
    ) -> BridgeResult<IdentityRef> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(BridgeError::Provider(
                "simulated provider failure".to_string(),
            ));
        }
        let did = if opts.did.is_empty() {
            format!("did:iot:{}-{}", kind, opts.key)
        } else {
            opts.did.clone()
        };
        Ok(Self::reference(&did, kind, &opts.key))
    }

    async fn create_auth_token(
        &self,
        agent: &IdentityRef,
        subject_did: &str,
        duration: Duration,
        audience: &str,
    ) -> BridgeResult<String> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "token:{}:{}:{}:{}",
            agent.did,
            subject_did,
            duration.as_millis(),
            audience
        ))
    }
}

/// Resolver client that records delegations instead of making HTTP calls
#[derive(Debug, Default)]
pub struct RecordingResolver {
    document_calls: AtomicUsize,
    delegation_calls: AtomicUsize,
    fail_delegations: AtomicBool,
}

impl RecordingResolver {
    pub fn documents(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn delegations(&self) -> usize {
        self.delegation_calls.load(Ordering::SeqCst)
    }

    /// Make all subsequent delegation registrations fail
    pub fn fail_delegations(&self) {
        self.fail_delegations.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResolverClient for RecordingResolver {
    async fn get_document(
        &self,
        _resolver_address: &Url,
        did: &str,
    ) -> BridgeResult<serde_json::Value> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({"id": did}))
    }

    async fn register_delegation(
        &self,
        _resolver_address: &Url,
        _subject: &IdentityRef,
        _agent: &IdentityRef,
        _delegation_name: &str,
    ) -> BridgeResult<()> {
        self.delegation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delegations.load(Ordering::SeqCst) {
            return Err(BridgeError::RemoteOperation(
                "simulated resolver failure".to_string(),
            ));
        }
        Ok(())
    }
}
