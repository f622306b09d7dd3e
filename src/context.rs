/// Application context and dependency injection
use crate::{
    bridge::CommandBridge,
    config::BridgeConfig,
    error::BridgeResult,
    identity::{CacheConfig, IdentityCache, IdentityProvider, LocalIdentityProvider},
    resolver::{ResolverClient, RestResolverClient},
};
use std::sync::Arc;
use std::time::Duration;

/// Shared services handed to the command table and orchestrator
///
/// The identity cache is owned here, not by a global: whoever assembles the
/// process owns its lifecycle.
#[derive(Clone)]
pub struct BridgeContext {
    pub config: Arc<BridgeConfig>,
    pub cache: Arc<IdentityCache>,
    pub provider: Arc<dyn IdentityProvider>,
    pub resolver: Arc<dyn ResolverClient>,
    pub bridge: CommandBridge,
}

impl BridgeContext {
    /// Assemble the context with the default collaborator bindings
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;

        let resolver = Arc::new(RestResolverClient::new(
            &config.resolver.user_agent,
            Duration::from_secs(config.resolver.timeout_seconds),
        )?);
        let provider = Arc::new(LocalIdentityProvider::new(config.token.secret.clone()));

        Ok(Self::with_collaborators(config, provider, resolver))
    }

    /// Assemble the context around explicit collaborator implementations
    pub fn with_collaborators(
        config: BridgeConfig,
        provider: Arc<dyn IdentityProvider>,
        resolver: Arc<dyn ResolverClient>,
    ) -> Self {
        let cache = Arc::new(IdentityCache::new(CacheConfig::new(
            config.cache_ttl(),
            config.cache.max_size,
        )));

        Self {
            config: Arc::new(config),
            cache,
            provider,
            resolver,
            bridge: CommandBridge::new(),
        }
    }
}
