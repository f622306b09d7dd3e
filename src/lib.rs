/// Identity Bridge
///
/// Exposes DID identity operations (create/resolve identities, issue auth
/// tokens, delegate control and authentication) to a host process over a
/// newline-delimited JSON command surface, while keeping the host's control
/// loop free of blocking network and crypto work.
///
/// The core pieces: an asynchronous command bridge delivering exactly one
/// resolution per invocation, a bounded time-expiring identity cache, and a
/// delegation orchestrator composing cached lookups with remote resolver
/// calls. Key material, DID documents, and the resolver wire protocol belong
/// to external collaborators behind the `IdentityProvider` and
/// `ResolverClient` traits.
pub mod bridge;
pub mod commands;
pub mod config;
pub mod context;
pub mod delegation;
pub mod error;
pub mod host;
pub mod identity;
pub mod resolver;
pub mod testing;

pub use bridge::{CommandBridge, CommandHandle, CommandOutcome};
pub use config::BridgeConfig;
pub use context::BridgeContext;
pub use error::{BridgeError, BridgeResult, ErrorBody};
pub use identity::{IdentityCache, IdentityKind, IdentityRef};
