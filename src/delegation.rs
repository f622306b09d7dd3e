/// Delegation orchestrator
///
/// Sequences subject resolution, agent resolution, and the remote delegation
/// registration in a single pass with no retries. Any step's failure
/// short-circuits the rest; registration is never attempted before both
/// identities resolved.
use crate::{
    context::BridgeContext,
    error::{BridgeError, BridgeResult},
    identity::{GetIdentityOpts, IdentityKind, IdentityRef},
};
use serde_json::json;
use tracing::info;
use url::Url;

/// One delegation invocation, constructed per call and never persisted
#[derive(Debug, Clone)]
pub struct DelegationRequest {
    /// Kind of the delegating identity; never Agent
    pub subject_kind: IdentityKind,
    pub subject: GetIdentityOpts,
    pub agent: GetIdentityOpts,
    pub delegation_name: String,
    pub resolver_address: String,
}

/// Run the delegation state machine: validate, resolve subject, resolve
/// agent, register, assemble.
pub async fn delegate(
    ctx: &BridgeContext,
    request: DelegationRequest,
) -> BridgeResult<serde_json::Value> {
    let resolver_address = validate(&request)?;

    let subject = resolve_subject(ctx, request.subject_kind, &request.subject).await?;
    let agent = resolve_agent(ctx, &request.agent).await?;

    ctx.resolver
        .register_delegation(&resolver_address, &subject, &agent, &request.delegation_name)
        .await
        .map_err(|e| BridgeError::DelegationRegistration(e.to_string()))?;

    info!(
        subject = %subject.did,
        agent = %agent.did,
        name = %request.delegation_name,
        "delegation registered"
    );

    Ok(json!({
        "did": subject.did,
        "subjectType": request.subject_kind.to_string(),
        "agentDid": agent.did,
        "delegationName": request.delegation_name,
    }))
}

/// Step 1: argument validation, before any cache or network access
fn validate(request: &DelegationRequest) -> BridgeResult<Url> {
    match request.subject_kind {
        IdentityKind::User | IdentityKind::Twin => {}
        IdentityKind::Agent => {
            return Err(BridgeError::InvalidArgument(
                "delegation subject must be a user or a twin".to_string(),
            ));
        }
    }

    if request.delegation_name.is_empty() {
        return Err(BridgeError::InvalidArgument(
            "delegation name must not be empty".to_string(),
        ));
    }

    Url::parse(&request.resolver_address).map_err(|e| {
        BridgeError::InvalidArgument(format!("parsing resolver address failed: {}", e))
    })
}

/// Step 2: subject lookup through the cache
async fn resolve_subject(
    ctx: &BridgeContext,
    kind: IdentityKind,
    opts: &GetIdentityOpts,
) -> BridgeResult<IdentityRef> {
    ctx.cache
        .get_or_fetch(kind, &opts.did, || ctx.provider.get_identity(kind, opts))
        .await
        .map_err(|e| BridgeError::SubjectResolution(e.to_string()))
}

/// Step 3: agent lookup through the cache, kind forced to Agent
async fn resolve_agent(ctx: &BridgeContext, opts: &GetIdentityOpts) -> BridgeResult<IdentityRef> {
    ctx.cache
        .get_or_fetch(IdentityKind::Agent, &opts.did, || {
            ctx.provider.get_identity(IdentityKind::Agent, opts)
        })
        .await
        .map_err(|e| BridgeError::AgentResolution(e.to_string()))
}
