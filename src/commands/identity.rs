/// Identity command handlers: seed, identity creation, documents, tokens
use crate::{
    bridge::CommandOutcome,
    commands::{expect_arity, object_arg, parse_integer, string_arg},
    context::BridgeContext,
    error::{BridgeError, BridgeResult},
    identity::{GetIdentityOpts, IdentityKind},
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;
use url::Url;

/// create-default-seed: [] -> {seed, mnemonics}
pub async fn create_default_seed(ctx: &BridgeContext) -> CommandOutcome {
    let bundle = ctx
        .provider
        .create_default_seed()
        .await
        .map_err(|e| BridgeError::Provider(format!("unable to create default seed: {}", e)))?;

    Ok(json!({
        "seed": bundle.seed,
        "mnemonics": bundle.mnemonics,
    }))
}

/// create-{user,agent,twin}-identity: [resolverAddress, options] -> {did}
pub async fn create_identity(
    ctx: &BridgeContext,
    kind: IdentityKind,
    args: &[Value],
) -> CommandOutcome {
    expect_arity(args, 2, "resolverAddress, identityOpts")?;
    let resolver_address = parse_resolver_address(&string_arg(args, 0, "resolverAddress")?)?;
    let opts = object_arg(args, 1, "identityOpts")?;

    let identity = ctx
        .provider
        .create_identity(kind, &resolver_address, &opts)
        .await?;
    info!(kind = %kind, did = %identity.did, "identity created");

    Ok(json!({"did": identity.did}))
}

/// get-registered-document: [resolverAddress, did] -> {doc}
pub async fn get_registered_document(ctx: &BridgeContext, args: &[Value]) -> CommandOutcome {
    expect_arity(args, 2, "resolverAddress, did")?;
    let resolver_address = parse_resolver_address(&string_arg(args, 0, "resolverAddress")?)?;
    let did = string_arg(args, 1, "did")?;

    let document = ctx.resolver.get_document(&resolver_address, &did).await?;
    let doc = serde_json::to_string(&document).map_err(|e| {
        BridgeError::Serialization(format!("unable to marshal document into json: {}", e))
    })?;

    Ok(json!({"doc": doc}))
}

/// create-agent-auth-token: [agentOptions, subjectDid, durationMs, audience] -> {token}
///
/// The duration is validated before any cache or provider access.
pub async fn create_agent_auth_token(ctx: &BridgeContext, args: &[Value]) -> CommandOutcome {
    expect_arity(args, 4, "agentOptions, subjectDid, duration(ms), audience")?;
    let agent_opts: GetIdentityOpts = object_arg(args, 0, "agentOptions")?;
    let subject_did = string_arg(args, 1, "subjectDid")?;
    let duration_ms = parse_integer(&args[2], "duration(ms)")?;
    let audience = string_arg(args, 3, "audience")?;

    if duration_ms < 1 {
        return Err(BridgeError::InvalidArgument(
            "invalid duration in millis - must be a positive integer".to_string(),
        ));
    }
    let duration = Duration::from_millis(duration_ms as u64);

    let agent = ctx
        .cache
        .get_or_fetch(IdentityKind::Agent, &agent_opts.did, || {
            ctx.provider.get_identity(IdentityKind::Agent, &agent_opts)
        })
        .await
        .map_err(|e| BridgeError::AgentResolution(e.to_string()))?;

    let token = ctx
        .provider
        .create_auth_token(&agent, &subject_did, duration, &audience)
        .await
        .map_err(|e| BridgeError::Provider(format!("unable to generate token: {}", e)))?;

    Ok(json!({"token": token}))
}

fn parse_resolver_address(address: &str) -> BridgeResult<Url> {
    Url::parse(address).map_err(|e| {
        BridgeError::InvalidArgument(format!("parsing resolver address failed: {}", e))
    })
}
