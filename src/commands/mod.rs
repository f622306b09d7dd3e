/// Command table: named operations over validated positional arguments
///
/// Maps each host-facing command to an arity-checked, typed handler and
/// dispatches it through the bridge. Validation failures surface before any
/// cache or network access.
pub mod identity;

use crate::{
    bridge::{CommandHandle, CommandOutcome},
    context::BridgeContext,
    delegation::{self, DelegationRequest},
    error::{BridgeError, BridgeResult},
    identity::IdentityKind,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Dispatch a named command onto its own task via the bridge
pub fn dispatch(ctx: &BridgeContext, command: String, args: Vec<Value>) -> CommandHandle {
    let ctx_for_task = ctx.clone();
    ctx.bridge
        .dispatch(async move { execute(&ctx_for_task, &command, &args).await })
}

/// Route a command to its handler
pub async fn execute(ctx: &BridgeContext, command: &str, args: &[Value]) -> CommandOutcome {
    debug!(command = %command, argc = args.len(), "executing command");

    match command {
        "configure-cache" => configure_cache(ctx, args),
        "create-default-seed" => {
            expect_arity(args, 0, "no arguments")?;
            identity::create_default_seed(ctx).await
        }
        "create-user-identity" => identity::create_identity(ctx, IdentityKind::User, args).await,
        "create-agent-identity" => identity::create_identity(ctx, IdentityKind::Agent, args).await,
        "create-twin-identity" => identity::create_identity(ctx, IdentityKind::Twin, args).await,
        "get-registered-document" => identity::get_registered_document(ctx, args).await,
        "create-agent-auth-token" => identity::create_agent_auth_token(ctx, args).await,
        "delegate-authentication" => delegate_command(ctx, IdentityKind::User, args).await,
        "delegate-control" => delegate_command(ctx, IdentityKind::Twin, args).await,
        "ping" => {
            expect_arity(args, 0, "no arguments")?;
            Ok(json!({"result": "pong"}))
        }
        "exit" => {
            expect_arity(args, 0, "no arguments")?;
            Ok(json!({"ok": true}))
        }
        other => Err(BridgeError::InvalidArgument(format!(
            "unknown command: {}",
            other
        ))),
    }
}

/// configure-cache: [{ttlSeconds?, maxSize?}]
///
/// Omitted fields keep their current value; both resulting values are
/// validated before either is applied.
fn configure_cache(ctx: &BridgeContext, args: &[Value]) -> CommandOutcome {
    expect_arity(args, 1, "cache config object")?;
    let config = args[0]
        .as_object()
        .ok_or_else(|| BridgeError::InvalidArgument("cache config must be an object".to_string()))?;

    let current = ctx.cache.config();
    let ttl_seconds = match config.get("ttlSeconds") {
        Some(value) => parse_integer(value, "ttlSeconds")?,
        None => current.ttl.as_secs() as i64,
    };
    let max_size = match config.get("maxSize") {
        Some(value) => parse_integer(value, "maxSize")?,
        None => current.max_size as i64,
    };

    if ttl_seconds < 1 {
        return Err(BridgeError::InvalidArgument(
            "ttlSeconds must be a positive integer".to_string(),
        ));
    }
    if max_size < 1 {
        return Err(BridgeError::InvalidArgument(
            "maxSize must be a positive integer".to_string(),
        ));
    }

    ctx.cache.reconfigure(
        std::time::Duration::from_secs(ttl_seconds as u64),
        max_size as usize,
    )?;
    Ok(json!({"ok": true}))
}

async fn delegate_command(
    ctx: &BridgeContext,
    subject_kind: IdentityKind,
    args: &[Value],
) -> CommandOutcome {
    expect_arity(
        args,
        4,
        "resolverAddress, subjectOptions, agentOptions, delegationName",
    )?;
    let request = DelegationRequest {
        subject_kind,
        resolver_address: string_arg(args, 0, "resolverAddress")?,
        subject: object_arg(args, 1, "subjectOptions")?,
        agent: object_arg(args, 2, "agentOptions")?,
        delegation_name: string_arg(args, 3, "delegationName")?,
    };
    delegation::delegate(ctx, request).await
}

// ── Argument helpers ──────────────────────────────────────────────────────────

pub(crate) fn expect_arity(args: &[Value], expected: usize, usage: &str) -> BridgeResult<()> {
    if args.len() != expected {
        return Err(BridgeError::InvalidArgument(format!(
            "required {} argument(s): {}",
            expected, usage
        )));
    }
    Ok(())
}

pub(crate) fn string_arg(args: &[Value], index: usize, name: &str) -> BridgeResult<String> {
    args[index]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| BridgeError::InvalidArgument(format!("{} must be a string", name)))
}

pub(crate) fn object_arg<T: DeserializeOwned>(
    args: &[Value],
    index: usize,
    name: &str,
) -> BridgeResult<T> {
    serde_json::from_value(args[index].clone())
        .map_err(|e| BridgeError::InvalidArgument(format!("invalid {}: {}", name, e)))
}

/// Parse an integer given either as a JSON number or as a decimal string
pub(crate) fn parse_integer(value: &Value, name: &str) -> BridgeResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| BridgeError::InvalidArgument(format!("invalid integer: {}", name))),
        Value::String(s) => s
            .parse()
            .map_err(|_| BridgeError::InvalidArgument(format!("invalid integer: {}", name))),
        _ => Err(BridgeError::InvalidArgument(format!(
            "invalid integer: {}",
            name
        ))),
    }
}
