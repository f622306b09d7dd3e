/// End-to-end command table tests over mock collaborators
use identity_bridge::{
    commands,
    config::BridgeConfig,
    context::BridgeContext,
    testing::{CountingProvider, RecordingResolver},
};
use serde_json::{json, Value};
use std::sync::Arc;

fn test_ctx() -> (BridgeContext, Arc<CountingProvider>, Arc<RecordingResolver>) {
    let provider = Arc::new(CountingProvider::default());
    let resolver = Arc::new(RecordingResolver::default());
    let ctx = BridgeContext::with_collaborators(
        BridgeConfig::default(),
        provider.clone(),
        resolver.clone(),
    );
    (ctx, provider, resolver)
}

fn identity_opts() -> Value {
    json!({"seed": "ABC123", "key": "k1", "name": "n1", "override": false})
}

fn get_opts(did: &str) -> Value {
    json!({"seed": "ABC123", "did": did, "key": "k1", "name": "n1"})
}

#[tokio::test]
async fn create_agent_identity_end_to_end() {
    let (ctx, provider, _) = test_ctx();

    let payload = commands::execute(
        &ctx,
        "create-agent-identity",
        &[json!("https://resolver.example"), identity_opts()],
    )
    .await
    .unwrap();

    assert_eq!(payload["did"], "did:iot:agent-k1");
    assert_eq!(provider.create_calls(), 1);
}

#[tokio::test]
async fn create_identity_rejects_malformed_resolver_address() {
    let (ctx, provider, _) = test_ctx();

    let err = commands::execute(
        &ctx,
        "create-agent-identity",
        &[json!("not a url"), identity_opts()],
    )
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), "InvalidArgument");
    assert_eq!(provider.create_calls(), 0, "validation precedes the provider");
}

#[tokio::test]
async fn delegation_end_to_end_for_user_and_twin() {
    let (ctx, _, resolver) = test_ctx();

    for (command, subject_type) in [
        ("delegate-authentication", "user"),
        ("delegate-control", "twin"),
    ] {
        let payload = commands::execute(
            &ctx,
            command,
            &[
                json!("https://resolver.example"),
                get_opts("did:iot:subject"),
                get_opts("did:iot:agent"),
                json!("#deleg-1"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(payload["did"], "did:iot:subject");
        assert_eq!(payload["subjectType"], subject_type);
        assert_eq!(payload["agentDid"], "did:iot:agent");
        assert_eq!(payload["delegationName"], "#deleg-1");
    }
    assert_eq!(resolver.delegations(), 2);
}

#[tokio::test]
async fn delegation_invalid_url_never_reaches_provider() {
    let (ctx, provider, resolver) = test_ctx();

    let err = commands::execute(
        &ctx,
        "delegate-control",
        &[
            json!("not a url"),
            get_opts("did:iot:subject"),
            get_opts("did:iot:agent"),
            json!("#deleg-1"),
        ],
    )
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), "InvalidArgument");
    assert_eq!(provider.get_calls(), 0);
    assert_eq!(resolver.delegations(), 0);
}

#[tokio::test]
async fn auth_token_duration_validation_and_success() {
    let (ctx, provider, _) = test_ctx();

    let err = commands::execute(
        &ctx,
        "create-agent-auth-token",
        &[
            get_opts("did:iot:agent"),
            json!("did:iot:subject"),
            json!("-5"),
            json!("aud"),
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(err.error_code(), "InvalidArgument");
    assert_eq!(provider.get_calls(), 0);

    let payload = commands::execute(
        &ctx,
        "create-agent-auth-token",
        &[
            get_opts("did:iot:agent"),
            json!("did:iot:subject"),
            json!("1000"),
            json!("aud"),
        ],
    )
    .await
    .unwrap();
    assert!(payload["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn hundred_concurrent_pings_resolve_independently() {
    let (ctx, _, _) = test_ctx();

    let handles: Vec<_> = (0..100)
        .map(|_| commands::dispatch(&ctx, "ping".to_string(), Vec::new()))
        .collect();

    for handle in handles {
        let payload = handle.resolve().await.unwrap();
        assert_eq!(payload, json!({"result": "pong"}));
    }
}

#[tokio::test]
async fn configure_cache_rejection_preserves_previous_config() {
    let (ctx, _, _) = test_ctx();

    commands::execute(
        &ctx,
        "configure-cache",
        &[json!({"ttlSeconds": "60", "maxSize": "4"})],
    )
    .await
    .unwrap();

    let err = commands::execute(&ctx, "configure-cache", &[json!({"maxSize": 0})])
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "InvalidArgument");

    let config = ctx.cache.config();
    assert_eq!(config.ttl.as_secs(), 60);
    assert_eq!(config.max_size, 4);
}

#[tokio::test]
async fn cache_capacity_respected_across_commands() {
    let (ctx, provider, _) = test_ctx();

    commands::execute(
        &ctx,
        "configure-cache",
        &[json!({"ttlSeconds": "60", "maxSize": "2"})],
    )
    .await
    .unwrap();

    // Three distinct agents resolved through the token command.
    for did in ["did:iot:a", "did:iot:b", "did:iot:c"] {
        commands::execute(
            &ctx,
            "create-agent-auth-token",
            &[get_opts(did), json!("did:iot:subject"), json!("1000"), json!("aud")],
        )
        .await
        .unwrap();
    }
    assert_eq!(provider.get_calls(), 3);
    assert!(ctx.cache.len() <= 2, "cache never exceeds its capacity");
}

#[tokio::test]
async fn exit_and_ping_payload_shapes() {
    let (ctx, _, _) = test_ctx();

    let ping = commands::execute(&ctx, "ping", &[]).await.unwrap();
    assert_eq!(ping, json!({"result": "pong"}));

    let exit = commands::execute(&ctx, "exit", &[]).await.unwrap();
    assert_eq!(exit, json!({"ok": true}));
}
