/// Command result bridge
///
/// Runs a fallible operation on its own tokio task and delivers exactly one
/// outcome through a oneshot channel, so the host's control loop never blocks
/// on network or crypto work. Dispatched operations cannot be cancelled: once
/// spawned they run to completion even if the handle is dropped, and the
/// undeliverable outcome is discarded.
use crate::error::{BridgeError, BridgeResult};
use std::future::Future;
use tokio::sync::oneshot;

/// The single resolution delivered per invocation
pub type CommandOutcome = BridgeResult<serde_json::Value>;

/// Pending result of a dispatched operation
pub struct CommandHandle {
    rx: oneshot::Receiver<CommandOutcome>,
}

impl CommandHandle {
    /// Await the operation's single resolution
    pub async fn resolve(self) -> CommandOutcome {
        self.rx.await.unwrap_or_else(|_| {
            // The task panicked or was torn down at shutdown before sending.
            Err(BridgeError::Io(std::io::Error::other(
                "operation terminated without delivering a result",
            )))
        })
    }
}

/// Dispatcher for host-issued operations
#[derive(Debug, Clone, Default)]
pub struct CommandBridge;

impl CommandBridge {
    pub fn new() -> Self {
        Self
    }

    /// Run `op` concurrently and return its pending handle
    ///
    /// No ordering is guaranteed between concurrently dispatched operations;
    /// each delivers its own resolution whenever it finishes.
    pub fn dispatch<F>(&self, op: F) -> CommandHandle
    where
        F: Future<Output = CommandOutcome> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = op.await;
            // The host may have lost interest; the operation still ran.
            let _ = tx.send(outcome);
        });
        CommandHandle { rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_success_resolves_with_payload() {
        let bridge = CommandBridge::new();
        let handle = bridge.dispatch(async { Ok(json!({"result": "pong"})) });
        let outcome = handle.resolve().await.unwrap();
        assert_eq!(outcome["result"], "pong");
    }

    #[tokio::test]
    async fn test_failure_resolves_with_error() {
        let bridge = CommandBridge::new();
        let handle =
            bridge.dispatch(async { Err(BridgeError::InvalidArgument("bad arity".to_string())) });
        let err = handle.resolve().await.unwrap_err();
        assert_eq!(err.error_code(), "InvalidArgument");
    }

    #[tokio::test]
    async fn test_dropped_handle_still_runs_operation() {
        let bridge = CommandBridge::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_task = Arc::clone(&ran);

        let handle = bridge.dispatch(async move {
            ran_in_task.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"ok": true}))
        });
        drop(handle);

        // Give the spawned task a chance to finish.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_resolve_independently() {
        let bridge = CommandBridge::new();
        let handles: Vec<_> = (0..100)
            .map(|i| bridge.dispatch(async move { Ok(json!({ "n": i })) }))
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let outcome = handle.resolve().await.unwrap();
            assert_eq!(outcome["n"], i as u64);
        }
    }
}
