/// Host binding surface: newline-delimited JSON over stdin/stdout
///
/// The host writes one request per line, `{id, command, args}`, and receives
/// one response line per request carrying the same id. Requests are
/// dispatched through the bridge on their own tasks, so responses complete
/// out of order; a single writer task keeps each output line atomic.
use crate::{
    bridge::CommandOutcome,
    commands,
    context::BridgeContext,
    error::{BridgeResult, ErrorBody},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// One host request line
#[derive(Debug, Deserialize)]
struct HostRequest {
    #[serde(default)]
    id: Value,
    command: String,
    #[serde(default)]
    args: Vec<Value>,
}

/// Run the host loop until `exit`, EOF, or an interrupt signal
///
/// After shutdown fires no further operations are dispatched; in-flight
/// tasks are abandoned when the process terminates.
pub async fn run(ctx: BridgeContext) -> BridgeResult<()> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.write_all(b"\n").await;
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("identity bridge ready");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("exit requested, shutting down");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => handle_line(&ctx, line, out_tx.clone(), shutdown_tx.clone()),
                None => {
                    info!("host input closed, shutting down");
                    break;
                }
            },
        }
    }

    drop(out_tx);
    let _ = writer.await;
    Ok(())
}

/// Parse one request line and dispatch it without blocking the loop
fn handle_line(
    ctx: &BridgeContext,
    line: String,
    out_tx: mpsc::Sender<String>,
    shutdown_tx: watch::Sender<bool>,
) {
    let request: HostRequest = match serde_json::from_str(&line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed host request");
            let body = serde_json::json!({
                "id": Value::Null,
                "error": "InvalidArgument",
                "message": format!("malformed request: {}", e),
            });
            let out_tx = out_tx.clone();
            tokio::spawn(async move {
                let _ = out_tx.send(body.to_string()).await;
            });
            return;
        }
    };

    let is_exit = request.command == "exit";
    let handle = commands::dispatch(ctx, request.command, request.args);

    tokio::spawn(async move {
        let outcome = handle.resolve().await;
        let response = render_response(request.id, outcome);
        let _ = out_tx.send(response.to_string()).await;
        if is_exit {
            let _ = shutdown_tx.send(true);
        }
    });
}

/// Fold the request id into the single success/failure resolution
fn render_response(id: Value, outcome: CommandOutcome) -> Value {
    match outcome {
        Ok(Value::Object(mut payload)) => {
            payload.insert("id".to_string(), id);
            Value::Object(payload)
        }
        Ok(other) => serde_json::json!({"id": id, "result": other}),
        Err(err) => {
            let body = ErrorBody::from(&err);
            serde_json::json!({
                "id": id,
                "error": body.error,
                "message": body.message,
            })
        }
    }
}
