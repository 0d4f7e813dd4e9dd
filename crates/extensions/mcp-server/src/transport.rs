//! Newline-delimited JSON-RPC transport.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::protocol::{McpError, McpMethod, McpRequest, McpResponse, RequestId};
use crate::server::McpServer;

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelledParams {
    request_id: RequestId,
}

type InFlight = Arc<DashMap<RequestId, CancellationToken>>;

/// Serve MCP over the process's stdin and stdout.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<(), TransportError> {
    let reader = BufReader::new(tokio::io::stdin());
    serve(server, reader, tokio::io::stdout()).await
}

/// Serve MCP over any line-oriented reader and writer until the reader ends.
///
/// Requests run concurrently; responses are written in completion order.
/// Finished request tasks are reaped as the session runs. Requests still
/// running at end of input are awaited before returning.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, mut writer: W) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<McpResponse>();
    let in_flight: InFlight = Arc::new(DashMap::new());
    let mut tasks = JoinSet::new();
    let mut lines = reader.lines();

    info!("MCP server listening");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                dispatch(&server, &line, &tx, &in_flight, &mut tasks);
            }
            Some(response) = rx.recv() => write_response(&mut writer, &response).await?,
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => reap(joined),
        }
    }

    debug!(pending = tasks.len(), "Input closed; waiting for running requests");
    while let Some(joined) = tasks.join_next().await {
        reap(joined);
    }
    drop(tx);
    while let Some(response) = rx.recv().await {
        write_response(&mut writer, &response).await?;
    }
    info!("MCP server stopped");
    Ok(())
}

fn dispatch(
    server: &Arc<McpServer>,
    line: &str,
    tx: &mpsc::UnboundedSender<McpResponse>,
    in_flight: &InFlight,
    tasks: &mut JoinSet<()>,
) {
    let request: McpRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Unreadable message");
            let response = McpResponse::error(
                None,
                McpError::parse_error().with_data(serde_json::json!(e.to_string())),
            );
            let _ = tx.send(response);
            return;
        }
    };

    if request.method == McpMethod::Cancelled.as_str() {
        cancel_request(request.params, in_flight);
        return;
    }

    let cancel = CancellationToken::new();
    if let Some(id) = &request.id {
        in_flight.insert(id.clone(), cancel.clone());
    }

    let server = server.clone();
    let tx = tx.clone();
    let in_flight = in_flight.clone();
    tasks.spawn(async move {
        let id = request.id.clone();
        let response = server.handle(request, cancel).await;
        if let Some(id) = id {
            in_flight.remove(&id);
        }
        if let Some(response) = response {
            let _ = tx.send(response);
        }
    });
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Request task failed");
    }
}

fn cancel_request(params: Option<serde_json::Value>, in_flight: &InFlight) {
    let Some(params) = params.and_then(|p| serde_json::from_value::<CancelledParams>(p).ok()) else {
        debug!("Cancellation without a request id ignored");
        return;
    };
    match in_flight.get(&params.request_id) {
        Some(token) => {
            info!(request_id = ?params.request_id, "Cancelling request");
            token.cancel();
        }
        None => debug!(request_id = ?params.request_id, "Cancellation for unknown request"),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &McpResponse,
) -> Result<(), TransportError> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = TransportError::Io(io_err);
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_transport_error_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json {").unwrap_err();
        let err = TransportError::Json(json_err);
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_cancelled_params() {
        let params: CancelledParams =
            serde_json::from_value(serde_json::json!({"requestId": 3, "reason": "user"})).unwrap();
        assert_eq!(params.request_id, RequestId::Number(3));
    }

    #[tokio::test]
    async fn test_reap_absorbs_failed_task() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { panic!("request handler panicked") });
        tasks.spawn(async {});
        while let Some(joined) = tasks.join_next().await {
            reap(joined);
        }
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_cancel_request_fires_token() {
        let in_flight: InFlight = Arc::new(DashMap::new());
        let token = CancellationToken::new();
        in_flight.insert(RequestId::String("a".to_string()), token.clone());

        cancel_request(Some(serde_json::json!({"requestId": "a"})), &in_flight);
        assert!(token.is_cancelled());

        cancel_request(Some(serde_json::json!({})), &in_flight);
        cancel_request(None, &in_flight);
    }
}
