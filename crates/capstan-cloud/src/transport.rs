//! One-shot HTTP/1.1 requests to a control plane.
//!
//! Each call opens a fresh connection, sends a single request, and collects
//! the body. Invocations are rare (one per scheduled pass), so connection
//! reuse buys nothing. No timeouts here — cancellation is the scheduling
//! trigger's responsibility.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tracing::debug;

use capstan_core::{ScaleError, ScaleResult};

const USER_AGENT: &str = "capstan-cloud/0.1";

/// Issue a single request over a fresh connection and collect the body.
pub(crate) async fn send(
    address: &str,
    req: http::Request<Full<Bytes>>,
) -> ScaleResult<(http::StatusCode, Bytes)> {
    let stream = tokio::net::TcpStream::connect(address)
        .await
        .map_err(|e| ScaleError::Transport(format!("connect {address}: {e}")))?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| ScaleError::Transport(format!("handshake {address}: {e}")))?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let uri = req.uri().clone();
    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| ScaleError::Transport(format!("request {uri}: {e}")))?;

    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| ScaleError::Transport(format!("read body {uri}: {e}")))?
        .to_bytes();

    debug!(%uri, %status, bytes = body.len(), "control plane response");
    Ok((status, body))
}

/// GET `path` from `address`.
pub(crate) async fn get(address: &str, path: &str) -> ScaleResult<(http::StatusCode, Bytes)> {
    let req = http::Request::builder()
        .method("GET")
        .uri(format!("http://{address}{path}"))
        .header("host", address)
        .header("user-agent", USER_AGENT)
        .body(Full::new(Bytes::new()))
        .map_err(|e| ScaleError::Transport(format!("build request: {e}")))?;
    send(address, req).await
}

/// POST a JSON `body` to `path` on `address`.
pub(crate) async fn post_json<T: serde::Serialize>(
    address: &str,
    path: &str,
    body: &T,
) -> ScaleResult<(http::StatusCode, Bytes)> {
    let payload = serde_json::to_vec(body)
        .map_err(|e| ScaleError::Transport(format!("encode request body: {e}")))?;
    let req = http::Request::builder()
        .method("POST")
        .uri(format!("http://{address}{path}"))
        .header("host", address)
        .header("user-agent", USER_AGENT)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(payload)))
        .map_err(|e| ScaleError::Transport(format!("build request: {e}")))?;
    send(address, req).await
}

/// Decode a JSON response body.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: &Bytes) -> ScaleResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| ScaleError::Transport(format!("decode response body: {e}")))
}
