//! In-test control-plane stub: canned JSON responses on an ephemeral port.

use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

/// Serve `(path, status, body)` routes on 127.0.0.1:0.
///
/// Unknown paths answer 404 with an empty JSON object. Query strings are
/// ignored when matching. The accept loop lives until the runtime drops.
pub(crate) async fn spawn(routes: Vec<(&'static str, u16, &'static str)>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let routes = routes.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        let (status, body) = routes
                            .iter()
                            .find(|(p, _, _)| *p == path)
                            .map(|(_, s, b)| (*s, *b))
                            .unwrap_or((404, "{}"));
                        Ok::<_, hyper::Error>(
                            hyper::Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from(body)))
                                .unwrap(),
                        )
                    }
                });
                let _ = http1::Builder::new().serve_connection(io, svc).await;
            });
        }
    });

    addr
}
