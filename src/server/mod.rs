//! Pull-mode HTTP status server.
//!
//! Answers `GET /?key=<key>&host=<host>` by probing `host` once and mapping
//! the verdict onto the response:
//!
//! | Condition | Status | Body |
//! |-----------|--------|------|
//! | `key` missing | 401 | empty |
//! | `host` missing | 404 | empty |
//! | probe error | 500 | error text |
//! | ICMP, all replies | 200 | `OK` |
//! | ICMP, some lost | 503 | `Received R packets out of S` |
//! | ICMP, all lost | 500 | `Received 0 packets out of S` |
//! | HTTP target | target's status | target's status text |
//!
//! The key is not checked against anything; any non-empty value is accepted.
//!
//! # Example
//!
//! ```rust,ignore
//! use pingwatch::probe::NetworkProber;
//! use pingwatch::server::QueryServer;
//!
//! let server = QueryServer::new("0.0.0.0:8080".parse()?, NetworkProber::for_query()?);
//! server.run().await?;
//! ```

mod query;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::classify::classify_query;
use crate::probe::{Prober, Target};

pub use query::{decode_component, StatusQuery};

/// Query server failure.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),
}

/// Synchronous status query server.
pub struct QueryServer<P: Prober + 'static> {
    addr: SocketAddr,
    prober: Arc<P>,
}

impl<P: Prober + 'static> QueryServer<P> {
    pub fn new(addr: SocketAddr, prober: P) -> Self {
        Self {
            addr,
            prober: Arc::new(prober),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind the configured address and serve until an accept error.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        info!("Listening on http://{}", self.addr);
        serve(listener, Arc::clone(&self.prober)).await
    }
}

/// Accept connections on `listener`, one task per connection.
pub async fn serve<P: Prober + 'static>(
    listener: TcpListener,
    prober: Arc<P>,
) -> Result<(), ServerError> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(ServerError::Accept)?;
        let _ = stream.set_nodelay(true);
        let prober = Arc::clone(&prober);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let p = Arc::clone(&prober);
                async move { handle_query(req, p).await }
            });

            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, "connection error: {}", e);
            }
        });
    }
}

/// Handle one status query.
async fn handle_query<P: Prober + ?Sized>(
    req: Request<IncomingBody>,
    prober: Arc<P>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = StatusQuery::parse(req.uri().query().unwrap_or(""));

    let (status, body) = match (query.key, query.host) {
        (None, _) => (StatusCode::UNAUTHORIZED, String::new()),
        (Some(_), None) => (StatusCode::NOT_FOUND, String::new()),
        (Some(_), Some(host)) => {
            let target = Target::parse(&host);
            let result = prober.probe(&target).await;
            let verdict = classify_query(&result);
            debug!(probe = %target, code = verdict.code, "{}", verdict.message);
            (
                StatusCode::from_u16(verdict.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                verdict.message,
            )
        }
    };

    info!(
        target: "access",
        method = %method,
        path = %path,
        status = status.as_u16() as u64,
        bytes = body.len() as u64,
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "status query"
    );

    Ok(text_response(status, body))
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
