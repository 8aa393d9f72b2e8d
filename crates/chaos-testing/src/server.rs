//! A loopback `warp` server that records requests and returns a canned reply

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tokio::runtime::Runtime;
use warp::{
    http::{HeaderMap, Method, StatusCode},
    hyper::body::Bytes,
    path::FullPath,
    Filter,
};

const WAIT_FOR_REQUEST: Duration = Duration::from_secs(5);

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, if any
    pub path: String,
    /// Header names are lowercase
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Answers every request with the same status and body
///
/// The server runs on its own Tokio runtime, so blocking clients can be
/// exercised from plain `#[test]` functions. Dropping it stops the server.
pub struct MockServer {
    addr: SocketAddr,
    requests: Receiver<RecordedRequest>,
    _runtime: Runtime,
}

impl MockServer {
    /// Listen on an ephemeral loopback port
    pub fn start(status: u16, body: &str) -> Result<Self> {
        let status = StatusCode::from_u16(status)?;
        let body = body.to_string();
        let (sender, requests) = channel();

        let route = warp::any()
            .and(warp::method())
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .map(
                move |method: Method, path: FullPath, query: String, headers: HeaderMap, payload: Bytes| {
                    let mut path = path.as_str().to_string();
                    if !query.is_empty() {
                        path.push('?');
                        path.push_str(&query);
                    }
                    let headers = headers
                        .iter()
                        .map(|(name, value)| {
                            (
                                name.as_str().to_string(),
                                String::from_utf8_lossy(value.as_bytes()).into_owned(),
                            )
                        })
                        .collect();
                    // The receiver is gone once the test stops waiting
                    sender
                        .send(RecordedRequest {
                            method: method.to_string(),
                            path,
                            headers,
                            body: payload.to_vec(),
                        })
                        .ok();

                    let reply = warp::reply::with_header(body.clone(), "content-type", "text/plain");
                    warp::reply::with_status(warp::reply::with_header(reply, "x-stub", "yes"), status)
                },
            );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("chaos-mock-server")
            .enable_all()
            .build()?;
        let (addr, server) = {
            let _guard = runtime.enter();
            warp::serve(route).try_bind_ephemeral(([127, 0, 0, 1], 0))?
        };
        runtime.spawn(server);

        Ok(Self {
            addr,
            requests,
            _runtime: runtime,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The next request the server received, waiting briefly for it to arrive
    pub fn request(&self) -> Result<RecordedRequest> {
        self.requests
            .recv_timeout(WAIT_FOR_REQUEST)
            .map_err(|_| anyhow!("no request reached {} within {:?}", self.addr, WAIT_FOR_REQUEST))
    }
}
