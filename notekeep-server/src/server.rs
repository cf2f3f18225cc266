//! HTTP/1.1 and HTTP/2 server implementation

use crate::handlers::handle_request;
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::service::service_fn;
use hyper::{Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

pub type ResponseBody = Full<Bytes>;

const SERVER_HEADER: &str = concat!("notekeep/", env!("CARGO_PKG_VERSION"));

pub struct NotekeepServer {
    state: AppState,
}

impl NotekeepServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Bind `addr` and serve until `shutdown` resolves
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until `shutdown` resolves
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        info!("notekeep server listening on {}", listener.local_addr()?);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = accepted?;
                    debug!("New connection from {}", remote_addr);

                    let state = self.state.clone();
                    tokio::spawn(async move {
                        Self::handle_connection(stream, remote_addr, state).await;
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            }
        }
    }

    async fn handle_connection(stream: TcpStream, remote_addr: SocketAddr, state: AppState) {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let state = state.clone();
            async move { Ok::<_, Infallible>(handle_request(req, state).await) }
        });

        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .serve_connection(io, service)
            .await
        {
            error!("Connection error from {}: {}", remote_addr, err);
        }
    }
}

/// JSON response with the standard headers
pub fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<ResponseBody> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(SERVER, HeaderValue::from_static(SERVER_HEADER));
    response
}

/// Bodyless response, e.g. 204 No Content
pub fn empty_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(SERVER, HeaderValue::from_static(SERVER_HEADER));
    response
}
