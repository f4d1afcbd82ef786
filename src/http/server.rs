//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (timeout, tracing)
//! - Extract the client identity from the connection source address
//! - Consult the admission controller before touching the upstream
//! - Forward admitted requests to the configured backend unmodified
//!
//! # Data Flow
//! ```text
//! request → identity (source IP)
//!         → AdmissionController::allow
//!             deny  → 429 Too Many Requests (upstream never contacted)
//!             allow → rewrite scheme/authority → upstream → response
//! ```

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{header, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;
use uuid::Uuid;

use crate::admission::AdmissionController;
use crate::config::ProxyConfig;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<AdmissionController>,
    pub client: Client<HttpConnector, Body>,
    pub backend_authority: Authority,
}

/// HTTP server for the admission-control proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and controller.
    pub fn new(config: ProxyConfig, controller: Arc<AdmissionController>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            controller,
            client,
            backend_authority: backend_authority(&config.backend.url),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.url,
            algorithm = %self.config.rate_limit.algorithm,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the upstream authority (host:port) from the configured URL.
///
/// The URL is validated at startup, before the server is constructed.
fn backend_authority(backend_url: &str) -> Authority {
    let url = Url::parse(backend_url).expect("backend URL validated at startup");
    let host = url.host_str().expect("backend URL validated at startup");
    let port = url.port_or_known_default().unwrap_or(80);
    Authority::from_str(&format!("{host}:{port}")).expect("backend URL validated at startup")
}

/// Main proxy handler: admission check, then forward.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Ports are stripped and IPv6 text form is canonical here, so the IP
    // string is usable as the registry key directly.
    let identity = addr.ip().to_string();

    if !state.controller.allow(&identity) {
        tracing::debug!(
            identity = %identity,
            algorithm = %state.controller.algorithm(),
            "Request rejected by rate limiter"
        );
        metrics::record_rejected(state.controller.algorithm().as_str());
        metrics::record_request(&method, StatusCode::TOO_MANY_REQUESTS.as_u16(), start);
        return (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
    }

    forward(&state, request, &identity, &method, start).await
}

/// Forward an admitted request to the upstream and relay its response.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    identity: &str,
    method: &str,
    start: Instant,
) -> Response {
    let (mut parts, body) = request.into_parts();

    // URI rewrite: same path and query, upstream scheme and authority.
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.backend_authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| parts.uri.clone());

    // Correlation id for upstream logs.
    let request_id = Uuid::new_v4().to_string();
    if let Ok(value) = header::HeaderValue::from_str(&request_id) {
        parts.headers.insert("x-request-id", value);
    }

    let upstream_request = Request::from_parts(parts, body);

    match state.client.request(upstream_request).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(
                identity = %identity,
                request_id = %request_id,
                status = %status,
                "Proxied request"
            );
            metrics::record_request(method, status.as_u16(), start);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                identity = %identity,
                request_id = %request_id,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(method, StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_authority_default_port() {
        let authority = backend_authority("http://backend.internal");
        assert_eq!(authority.as_str(), "backend.internal:80");
    }

    #[test]
    fn test_backend_authority_explicit_port() {
        let authority = backend_authority("http://127.0.0.1:3000");
        assert_eq!(authority.as_str(), "127.0.0.1:3000");
    }
}
