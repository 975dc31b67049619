//! Development forwarder for the remote API
//!
//! When `BACKEND_URL` is configured the SSR server relays every `/api/*`
//! request to it, so the browser bundle can talk to the API on the same
//! origin and the session cookie stays first-party.

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Request headers relayed to the backend unchanged
fn forwarded_request_headers() -> [HeaderName; 4] {
    [
        header::CONTENT_TYPE,
        header::COOKIE,
        header::ACCEPT,
        HeaderName::from_static("x-real-ip"),
    ]
}

/// `X-Forwarded-For` for the upstream request: the incoming chain with the
/// connecting peer appended
fn forwarded_for(headers: &HeaderMap, peer: IpAddr) -> Option<HeaderValue> {
    let mut chain: Vec<String> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .collect();
    chain.push(peer.to_string());
    HeaderValue::from_str(&chain.join(", ")).ok()
}

#[derive(Clone)]
pub struct ProxyState {
    backend_url: String,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Backend URL for an incoming request URI (path and query kept)
    pub fn target_url(&self, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.backend_url, path_and_query)
    }
}

/// Error body in the same shape the API uses
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Create the `/api/*` forwarding router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// the client address can be passed on.
pub fn proxy_router(backend_url: impl Into<String>) -> Router {
    let state = Arc::new(ProxyState::new(backend_url));

    Router::new()
        .route("/api/{*path}", any(forward_handler))
        .with_state(state)
}

async fn forward_handler(
    State(state): State<Arc<ProxyState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = state.target_url(&uri);
    tracing::debug!("Forwarding {} {}", method, url);

    let mut request = state.client.request(method.clone(), &url);
    for name in forwarded_request_headers() {
        for value in headers.get_all(&name) {
            request = request.header(&name, value);
        }
    }
    if let Some(chain) = forwarded_for(&headers, peer.ip()) {
        request = request.header(X_FORWARDED_FOR, chain);
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("Failed to reach API backend at {}: {}", url, e);
            return error_response(StatusCode::BAD_GATEWAY, "The API backend is unreachable.");
        }
    };

    let status = upstream.status();
    let response_headers = relayed_response_headers(upstream.headers());

    match upstream.bytes().await {
        Ok(bytes) => {
            if status.is_server_error() {
                tracing::warn!("API backend answered {} for {} {}", status, method, uri.path());
            }
            (status, response_headers, bytes).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read API backend response: {}", e);
            error_response(StatusCode::BAD_GATEWAY, "The API backend sent an unreadable response.")
        }
    }
}

/// Keep only the response headers the browser needs from the backend
fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();
    for name in [header::CONTENT_TYPE, header::SET_COOKIE, header::RETRY_AFTER] {
        for value in upstream.get_all(&name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}

fn error_response(status: StatusCode, detail: &str) -> Response {
    let body = serde_json::to_string(&ErrorResponse {
        detail: detail.to_string(),
    })
    .unwrap_or_default();

    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}
