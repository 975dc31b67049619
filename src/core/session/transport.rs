//! HTTP transport seam
//!
//! The session machinery only needs "send this request, give me status and
//! body". [`HttpTransport`] abstracts that so the core can run against the
//! browser's fetch in the bundle and against scripted responses in tests.

use serde::Serialize;

use super::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Outgoing request; `path` is relative to the API base (e.g. `/api/session`)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_string(body).map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Sends requests to the remote API.
///
/// Implementations must return `Err` only when no HTTP response was
/// received; every status code, including 4xx/5xx, is an `Ok` response.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: HttpTransport> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Browser fetch transport
///
/// Cookies are always sent (`credentials: include`) so the session cookie
/// set by `/api/login` also travels when the API lives on another origin.
#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    base_url: String,
}

impl FetchTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(feature = "hydrate")]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        use gloo_net::http::RequestBuilder;
        use web_sys::RequestCredentials;

        let url = self.url(&request.path);
        let builder = RequestBuilder::new(&url)
            .method(to_gloo_method(request.method))
            .credentials(RequestCredentials::Include);

        let outgoing = match request.body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(body)
                .map_err(|e| TransportError::new(e.to_string()))?,
            None => builder
                .build()
                .map_err(|e| TransportError::new(e.to_string()))?,
        };

        let response = outgoing
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status();
        // An unreadable body still carries a meaningful status
        let body = response.text().await.unwrap_or_default();

        Ok(ApiResponse { status, body })
    }
}

#[cfg(feature = "hydrate")]
fn to_gloo_method(method: Method) -> gloo_net::http::Method {
    match method {
        Method::Get => gloo_net::http::Method::GET,
        Method::Post => gloo_net::http::Method::POST,
        Method::Put => gloo_net::http::Method::PUT,
        Method::Patch => gloo_net::http::Method::PATCH,
        Method::Delete => gloo_net::http::Method::DELETE,
    }
}

/// Components never touch the network while rendering on the server
#[cfg(not(feature = "hydrate"))]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        Err(TransportError::new(format!(
            "{} {} is only available in the browser",
            request.method.as_str(),
            self.url(&request.path)
        )))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for driving the session machinery in tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    pub(crate) enum Reply {
        Now(Result<ApiResponse, TransportError>),
        Deferred(oneshot::Receiver<Result<ApiResponse, TransportError>>),
    }

    /// Answers requests in FIFO order from a queue of scripted replies
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        pub(crate) sent: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(&self, status: u16, body: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Now(Ok(ApiResponse::new(status, body))));
            self
        }

        pub(crate) fn fail(&self, message: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Now(Err(TransportError::new(message))));
            self
        }

        /// Queue a reply that is released later through the returned sender
        pub(crate) fn defer(&self) -> oneshot::Sender<Result<ApiResponse, TransportError>> {
            let (tx, rx) = oneshot::channel();
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Deferred(rx));
            tx
        }

        pub(crate) fn sent_paths(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.path.clone())
                .collect()
        }
    }

    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left");
            match reply {
                Reply::Now(result) => result,
                Reply::Deferred(rx) => rx.await.expect("deferred reply dropped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_json_serializes_body() {
        let req = ApiRequest::post_json("/api/login", &json!({"email": "a@b.com"})).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"email":"a@b.com"}"#));
    }

    #[test]
    fn test_response_ok_range() {
        assert!(ApiResponse::new(200, "").ok());
        assert!(ApiResponse::new(204, "").ok());
        assert!(!ApiResponse::new(301, "").ok());
        assert!(!ApiResponse::new(401, "").ok());
    }

    #[test]
    fn test_fetch_transport_joins_base_url() {
        let transport = FetchTransport::new("http://localhost:8000/");
        assert_eq!(transport.url("/api/session"), "http://localhost:8000/api/session");

        let same_origin = FetchTransport::new("");
        assert_eq!(same_origin.url("/api/session"), "/api/session");
    }

    #[cfg(not(feature = "hydrate"))]
    #[tokio::test]
    async fn test_fetch_transport_refuses_outside_browser() {
        let transport = FetchTransport::new("");
        let err = transport.send(ApiRequest::get("/api/session")).await.unwrap_err();
        assert!(err.0.contains("GET /api/session"));
    }
}
