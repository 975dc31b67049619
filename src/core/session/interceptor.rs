//! Wrapper for API calls that require an authenticated session
//!
//! A 401 from any protected endpoint means the server no longer accepts our
//! session. [`ProtectedClient`] then clears the [`SessionStore`], raises a
//! single "session expired" notice and still hands the 401 back to the
//! caller. Other statuses are returned untouched.

use serde::de::DeserializeOwned;

use super::error::AuthError;
use super::store::SessionStore;
use super::transport::{ApiRequest, ApiResponse, HttpTransport};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Receives the global "session expired" notice
pub trait SessionNotifier {
    fn session_expired(&self, message: &str);
}

impl<F: Fn(&str)> SessionNotifier for F {
    fn session_expired(&self, message: &str) {
        self(message)
    }
}

/// Sends requests to protected endpoints and handles session expiry
#[derive(Debug, Clone)]
pub struct ProtectedClient<T, N> {
    transport: T,
    store: SessionStore,
    notifier: N,
    expired_message: String,
}

impl<T: HttpTransport, N: SessionNotifier> ProtectedClient<T, N> {
    pub fn new(transport: T, store: SessionStore, notifier: N) -> Self {
        Self {
            transport,
            store,
            notifier,
            expired_message: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }

    pub fn with_expired_message(mut self, message: impl Into<String>) -> Self {
        self.expired_message = message.into();
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Send a request; non-success statuses become typed errors
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        let ticket = self.store.begin();
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        if response.ok() {
            return Ok(response);
        }

        let error = AuthError::from_status(response.status, &response.body);
        if error.is_unauthorized() {
            // Only the request that actually ends the session notifies;
            // concurrent 401s find the store already cleared.
            if ticket.clear_session().changed() {
                session_warn!("Session expired on protected request to {}", path);
                self.notifier.session_expired(&self.expired_message);
            }
        } else {
            session_debug!("Protected request to {} rejected with {}", path, response.status);
        }
        Err(error)
    }

    /// `GET` a protected endpoint and decode its JSON body
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, AuthError> {
        let response = self.send(ApiRequest::get(path)).await?;
        response
            .json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::store::{Identity, Session};
    use crate::core::session::transport::testing::ScriptedTransport;
    use serde::Deserialize;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    type Notices = Rc<RefCell<Vec<String>>>;

    fn protected() -> (
        ProtectedClient<Arc<ScriptedTransport>, impl SessionNotifier>,
        Arc<ScriptedTransport>,
        Notices,
    ) {
        let transport = Arc::new(ScriptedTransport::new());
        let notices: Notices = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notices);
        let store = SessionStore::new();
        store.set_authenticated(Identity::new("a@b.com"));
        let client = ProtectedClient::new(Arc::clone(&transport), store, move |msg: &str| {
            sink.borrow_mut().push(msg.to_string())
        });
        (client, transport, notices)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Status {
        time: String,
        ip: Option<String>,
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (client, transport, notices) = protected();
        transport.reply(200, r#"{"time":"2024-11-01 12:00:00","ip":"10.0.0.1"}"#);

        let status: Status = client.get_json("/api/status").await.unwrap();

        assert_eq!(status.time, "2024-11-01 12:00:00");
        assert_eq!(status.ip.as_deref(), Some("10.0.0.1"));
        assert!(client.store().is_authenticated());
        assert!(notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_401_clears_and_notifies_once() {
        let (client, transport, notices) = protected();
        transport.reply(401, r#"{"detail":"Session expired"}"#);

        let err = client.send(ApiRequest::get("/api/status")).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(client.store().session(), Session::Unauthenticated);
        assert_eq!(*notices.borrow(), vec![SESSION_EXPIRED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_other_errors_do_not_touch_session() {
        let (client, transport, notices) = protected();
        transport.reply(403, r#"{"detail":"Forbidden"}"#);
        transport.reply(500, "");
        transport.fail("timeout");

        let forbidden = client.send(ApiRequest::get("/api/a")).await.unwrap_err();
        let server = client.send(ApiRequest::get("/api/b")).await.unwrap_err();
        let offline = client.send(ApiRequest::get("/api/c")).await.unwrap_err();

        assert!(matches!(forbidden, AuthError::Rejected { status: 403, .. }));
        assert!(matches!(server, AuthError::Rejected { status: 500, .. }));
        assert!(offline.is_retryable());
        assert!(client.store().is_authenticated());
        assert!(notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_401s_notify_exactly_once() {
        let (client, transport, notices) = protected();
        let mut replies: Vec<_> = (0..4).map(|_| Some(transport.defer())).collect();

        let requests = futures::future::join_all(
            (0..4).map(|i| client.send(ApiRequest::get(format!("/api/item/{i}")))),
        );
        // Answer in an order different from the send order
        let release = async move {
            for idx in [2usize, 0, 3, 1] {
                tokio::task::yield_now().await;
                replies[idx]
                    .take()
                    .unwrap()
                    .send(Ok(ApiResponse::new(401, r#"{"detail":"expired"}"#)))
                    .unwrap();
            }
        };
        let (results, ()) = tokio::join!(requests, release);

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| matches!(r, Err(AuthError::Unauthorized { .. }))));
        assert!(!client.store().is_authenticated());
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_expired_message() {
        let (client, transport, notices) = protected();
        let client = client.with_expired_message("Please sign in again");
        transport.reply(401, "");

        let _ = client.send(ApiRequest::get("/api/status")).await;
        assert_eq!(*notices.borrow(), vec!["Please sign in again".to_string()]);
    }

    #[tokio::test]
    async fn test_401_after_relogin_is_ignored() {
        let (client, transport, notices) = protected();
        let reply = transport.defer();

        let request = client.send(ApiRequest::get("/api/status"));
        let relogin = async {
            client.store().clear_session();
            client.store().set_authenticated(Identity::new("fresh@b.com"));
            reply
                .send(Ok(ApiResponse::new(401, r#"{"detail":"old cookie"}"#)))
                .unwrap();
        };
        let (result, ()) = tokio::join!(request, relogin);

        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(client.store().identity().unwrap().email, "fresh@b.com");
        assert!(notices.borrow().is_empty());
    }
}
