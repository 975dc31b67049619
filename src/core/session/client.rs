//! Session probe and login against the remote API

use serde::Serialize;

use super::error::AuthError;
use super::store::{Identity, SessionStore};
use super::transport::{ApiRequest, ApiResponse, HttpTransport};

pub const SESSION_PATH: &str = "/api/session";
pub const LOGIN_PATH: &str = "/api/login";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Performs the two authentication calls and records their outcome
/// in the shared [`SessionStore`].
#[derive(Debug, Clone)]
pub struct AuthClient<T> {
    transport: T,
    store: SessionStore,
}

impl<T: HttpTransport> AuthClient<T> {
    pub fn new(transport: T, store: SessionStore) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ask the API who we are.
    ///
    /// This is how a freshly loaded client restores its session. Any failure
    /// leaves the store unauthenticated, unless a newer operation (e.g. a
    /// login that finished first) has already decided the session.
    pub async fn probe_session(&self) -> Result<Identity, AuthError> {
        let ticket = self.store.begin();

        let result = match self.transport.send(ApiRequest::get(SESSION_PATH)).await {
            Ok(response) => decode_identity(&response),
            Err(e) => Err(AuthError::from(e)),
        };

        match &result {
            Ok(identity) => {
                ticket.set_authenticated(identity.clone());
            }
            Err(e) => {
                session_log!("Session probe failed: {}", e);
                ticket.clear_session();
            }
        }
        result
    }

    /// Submit credentials.
    ///
    /// A failed attempt never touches the store, so it cannot log out a
    /// session that is already valid. A success that arrives after a newer
    /// session change is reported as [`AuthError::Superseded`], since the
    /// store does not hold the returned identity.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let ticket = self.store.begin();
        let request = ApiRequest::post_json(LOGIN_PATH, &LoginRequest { email, password })?;

        let response = self.transport.send(request).await.map_err(|e| {
            session_warn!("Login request could not be sent: {}", e);
            AuthError::from(e)
        })?;

        match decode_identity(&response) {
            Ok(identity) => {
                if ticket.set_authenticated(identity.clone()).is_stale() {
                    session_warn!("Login for {} finished after a newer session change", identity.email);
                    return Err(AuthError::Superseded);
                }
                Ok(identity)
            }
            Err(e) => {
                session_warn!("Login rejected ({}): {}", response.status, e);
                Err(e)
            }
        }
    }
}

/// Turn a probe/login response into an identity or a typed error.
///
/// A 401 here is a plain rejection (bad credentials, no session), not a
/// session expiry, so it maps to `Rejected`.
fn decode_identity(response: &ApiResponse) -> Result<Identity, AuthError> {
    if !response.ok() {
        return Err(match AuthError::from_status(response.status, &response.body) {
            AuthError::Unauthorized { detail } => AuthError::Rejected {
                status: response.status,
                detail,
            },
            other => other,
        });
    }

    let value: serde_json::Value = response
        .json()
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    // The session endpoint may wrap the identity as `{ "user": { ... } }`
    let value = match value {
        serde_json::Value::Object(mut map) if !map.contains_key("email") && map.contains_key("user") => {
            map.remove("user").unwrap_or_default()
        }
        other => other,
    };

    serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}
