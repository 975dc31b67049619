//! Login submission and return to the originally requested page

use super::client::AuthClient;
use super::error::AuthError;
use super::redirect::{PendingRedirect, split_location};
use super::transport::HttpTransport;
use crate::core::config::ClientConfig;

/// Drives a login form submission.
///
/// On success the caller navigates (replacing the login URL, which drops
/// the pending redirect) to the returned location.
#[derive(Debug, Clone)]
pub struct LoginFlow<T> {
    client: AuthClient<T>,
    login_path: String,
    redirect_param: String,
    default_landing: String,
}

impl<T: HttpTransport> LoginFlow<T> {
    pub fn new(client: AuthClient<T>, config: &ClientConfig) -> Self {
        Self {
            client,
            login_path: config.login_path.clone(),
            redirect_param: config.redirect_param.clone(),
            default_landing: config.default_landing.clone(),
        }
    }

    pub fn client(&self) -> &AuthClient<T> {
        &self.client
    }

    /// Log in and work out where to go next.
    ///
    /// `current_location` is the login page URL (path + query) that may hold
    /// the pending redirect. On failure nothing is consumed, so a retry still
    /// returns to the same place.
    pub async fn submit(
        &self,
        email: &str,
        password: &str,
        current_location: &str,
    ) -> Result<String, AuthError> {
        self.client.login(email, password).await?;
        Ok(self.destination(current_location))
    }

    /// Location to navigate to after a successful login
    pub fn destination(&self, current_location: &str) -> String {
        let (_, query) = split_location(current_location);
        match PendingRedirect::from_query(query, &self.redirect_param, &self.login_path) {
            Some(pending) => pending.into_location(),
            None => self.default_landing.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::guard::{RouteGuard, RouteTable};
    use crate::core::session::interceptor::ProtectedClient;
    use crate::core::session::transport::{ApiRequest, ApiResponse};
    use crate::core::session::store::{Session, SessionStore};
    use crate::core::session::transport::testing::ScriptedTransport;
    use std::sync::Arc;

    fn flow() -> (LoginFlow<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = AuthClient::new(Arc::clone(&transport), SessionStore::new());
        (LoginFlow::new(client, &ClientConfig::default()), transport)
    }

    #[tokio::test]
    async fn test_login_returns_to_pending_redirect() {
        let (flow, transport) = flow();
        transport.reply(200, r#"{"email":"a@b.com"}"#);

        let next = flow
            .submit("a@b.com", "pw", "/login?redirect=%2Fdashboard")
            .await
            .unwrap();

        assert_eq!(next, "/dashboard");
        assert!(flow.client().store().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_redirect_goes_to_default() {
        let (flow, transport) = flow();
        transport.reply(200, r#"{"email":"a@b.com"}"#);
        transport.reply(200, r#"{"email":"a@b.com"}"#);

        assert_eq!(flow.submit("a@b.com", "pw", "/login").await.unwrap(), "/dashboard");
        assert_eq!(
            flow.submit("a@b.com", "pw", "/login?redirect=%2F%2Fevil.example")
                .await
                .unwrap(),
            "/dashboard"
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_detail() {
        let (flow, transport) = flow();
        transport.reply(401, r#"{"detail":"Invalid credentials"}"#);

        let err = flow
            .submit("bad@x.com", "wrong", "/login?redirect=%2Fdashboard")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Rejected {
                status: 401,
                detail: "Invalid credentials".to_string()
            }
        );
        assert_eq!(err.detail(), "Invalid credentials");
        assert_eq!(flow.client().store().session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_transport_failure_allows_retry() {
        let (flow, transport) = flow();
        transport.fail("offline");
        transport.reply(200, r#"{"email":"a@b.com"}"#);

        let err = flow
            .submit("a@b.com", "pw", "/login?redirect=%2Fdashboard")
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let next = flow
            .submit("a@b.com", "pw", "/login?redirect=%2Fdashboard")
            .await
            .unwrap();
        assert_eq!(next, "/dashboard");
    }

    #[tokio::test]
    async fn test_dashboard_round_trip() {
        let (flow, transport) = flow();
        let config = ClientConfig::default();
        let guard = RouteGuard::new(
            flow.client().store().clone(),
            RouteTable::for_config(&config),
            &config,
        );

        let login_url = guard.evaluate("/dashboard").target().unwrap().to_string();
        assert_eq!(login_url, "/login?redirect=%2Fdashboard");

        transport.reply(200, r#"{"email":"a@b.com"}"#);
        let next = flow.submit("a@b.com", "pw", &login_url).await.unwrap();

        assert_eq!(next, "/dashboard");
        assert!(guard.evaluate(&next).is_allowed());
    }

    #[tokio::test]
    async fn test_login_during_expiry_lands_without_second_redirect() {
        let (flow, transport) = flow();
        let config = ClientConfig::default();
        let store = flow.client().store().clone();
        let guard = RouteGuard::new(store.clone(), RouteTable::for_config(&config), &config);
        let protected = ProtectedClient::new(Arc::clone(&transport), store, |_: &str| {});
        let login_reply = transport.defer();
        transport.reply(401, r#"{"detail":"Not authenticated"}"#);

        let submit = flow.submit("a@b.com", "pw", "/login?redirect=%2Fdashboard");
        let expired = async {
            let _ = protected.send(ApiRequest::get("/api/status")).await;
            login_reply
                .send(Ok(ApiResponse::new(200, r#"{"email":"a@b.com"}"#)))
                .unwrap();
        };
        let (next, ()) = tokio::join!(submit, expired);

        let next = next.unwrap();
        assert_eq!(next, "/dashboard");
        assert!(guard.evaluate(&next).is_allowed());
    }
}
