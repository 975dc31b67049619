//! Reactive session context
//!
//! Bridges the core [`SessionStore`] into Leptos signals:
//! - subscribes to the store so every transition re-renders dependents
//! - runs the session probe once after hydration
//! - hands out the login flow, route guard and protected API client

use leptos::prelude::*;

use crate::core::ClientConfig;
use crate::core::session::{
    AuthClient, FetchTransport, GuardDecision, Identity, LoginFlow, ProtectedClient, RouteAccess,
    RouteGuard, RouteTable, Session, SessionStore,
};
use crate::ui::notifications::NotificationManager;

/// Session status as seen by the views
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// The startup probe has not answered yet
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(Identity),
}

impl From<&Session> for AuthState {
    fn from(session: &Session) -> Self {
        match session {
            Session::Authenticated(identity) => AuthState::Authenticated(identity.clone()),
            Session::Unauthenticated => AuthState::Unauthenticated,
        }
    }
}

struct SessionServices {
    config: ClientConfig,
    store: SessionStore,
    transport: FetchTransport,
    guard: RouteGuard,
}

/// Session context providing state and the session components
#[derive(Clone, Copy)]
pub struct SessionContext {
    /// Current authentication state
    pub state: RwSignal<AuthState>,
    services: StoredValue<SessionServices>,
    notifications: NotificationManager,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state.get(), AuthState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<Identity> {
        match self.state.get() {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn config(&self) -> ClientConfig {
        self.services.with_value(|s| s.config.clone())
    }

    /// Guard decision for a view declared with `access`, or `None` while
    /// the startup probe is still running and the view needs the session
    pub fn guard_decision(&self, access: RouteAccess, location: &str) -> Option<GuardDecision> {
        let state = self.state.get();
        self.services
            .with_value(|s| guard_decision(&state, &s.guard, access, location))
    }

    pub fn auth_client(&self) -> AuthClient<FetchTransport> {
        self.services
            .with_value(|s| AuthClient::new(s.transport.clone(), s.store.clone()))
    }

    pub fn login_flow(&self) -> LoginFlow<FetchTransport> {
        let config = self.config();
        LoginFlow::new(self.auth_client(), &config)
    }

    /// Client for authenticated API calls; a 401 logs the user out
    pub fn protected(&self) -> ProtectedClient<FetchTransport, NotificationManager> {
        self.services.with_value(|s| {
            ProtectedClient::new(s.transport.clone(), s.store.clone(), self.notifications)
                .with_expired_message(s.config.expired_message.clone())
        })
    }

    /// Forget the session locally
    pub fn logout(&self) {
        self.services.with_value(|s| s.store.clear_session());
    }
}

/// Decide a navigation from the reactive auth state.
///
/// Public views never wait for the probe; everything else shows a spinner
/// (`None`) until the session is known.
pub fn guard_decision(
    state: &AuthState,
    guard: &RouteGuard,
    access: RouteAccess,
    location: &str,
) -> Option<GuardDecision> {
    let session = match (state, access) {
        (_, RouteAccess::Public) => return Some(GuardDecision::Allowed),
        (AuthState::Loading, _) => return None,
        (AuthState::Authenticated(identity), _) => Session::Authenticated(identity.clone()),
        (AuthState::Unauthenticated, _) => Session::Unauthenticated,
    };
    Some(guard.decide_for(access, location, &session))
}

/// State to leave `Loading` with once the probe has finished. `None` when
/// a store transition already settled it.
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
fn settled_state(current: &AuthState, session: &Session) -> Option<AuthState> {
    (*current == AuthState::Loading).then(|| AuthState::from(session))
}

/// Provide session context to the component tree
pub fn provide_session_context(
    config: ClientConfig,
    notifications: NotificationManager,
) -> SessionContext {
    // Loading on both server and client so hydration matches
    let state = RwSignal::new(AuthState::Loading);

    let store = SessionStore::new();
    let routes = RouteTable::for_config(&config);
    let guard = RouteGuard::new(store.clone(), routes, &config);
    let transport = FetchTransport::new(config.api_base.clone());

    store.subscribe(move |session| {
        state.try_set(AuthState::from(session));
    });

    let ctx = SessionContext {
        state,
        services: StoredValue::new(SessionServices {
            config,
            store,
            transport,
            guard,
        }),
        notifications,
    };

    #[cfg(feature = "hydrate")]
    {
        use leptos::task::spawn_local;

        // Restore the session once, before any protected view decides
        Effect::new(move |_| {
            let client = ctx.auth_client();
            spawn_local(async move {
                let result = client.probe_session().await;
                if let Err(e) = &result {
                    leptos::logging::log!("No active session: {}", e);
                }
                // A failed probe on an already-cleared store changes nothing,
                // so leave Loading explicitly
                if let Some(settled) =
                    settled_state(&state.get_untracked(), &client.store().session())
                {
                    state.set(settled);
                }
            });
        });
    }

    provide_context(ctx);
    ctx
}

/// Get session context from the component tree
pub fn use_session_context() -> SessionContext {
    expect_context::<SessionContext>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RouteGuard {
        let config = ClientConfig::default();
        RouteGuard::new(SessionStore::new(), RouteTable::for_config(&config), &config)
    }

    #[test]
    fn test_loading_holds_guarded_views() {
        let guard = guard();

        assert_eq!(
            guard_decision(&AuthState::Loading, &guard, RouteAccess::Protected, "/dashboard"),
            None
        );
        assert_eq!(
            guard_decision(&AuthState::Loading, &guard, RouteAccess::GuestOnly, "/login"),
            None
        );
        assert_eq!(
            guard_decision(&AuthState::Loading, &guard, RouteAccess::Public, "/"),
            Some(GuardDecision::Allowed)
        );
    }

    #[test]
    fn test_settled_states_decide() {
        let guard = guard();
        let signed_in = AuthState::Authenticated(Identity::new("a@b.com"));

        assert_eq!(
            guard_decision(&signed_in, &guard, RouteAccess::Protected, "/dashboard"),
            Some(GuardDecision::Allowed)
        );
        assert_eq!(
            guard_decision(
                &signed_in,
                &guard,
                RouteAccess::GuestOnly,
                "/login?redirect=%2Fdashboard%3Ftab%3Dlinks"
            ),
            Some(GuardDecision::RedirectAway("/dashboard?tab=links".to_string()))
        );
        assert_eq!(
            guard_decision(&AuthState::Unauthenticated, &guard, RouteAccess::GuestOnly, "/login"),
            Some(GuardDecision::Allowed)
        );
    }

    #[test]
    fn test_failed_probe_on_cleared_store_redirects() {
        let guard = guard();
        let store = SessionStore::new();
        // The probe's clear is a no-op, so no subscriber fires
        assert!(!store.clear_session().changed());

        let settled = settled_state(&AuthState::Loading, &store.session()).unwrap();
        assert_eq!(settled, AuthState::Unauthenticated);
        assert_eq!(
            guard_decision(&settled, &guard, RouteAccess::Protected, "/dashboard"),
            Some(GuardDecision::Redirected("/login?redirect=%2Fdashboard".to_string()))
        );
    }

    #[test]
    fn test_settled_state_keeps_transition_result() {
        let signed_in = AuthState::Authenticated(Identity::new("a@b.com"));
        assert_eq!(settled_state(&signed_in, &Session::Unauthenticated), None);
    }
}
