//! Navigation-time access control
//!
//! Every route carries an explicit [`RouteAccess`] classification. The
//! guard reads the session once per navigation and decides whether the view
//! may render or where the user has to go instead.

use super::redirect::{PendingRedirect, login_url, path_matches, split_location};
use super::store::{Session, SessionStore};
use crate::core::config::{ClientConfig, DASHBOARD_SEGMENT};

/// How a route relates to authentication
///
/// Defaults to `Protected`, so a guarded view that names no access level
/// never renders without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteAccess {
    /// Anyone may view it
    Public,
    /// Requires an authenticated session
    #[default]
    Protected,
    /// Only for visitors without a session (the login surface)
    GuestOnly,
}

/// Result of evaluating a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    /// Unauthenticated visit to a protected route; go to this login URL
    Redirected(String),
    /// Authenticated visit to a guest-only route; go to this location
    RedirectAway(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }

    /// Target location, if the navigation must be replaced
    pub fn target(&self) -> Option<&str> {
        match self {
            GuardDecision::Allowed => None,
            GuardDecision::Redirected(to) | GuardDecision::RedirectAway(to) => Some(to),
        }
    }
}

/// Ordered list of route prefixes and their classification.
///
/// The longest matching prefix wins; unknown paths are public.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, RouteAccess)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: impl Into<String>, access: RouteAccess) -> Self {
        self.routes.push((path.into(), access));
        self
    }

    /// Routes of the dashboard client
    pub fn for_config(config: &ClientConfig) -> Self {
        Self::new()
            .route("/", RouteAccess::Public)
            .route(config.login_path.clone(), RouteAccess::GuestOnly)
            .route(format!("/{DASHBOARD_SEGMENT}"), RouteAccess::Protected)
    }

    pub fn classify(&self, path: &str) -> RouteAccess {
        self.routes
            .iter()
            .filter(|(route, _)| path_matches(path, route))
            .max_by_key(|(route, _)| route.len())
            .map(|(_, access)| *access)
            .unwrap_or(RouteAccess::Public)
    }
}

/// Decides, per navigation, whether a view may render
#[derive(Debug, Clone)]
pub struct RouteGuard {
    store: SessionStore,
    routes: RouteTable,
    login_path: String,
    redirect_param: String,
    default_landing: String,
}

impl RouteGuard {
    pub fn new(store: SessionStore, routes: RouteTable, config: &ClientConfig) -> Self {
        Self {
            store,
            routes,
            login_path: config.login_path.clone(),
            redirect_param: config.redirect_param.clone(),
            default_landing: config.default_landing.clone(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Evaluate a navigation to `location` (path + query) against the
    /// current session
    pub fn evaluate(&self, location: &str) -> GuardDecision {
        self.decide(location, &self.store.session())
    }

    /// Same as [`evaluate`](Self::evaluate) with an explicit session snapshot
    pub fn decide(&self, location: &str, session: &Session) -> GuardDecision {
        let (path, _) = split_location(location);
        self.decide_for(self.routes.classify(path), location, session)
    }

    /// Decide for a route whose access level is already known, as when a
    /// view declares its own classification
    pub fn decide_for(
        &self,
        access: RouteAccess,
        location: &str,
        session: &Session,
    ) -> GuardDecision {
        let (path, query) = split_location(location);

        match (access, session.is_authenticated()) {
            (RouteAccess::Public, _) => GuardDecision::Allowed,
            (RouteAccess::Protected, true) => GuardDecision::Allowed,
            (RouteAccess::Protected, false) => {
                // The login surface is never protected, so this cannot loop
                if path_matches(path, &self.login_path) {
                    return GuardDecision::Allowed;
                }
                let pending = PendingRedirect::capture(location);
                session_debug!("Redirecting unauthenticated visit to {} to login", location);
                GuardDecision::Redirected(login_url(
                    &self.login_path,
                    &self.redirect_param,
                    &pending,
                ))
            }
            (RouteAccess::GuestOnly, false) => GuardDecision::Allowed,
            (RouteAccess::GuestOnly, true) => {
                GuardDecision::RedirectAway(self.resume_location(query))
            }
        }
    }

    /// Where to go once authenticated: the pending redirect in `query`
    /// when it is well-formed, the default landing otherwise
    pub fn resume_location(&self, query: &str) -> String {
        PendingRedirect::from_query(query, &self.redirect_param, &self.login_path)
            .map(PendingRedirect::into_location)
            .unwrap_or_else(|| self.default_landing.clone())
    }
}
