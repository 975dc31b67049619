//! Carrying the originally requested location through a login round-trip
//!
//! When the route guard bounces an unauthenticated visitor it appends the
//! location they asked for to the login URL:
//!
//! ```
//! use linkpulse::core::session::redirect::{PendingRedirect, login_url};
//!
//! let pending = PendingRedirect::capture("/dashboard?tab=links");
//! assert_eq!(
//!     login_url("/login", "redirect", &pending),
//!     "/login?redirect=%2Fdashboard%3Ftab%3Dlinks"
//! );
//! ```
//!
//! After login the value is read back with [`PendingRedirect::from_query`],
//! which only accepts same-site absolute paths.

/// A same-site location to return to after login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect(String);

impl PendingRedirect {
    /// Wrap the location the user is currently trying to reach
    pub fn capture(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Validate an already-decoded location.
    ///
    /// Rejects anything that could leave the site (`//host`, `https://...`,
    /// backslash tricks), control characters, and the login surface itself.
    pub fn parse(location: &str, login_path: &str) -> Option<Self> {
        let is_local = location.starts_with('/')
            && !location.starts_with("//")
            && !location.contains('\\')
            && !location.chars().any(char::is_control);
        if !is_local {
            return None;
        }

        let (path, _) = split_location(location);
        if path_matches(path, login_path) {
            return None;
        }
        Some(Self(location.to_string()))
    }

    /// Read and validate the redirect parameter of a query string
    pub fn from_query(query: &str, param: &str, login_path: &str) -> Option<Self> {
        let raw = query_param(query, param)?;
        Self::parse(&raw, login_path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the redirect, yielding the location to navigate to
    pub fn into_location(self) -> String {
        self.0
    }

    /// URL-safe form for use as a query parameter value
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

/// Login surface URL carrying `pending` in the `param` query parameter
pub fn login_url(login_path: &str, param: &str, pending: &PendingRedirect) -> String {
    format!("{}?{}={}", login_path, param, pending.encoded())
}

/// Split `path?query#fragment` into path and query (fragment dropped)
pub fn split_location(location: &str) -> (&str, &str) {
    let without_fragment = location.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    }
}

/// Whether `path` is `route` or lies below it (`/dashboard/links`)
pub fn path_matches(path: &str, route: &str) -> bool {
    let path = normalize(path);
    let route = normalize(route);
    if route == "/" {
        return path == "/";
    }
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Decoded value of the first `name` parameter in `query`
pub fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| decode_component(key).as_deref() == Some(name))
        .and_then(|(_, value)| decode_component(value))
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}
