//! Application configuration.
//!
//! [`ClientConfig`] holds the routing and API settings used by the browser
//! bundle. [`ServerConfig`] is read from environment variables by the SSR
//! server; call `dotenvy::dotenv()` before `ServerConfig::from_env()`.

/// Router segment of the login page, shared by `<Routes>` and [`ClientConfig`]
pub const LOGIN_SEGMENT: &str = "login";

/// Router segment of the dashboard, shared by `<Routes>` and [`ClientConfig`]
pub const DASHBOARD_SEGMENT: &str = "dashboard";

/// Session and routing settings shared by the core and the UI
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Origin of the remote API; empty means same origin
    /// Example: http://localhost:8000
    pub api_base: String,

    /// Path of the login surface
    pub login_path: String,

    /// Query parameter carrying the pending redirect
    pub redirect_param: String,

    /// Where to land after login when no pending redirect is usable
    pub default_landing: String,

    /// Text of the global notification shown when the session expires
    pub expired_message: String,

    /// Protected endpoint polled by the dashboard
    pub status_path: String,

    /// Dashboard refresh interval in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            login_path: format!("/{LOGIN_SEGMENT}"),
            redirect_param: "redirect".to_string(),
            default_landing: format!("/{DASHBOARD_SEGMENT}"),
            expired_message: crate::core::session::SESSION_EXPIRED_MESSAGE.to_string(),
            status_path: "/api/status".to_string(),
            poll_interval_ms: 30_000,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the API origin baked in at compile time through
    /// `LINKPULSE_API_BASE` when set (used for development builds)
    pub fn from_build_env() -> Self {
        Self {
            api_base: option_env!("LINKPULSE_API_BASE")
                .unwrap_or_default()
                .to_string(),
            ..Self::default()
        }
    }
}

/// Server configuration loaded from environment variables.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Remote API origin that `/api/*` requests are forwarded to
    /// Example: http://localhost:8000
    pub backend_url: Option<String>,
}

#[cfg(feature = "ssr")]
impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_backend_url(std::env::var("BACKEND_URL").ok())
    }

    /// Normalize a raw `BACKEND_URL` value; blank means no forwarding
    pub fn from_backend_url(raw: Option<String>) -> Self {
        Self {
            backend_url: raw
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    /// Check if an API backend is configured
    pub fn has_backend(&self) -> bool {
        self.backend_url.is_some()
    }
}

#[cfg(feature = "ssr")]
impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
