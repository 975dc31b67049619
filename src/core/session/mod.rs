//! Client-side session state machine
//!
//! - [`SessionStore`]: the single in-memory session with two mutations
//! - [`AuthClient`]: session probe and login
//! - [`ProtectedClient`]: wraps authenticated API calls, logs out on 401
//! - [`RouteGuard`]: per-navigation access check with redirect to login
//! - [`LoginFlow`]: login submission and redirect restoration

// Server builds log through `tracing`; the browser bundle has no subscriber,
// so it writes to the console instead.
macro_rules! session_log {
    ($($arg:tt)+) => {{
        #[cfg(feature = "ssr")]
        tracing::info!($($arg)+);
        #[cfg(not(feature = "ssr"))]
        leptos::logging::log!($($arg)+);
    }};
}

macro_rules! session_debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "ssr")]
        tracing::debug!($($arg)+);
        #[cfg(not(feature = "ssr"))]
        leptos::logging::debug_warn!($($arg)+);
    }};
}

macro_rules! session_warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "ssr")]
        tracing::warn!($($arg)+);
        #[cfg(not(feature = "ssr"))]
        leptos::logging::warn!($($arg)+);
    }};
}

pub mod client;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod login_flow;
pub mod redirect;
pub mod store;
pub mod transport;

pub use client::AuthClient;
pub use error::{AuthError, TransportError};
pub use guard::{GuardDecision, RouteAccess, RouteGuard, RouteTable};
pub use interceptor::{ProtectedClient, SESSION_EXPIRED_MESSAGE, SessionNotifier};
pub use login_flow::LoginFlow;
pub use redirect::PendingRedirect;
pub use store::{Identity, Session, SessionStore, SubscriptionId, Ticket, Transition};
pub use transport::{ApiRequest, ApiResponse, FetchTransport, HttpTransport, Method};
