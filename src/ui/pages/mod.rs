//! Application pages module
//!
//! - Home (public)
//! - Login (guest-only)
//! - Dashboard (protected)
//! - Not found

mod dashboard;
mod home;
mod login;
mod not_found;

pub use dashboard::DashboardPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
