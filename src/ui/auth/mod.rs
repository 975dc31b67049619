//! Authentication UI module
//!
//! Session context, route guard wrapper, login form and user menu.

mod context;
mod guard;
mod login_form;
mod user_menu;

pub use context::{
    AuthState, SessionContext, provide_session_context, use_session_context,
};
pub use guard::Guarded;
pub use login_form::LoginForm;
pub use user_menu::UserMenu;
