//! User menu component
//!
//! Shows the signed-in principal and a sign-out action in the header, or a
//! sign-in link when there is no session.

use leptos::prelude::*;
use leptos_router::components::A;

use super::context::{AuthState, use_session_context};
use crate::ui::icon::{Icon, icons};

#[component]
pub fn UserMenu() -> impl IntoView {
    let session = use_session_context();
    let login_path = session.config().login_path;

    move || match session.state.get() {
        AuthState::Loading => view! {
            <div class="w-24 h-6 rounded bg-neutral-200 dark:bg-neutral-700 animate-pulse"></div>
        }
        .into_any(),
        AuthState::Unauthenticated => view! {
            <A href=login_path.clone() attr:class="px-3 py-1.5 text-sm font-medium">
                "Sign In"
            </A>
        }
        .into_any(),
        AuthState::Authenticated(identity) => view! {
            <div class="flex items-center gap-3">
                <span class="text-sm" title="Signed in">{identity.email}</span>
                <button
                    class="flex items-center gap-1 px-2 py-1 text-sm rounded hover:bg-neutral-100 dark:hover:bg-neutral-700"
                    on:click=move |_| session.logout()
                >
                    <Icon name=icons::LOGOUT class="w-4 h-4" />
                    "Sign out"
                </button>
            </div>
        }
        .into_any(),
    }
}
