//! Route guard component
//!
//! Wrap a routed view in `<Guarded access=...>`; it renders the view only
//! when the route guard allows the current location and otherwise replaces
//! the navigation with the guard's target. Without `access` the view is
//! treated as protected.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use super::context::use_session_context;
use crate::core::session::{GuardDecision, RouteAccess};
use crate::ui::icon::{Icon, icons};

/// Current location as path + query + fragment
fn current_location(pathname: String, search: String, hash: String) -> String {
    let mut location = pathname;
    if !search.is_empty() {
        if !search.starts_with('?') {
            location.push('?');
        }
        location.push_str(&search);
    }
    if !hash.is_empty() {
        if !hash.starts_with('#') {
            location.push('#');
        }
        location.push_str(&hash);
    }
    location
}

#[component]
pub fn Guarded(#[prop(optional)] access: RouteAccess, children: ChildrenFn) -> impl IntoView {
    let session = use_session_context();
    let location = use_location();

    // Re-evaluated on every navigation and every session transition
    let decision = Memo::new(move |_| {
        let here = current_location(
            location.pathname.get(),
            location.search.get(),
            location.hash.get(),
        );
        session.guard_decision(access, &here)
    });

    Effect::new(move |_| {
        if let Some(target) = decision.get().as_ref().and_then(GuardDecision::target) {
            let navigate = use_navigate();
            navigate(
                target,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
    });

    move || match decision.get() {
        Some(GuardDecision::Allowed) => children().into_any(),
        Some(_) => ().into_any(),
        None => view! {
            <div class="flex items-center justify-center py-20">
                <Icon name=icons::LOADER class="animate-spin h-8 w-8" />
            </div>
        }
        .into_any(),
    }
}
