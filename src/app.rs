use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::StaticSegment;
use leptos_router::components::{Route, Router, Routes};

use crate::core::ClientConfig;
use crate::core::config::{DASHBOARD_SEGMENT, LOGIN_SEGMENT};
use crate::core::session::RouteAccess;
use crate::ui::NotificationsContainer;
use crate::ui::auth::{Guarded, provide_session_context};
use crate::ui::notifications::provide_notifications;
use crate::ui::pages::{DashboardPage, HomePage, LoginPage, NotFoundPage};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    let notifications = provide_notifications();
    // Session state must exist before any route renders
    let _session = provide_session_context(ClientConfig::from_build_env(), notifications);

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/linkpulse.css"/>
        <Title text="Linkpulse"/>

        <NotificationsContainer />
        <Router>
            <Routes fallback=|| view! { <NotFoundPage /> }>
                <Route path=StaticSegment("") view=HomePage />
                <Route
                    path=StaticSegment(LOGIN_SEGMENT)
                    view=|| view! { <Guarded access=RouteAccess::GuestOnly><LoginPage /></Guarded> }
                />
                <Route
                    path=StaticSegment(DASHBOARD_SEGMENT)
                    view=|| view! { <Guarded access=RouteAccess::Protected><DashboardPage /></Guarded> }
                />
            </Routes>
        </Router>
    }
}
