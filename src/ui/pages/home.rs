//! Public landing page

use leptos::prelude::*;
use leptos_router::components::A;

use crate::ui::auth::{UserMenu, use_session_context};

#[component]
pub fn HomePage() -> impl IntoView {
    let session = use_session_context();
    let landing = session.config().default_landing;

    view! {
        <div class="min-h-screen flex flex-col">
            <header class="border-b">
                <div class="max-w-5xl mx-auto px-4 h-16 flex items-center justify-between">
                    <span class="text-xl font-bold">"Linkpulse"</span>
                    <UserMenu />
                </div>
            </header>
            <main class="flex-1 flex flex-col items-center justify-center gap-6 p-4">
                <h1 class="text-4xl font-semibold">"Linkpulse"</h1>
                <p class="text-center max-w-md">"Link monitoring dashboard."</p>
                <A href=landing attr:class="px-6 py-3 font-medium rounded-lg border">
                    "Open dashboard"
                </A>
            </main>
        </div>
    }
}
