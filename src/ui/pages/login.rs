//! Login page component
//!
//! Routed as guest-only: an authenticated visitor is sent on to the pending
//! redirect or the default landing by the surrounding guard.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::ui::auth::LoginForm;

#[component]
pub fn LoginPage() -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col">
            <header class="border-b">
                <div class="max-w-5xl mx-auto px-4 h-16 flex items-center">
                    <A href="/" attr:class="text-xl font-bold">"Linkpulse"</A>
                </div>
            </header>
            <main class="flex-1 flex items-center justify-center p-4">
                <div class="w-full max-w-md rounded-xl shadow-lg p-6 border">
                    <LoginForm />
                </div>
            </main>
        </div>
    }
}
