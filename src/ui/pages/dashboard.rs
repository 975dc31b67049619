//! Dashboard page component
//!
//! Protected view showing the server time and the client address as seen by
//! the API. The status panel refreshes on a fixed interval while mounted.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use serde::{Deserialize, Serialize};

use crate::ui::auth::{SessionContext, UserMenu, use_session_context};
use crate::ui::icon::{Icon, icons};

/// Status payload of the protected status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub time: String,
    pub ip: Option<String>,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col">
            <header class="border-b">
                <div class="max-w-5xl mx-auto px-4 h-16 flex items-center justify-between">
                    <A href="/" attr:class="text-xl font-bold">"Linkpulse"</A>
                    <UserMenu />
                </div>
            </header>
            <main class="max-w-5xl w-full mx-auto px-4 py-8">
                <StatusPanel />
            </main>
        </div>
    }
}

/// Fetch the status once, reporting into the given signals
fn refresh(
    session: SessionContext,
    status: RwSignal<Option<ServerStatus>>,
    error: RwSignal<Option<String>>,
) -> impl Future<Output = ()> + 'static {
    let client = session.protected();
    let path = session.config().status_path;
    async move {
        match client.get_json::<ServerStatus>(&path).await {
            Ok(current) => {
                status.try_set(Some(current));
                error.try_set(None);
            }
            // Expiry is already announced and the guard takes over
            Err(e) if e.is_unauthorized() => {}
            Err(e) => {
                error.try_set(Some(e.detail()));
            }
        }
    }
}

#[component]
fn StatusPanel() -> impl IntoView {
    let session = use_session_context();
    let status = RwSignal::new(None::<ServerStatus>);
    let error = RwSignal::new(None::<String>);

    // Poll while this panel is mounted; cleanup stops the loop
    #[cfg(feature = "hydrate")]
    {
        use gloo_timers::future::TimeoutFuture;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let interval = session.config().poll_interval_ms;
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);
        on_cleanup(move || flag.store(false, Ordering::Relaxed));

        spawn_local(async move {
            while alive.load(Ordering::Relaxed) {
                refresh(session, status, error).await;
                TimeoutFuture::new(interval).await;
            }
        });
    }

    let on_refresh = move |_| spawn_local(refresh(session, status, error));

    view! {
        <section class="rounded-lg border p-4 shadow-md">
            <div class="flex items-center justify-between mb-4">
                <h1 class="text-2xl font-semibold">"Status"</h1>
                <button class="p-2 rounded hover:bg-neutral-100 dark:hover:bg-neutral-700" title="Refresh" on:click=on_refresh>
                    <Icon name=icons::REFRESH class="w-5 h-5" />
                </button>
            </div>
            {move || {
                error.get().map(|message| {
                    view! {
                        <p class="mb-3 text-sm text-red-600 dark:text-red-400" role="alert">{message}</p>
                    }
                })
            }}
            <p class="mx-4 my-2">
                "The current time is: "
                <code class="rounded border px-1 font-mono">
                    {move || status.get().map(|s| s.time).unwrap_or_else(|| "N/A".to_string())}
                </code>
            </p>
            <p class="mx-4 my-2">
                "Your IP address is: "
                <code class="rounded border px-1 font-mono">
                    {move || status.get().and_then(|s| s.ip).unwrap_or_else(|| "N/A".to_string())}
                </code>
            </p>
        </section>
    }
}
