//! Login form component
//!
//! Submits credentials through the login flow. On success it replaces the
//! login URL with the pending redirect (or the default landing); on failure
//! it shows the server's detail inline and keeps what the user typed.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use super::context::use_session_context;
use crate::ui::icon::{Icon, icons};

/// Login form component
#[component]
pub fn LoginForm() -> impl IntoView {
    let session = use_session_context();
    let location = use_location();
    let navigate = use_navigate();

    // Form state
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let show_password = RwSignal::new(false);
    let loading = RwSignal::new(false);

    // Form validation
    let email_error = RwSignal::new(None::<String>);
    let password_error = RwSignal::new(None::<String>);
    // Error from the last submission
    let error = RwSignal::new(None::<String>);
    let retryable = RwSignal::new(false);

    let validate_email = move || {
        let value = email.get();
        if value.is_empty() {
            email_error.set(Some("Email is required".to_string()));
            false
        } else if !value.contains('@') {
            email_error.set(Some("Please enter a valid email".to_string()));
            false
        } else {
            email_error.set(None);
            true
        }
    };

    let validate_password = move || {
        if password.get().is_empty() {
            password_error.set(Some("Password is required".to_string()));
            false
        } else {
            password_error.set(None);
            true
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let email_valid = validate_email();
        let password_valid = validate_password();
        if !email_valid || !password_valid || loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let mut current = location.pathname.get_untracked();
        let search = location.search.get_untracked();
        let search = search.trim_start_matches('?');
        if !search.is_empty() {
            current.push('?');
            current.push_str(search);
        }
        let flow = session.login_flow();
        let navigate = navigate.clone();

        loading.set(true);
        spawn_local(async move {
            match flow.submit(&email_val, &password_val, &current).await {
                Ok(destination) => {
                    password.set(String::new());
                    // Replacing the login entry drops the pending redirect
                    navigate(
                        &destination,
                        NavigateOptions {
                            replace: true,
                            ..Default::default()
                        },
                    );
                }
                Err(e) => {
                    retryable.set(e.is_retryable());
                    error.set(Some(e.detail()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-6" novalidate=true>
            <div class="text-center">
                <h2 class="text-2xl font-bold">"Sign in to Linkpulse"</h2>
                <p class="mt-2 text-sm text-muted">
                    "Enter your email and password to continue"
                </p>
            </div>

            // Submission error
            {move || {
                error.get().map(|message| {
                    view! {
                        <div class="p-3 bg-red-100 dark:bg-red-900/30 border border-red-300 dark:border-red-700 rounded-lg" role="alert">
                            <p class="text-sm text-red-700 dark:text-red-300">{message}</p>
                            <Show when=move || retryable.get()>
                                <p class="mt-1 text-xs text-red-600 dark:text-red-400">
                                    "Your details are kept; press Sign In to try again."
                                </p>
                            </Show>
                        </div>
                    }
                })
            }}

            // Email field
            <div>
                <label for="email" class="block text-sm font-medium mb-1">"Email"</label>
                <input
                    type="email"
                    id="email"
                    name="email"
                    autocomplete="email"
                    placeholder="you@example.com"
                    class="w-full px-3 py-2 border rounded-lg focus:outline-none focus:ring-2"
                    class:border-red-500=move || email_error.get().is_some()
                    prop:value=move || email.get()
                    on:input=move |ev| {
                        email.set(event_target_value(&ev));
                        email_error.set(None);
                    }
                    on:blur=move |_| { validate_email(); }
                />
                {move || {
                    email_error.get().map(|message| {
                        view! { <p class="mt-1 text-sm text-red-500">{message}</p> }
                    })
                }}
            </div>

            // Password field
            <div>
                <label for="password" class="block text-sm font-medium mb-1">"Password"</label>
                <div class="relative">
                    <input
                        type=move || if show_password.get() { "text" } else { "password" }
                        id="password"
                        name="password"
                        autocomplete="current-password"
                        placeholder="Enter your password"
                        class="w-full px-3 py-2 pr-10 border rounded-lg focus:outline-none focus:ring-2"
                        class:border-red-500=move || password_error.get().is_some()
                        prop:value=move || password.get()
                        on:input=move |ev| {
                            password.set(event_target_value(&ev));
                            password_error.set(None);
                        }
                        on:blur=move |_| { validate_password(); }
                    />
                    <button
                        type="button"
                        class="absolute inset-y-0 right-0 pr-3 flex items-center"
                        on:click=move |_| show_password.update(|v| *v = !*v)
                    >
                        {move || {
                            if show_password.get() {
                                view! { <Icon name=icons::EYE_CLOSED class="h-5 w-5" /> }.into_any()
                            } else {
                                view! { <Icon name=icons::EYE class="h-5 w-5" /> }.into_any()
                            }
                        }}
                    </button>
                </div>
                {move || {
                    password_error.get().map(|message| {
                        view! { <p class="mt-1 text-sm text-red-500">{message}</p> }
                    })
                }}
            </div>

            <button
                type="submit"
                class="w-full py-2.5 px-4 font-medium rounded-lg disabled:opacity-50 disabled:cursor-not-allowed"
                disabled=move || loading.get()
            >
                {move || {
                    if loading.get() {
                        view! {
                            <span class="flex items-center justify-center">
                                <Icon name=icons::LOADER class="animate-spin -ml-1 mr-2 h-4 w-4" />
                                "Signing in..."
                            </span>
                        }.into_any()
                    } else {
                        view! { <span class="block">"Sign In"</span> }.into_any()
                    }
                }}
            </button>
        </form>
    }
}
