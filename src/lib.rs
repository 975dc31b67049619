//! Linkpulse - monitoring dashboard client
//!
//! A Leptos application whose core is the client-side session state machine:
//! session store, auth client, protected-request interceptor, route guard
//! and login flow (see [`core::session`]).

#![recursion_limit = "512"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
