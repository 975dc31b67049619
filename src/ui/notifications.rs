//! Global toast notifications
//!
//! The session layer raises "session expired" through here; views may use
//! the same manager for their own messages.

use leptos::prelude::*;
use std::collections::VecDeque;

use crate::core::session::SessionNotifier;
use crate::ui::icon::{Icon, icons};

/// Maximum number of notifications to show at once
const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub auto_dismiss_ms: Option<u32>,
}

/// Notification item with unique ID for tracking
#[derive(Clone, Debug)]
pub struct NotificationItem {
    pub id: u64,
    pub notification: Notification,
}

/// Signal-backed queue of visible notifications
#[derive(Clone, Copy)]
pub struct NotificationManager {
    notifications: RwSignal<VecDeque<NotificationItem>>,
    next_id: RwSignal<u64>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: RwSignal::new(VecDeque::new()),
            next_id: RwSignal::new(0),
        }
    }

    pub fn notifications(&self) -> RwSignal<VecDeque<NotificationItem>> {
        self.notifications
    }

    pub fn notify(&self, notification: Notification) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);

        self.notifications.update(|n| {
            n.push_back(NotificationItem { id, notification });

            // Remove oldest if we exceed max
            while n.len() > MAX_NOTIFICATIONS {
                n.pop_front();
            }
        });
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification {
            kind: NotificationKind::Warning,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(8_000),
        });
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: None,
        });
    }

    pub fn dismiss(&self, id: u64) {
        self.notifications.update(|n| n.retain(|i| i.id != id));
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionNotifier for NotificationManager {
    fn session_expired(&self, message: &str) {
        self.warning("Signed out", message);
    }
}

/// Provide the notification manager to the component tree
pub fn provide_notifications() -> NotificationManager {
    let manager = NotificationManager::new();
    provide_context(manager);
    manager
}

pub fn use_notifications() -> NotificationManager {
    expect_context::<NotificationManager>()
}

/// Toast stack; mount once at the application root
#[component]
pub fn NotificationsContainer() -> impl IntoView {
    let manager = use_notifications();

    view! {
        <div class="fixed top-4 right-4 z-50 flex flex-col gap-2 max-w-sm" role="status">
            <For
                each=move || manager.notifications().get()
                key=|item| item.id
                children=move |item| view! { <NotificationToast item=item manager=manager /> }
            />
        </div>
    }
}

#[component]
fn NotificationToast(item: NotificationItem, manager: NotificationManager) -> impl IntoView {
    let id = item.id;
    let notification = item.notification;

    if let Some(_ms) = notification.auto_dismiss_ms {
        #[cfg(feature = "hydrate")]
        {
            use gloo_timers::future::TimeoutFuture;
            use leptos::task::spawn_local;

            spawn_local(async move {
                TimeoutFuture::new(_ms).await;
                manager.dismiss(id);
            });
        }
    }

    let container_class = match notification.kind {
        NotificationKind::Info => "border-blue-500/30 bg-blue-500/10",
        NotificationKind::Warning => "border-yellow-500/30 bg-yellow-500/10",
        NotificationKind::Error => "border-red-500/30 bg-red-500/10",
    };

    view! {
        <div class=format!("flex items-start gap-3 p-4 rounded-lg border shadow-lg {}", container_class)>
            <Icon name=icons::ALERT_CIRCLE class="w-5 h-5" />
            <div class="flex-1 min-w-0">
                <h4 class="text-sm font-medium">{notification.title}</h4>
                <p class="text-xs mt-0.5">{notification.message}</p>
            </div>
            <button class="opacity-60 hover:opacity-100" on:click=move |_| manager.dismiss(id)>
                <Icon name=icons::X class="w-4 h-4" />
            </button>
        </div>
    }
}
