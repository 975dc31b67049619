use leptos::prelude::*;

#[component]
pub fn Icon(
    /// Icon file name under `/icons`, without the `.svg` extension
    name: &'static str,
    #[prop(default = "w-5 h-5")]
    class: &'static str,
) -> impl IntoView {
    let icon_path = format!("/icons/{}.svg", name);

    view! {
        <img
            src=icon_path
            class=class
            alt=name
            draggable=false
        />
    }
}

/// Icons shipped in `public/icons`
pub mod icons {
    pub const X: &str = "x";
    pub const EYE: &str = "eye";
    pub const EYE_CLOSED: &str = "eye-closed";
    pub const ALERT_CIRCLE: &str = "alert-circle";
    pub const LOADER: &str = "loader";
    pub const LOGOUT: &str = "logout";
    pub const REFRESH: &str = "refresh";
}
