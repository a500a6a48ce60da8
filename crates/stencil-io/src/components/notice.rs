//! Dismissible error banner.

use dioxus::prelude::*;

/// Props for the [`NoticeBanner`] component.
#[derive(Props, Clone, PartialEq)]
pub struct NoticeBannerProps {
    message: String,
    on_dismiss: EventHandler<()>,
}

#[component]
pub fn NoticeBanner(props: NoticeBannerProps) -> Element {
    rsx! {
        div { class: "notice", role: "alert",
            span { "{props.message}" }
            button {
                class: "notice-dismiss",
                aria_label: "Dismiss",
                onclick: move |_| props.on_dismiss.call(()),
                "×"
            }
        }
    }
}
