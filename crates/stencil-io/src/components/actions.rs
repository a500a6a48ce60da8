//! Generate and download buttons.

use dioxus::prelude::*;
use stencil_core::ViewState;

const ENABLED_CLASS: &str = "btn btn-primary";
const DISABLED_CLASS: &str = "btn btn-disabled";

/// Props for the [`ActionBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ActionBarProps {
    /// Enablement of both buttons.
    view: ViewState,
    on_generate: EventHandler<()>,
    on_download: EventHandler<()>,
}

#[component]
pub fn ActionBar(props: ActionBarProps) -> Element {
    let generate_enabled = props.view.generate_enabled;
    let download_enabled = props.view.download_enabled;
    let generate_label = if props.view.loading_visible {
        "Generating..."
    } else {
        "Generate stencil"
    };

    rsx! {
        div { class: "actions",
            button {
                class: button_class(generate_enabled),
                disabled: !generate_enabled,
                onclick: move |_| props.on_generate.call(()),
                "{generate_label}"
            }
            button {
                class: button_class(download_enabled),
                disabled: !download_enabled,
                onclick: move |_| props.on_download.call(()),
                "Download PNG"
            }
        }
    }
}

const fn button_class(enabled: bool) -> &'static str {
    if enabled { ENABLED_CLASS } else { DISABLED_CLASS }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_buttons_use_disabled_style() {
        assert_eq!(button_class(true), ENABLED_CLASS);
        assert_eq!(button_class(false), DISABLED_CLASS);
    }
}
