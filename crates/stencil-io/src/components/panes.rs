//! Side-by-side original and stencil previews.

use dioxus::prelude::*;

/// Props for the [`ImagePanes`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImagePanesProps {
    /// Object URL of the selected image.
    #[props(!optional)]
    original: Option<String>,
    /// Object URL of the latest stencil.
    #[props(!optional)]
    stencil: Option<String>,
    /// Show the loading indicator over the stencil pane.
    loading: bool,
}

/// The original image next to the generated stencil.
///
/// The previous stencil stays visible underneath the loading indicator
/// until a new one arrives.
#[component]
pub fn ImagePanes(props: ImagePanesProps) -> Element {
    let placeholder = stencil_placeholder(props.original.is_some());

    rsx! {
        div { class: "panes",
            figure { class: "pane",
                figcaption { "Original" }
                if let Some(ref url) = props.original {
                    img { src: "{url}", alt: "Selected image" }
                } else {
                    p { class: "pane-empty", "No image selected" }
                }
            }
            figure { class: "pane",
                figcaption { "Stencil" }
                if let Some(ref url) = props.stencil {
                    img { src: "{url}", alt: "Generated stencil" }
                } else if !props.loading {
                    p { class: "pane-empty", "{placeholder}" }
                }
                if props.loading {
                    div { class: "loading", role: "status",
                        div { class: "spinner" }
                        span { "Generating stencil..." }
                    }
                }
            }
        }
    }
}

const fn stencil_placeholder(has_image: bool) -> &'static str {
    if has_image {
        "Adjust the threshold and press Generate"
    } else {
        "Choose an image first"
    }
}
