//! Host page integration: embedded configuration and scrolling.

use stencil_core::ClientConfig;

/// Id of the `<script type="application/json">` element that may carry
/// a [`ClientConfig`] override.
pub const CONFIG_ELEMENT_ID: &str = "stencil-config";

/// Read the client configuration embedded in the host page.
///
/// Missing or invalid configuration falls back to the defaults with a
/// warning; the app never refuses to start over it.
#[must_use]
pub fn load_config() -> ClientConfig {
    let Some(json) = embedded_config() else {
        log::debug!("no #{CONFIG_ELEMENT_ID} element, using default configuration");
        return ClientConfig::default();
    };

    match ClientConfig::from_json(&json) {
        Ok(config) => {
            log::info!(
                "loaded configuration: endpoint {} timeout {} ms",
                config.endpoint,
                config.timeout_ms
            );
            config
        }
        Err(e) => {
            log::warn!("ignoring #{CONFIG_ELEMENT_ID}: {e}");
            ClientConfig::default()
        }
    }
}

fn embedded_config() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
    element
        .text_content()
        .filter(|text| !text.trim().is_empty())
}

/// Smoothly scroll the element with `id` into view.
///
/// Does nothing if the element is not in the document.
pub fn scroll_into_view(id: &str) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    else {
        log::debug!("scroll target #{id} not found");
        return;
    };

    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}
