//! Blob URLs and save-as downloads.
//!
//! [`BlobStore`] is the browser [`ResourceStore`]: every image the
//! controller needs to display becomes an object URL, revoked when the
//! controller releases it. Downloads click a temporary `<a download>`
//! element pointing at an existing URL, since Dioxus has no download
//! API of its own.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use std::fmt;

use stencil_core::{ResourceError, ResourceStore};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// An object URL created by [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// The URL, usable as an `<img src>` or `<a href>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Browser-backed resource store. Counts live object URLs for logging.
#[derive(Debug, Default)]
pub struct BlobStore {
    live: usize,
}

impl ResourceStore for BlobStore {
    type Handle = BlobUrl;

    fn acquire(&mut self, bytes: &[u8], mime: &str) -> Result<BlobUrl, ResourceError> {
        let blob = bytes_to_blob(bytes, mime).map_err(js_error)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;
        self.live += 1;
        log::debug!("created {url} for {} bytes of {mime} ({} live)", bytes.len(), self.live);
        Ok(BlobUrl(url))
    }

    fn release(&mut self, handle: BlobUrl) {
        // Best-effort: the URL may already be gone with its document.
        let _ = web_sys::Url::revoke_object_url(&handle.0);
        self.live = self.live.saturating_sub(1);
        log::debug!("revoked {handle} ({} live)", self.live);
    }

    fn save_as(&self, handle: &BlobUrl, filename: &str) -> Result<(), ResourceError> {
        trigger_download(handle.as_str(), filename)
    }
}

/// Wrap `bytes` in a `Blob` of type `mime`.
pub(crate) fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<web_sys::Blob, JsValue> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}

/// Start a download of the resource at `url`.
///
/// Programmatically clicks a temporary `<a download="filename">`
/// element. The URL itself stays valid; it belongs to the store.
fn trigger_download(url: &str, filename: &str) -> Result<(), ResourceError> {
    let window =
        web_sys::window().ok_or_else(|| ResourceError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ResourceError::JsError("no document".into()))?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| ResourceError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| ResourceError::JsError("no document body".into()))?;
    body.append_child(&anchor).map_err(js_error)?;
    anchor.click();

    // The download has started; a failed removal only leaves a detached
    // anchor behind.
    let _ = body.remove_child(&anchor);

    Ok(())
}

fn js_error(value: JsValue) -> ResourceError {
    ResourceError::JsError(format!("{value:?}"))
}
