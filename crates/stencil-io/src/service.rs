//! `fetch`-based client for the stencil endpoint.
//!
//! Each request gets its own `AbortController`. It is aborted when a
//! newer request starts, when [`StencilService::cancel`] is called, or
//! when the configured timeout elapses, whichever comes first.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stencil_core::{
    ClientConfig, FormField, ServiceError, StencilRequest, StencilResponse, StencilService,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::blob::bytes_to_blob;

/// Stencil service that POSTs multipart form data with `fetch`.
pub struct FetchStencilService {
    endpoint: String,
    timeout_ms: u32,
    in_flight: RefCell<Option<web_sys::AbortController>>,
}

impl FetchStencilService {
    /// Create a service for the endpoint and timeout in `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
            in_flight: RefCell::new(None),
        }
    }
}

impl StencilService for FetchStencilService {
    #[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
    async fn generate(&self, request: &StencilRequest) -> Result<StencilResponse, ServiceError> {
        let form = build_form(request).map_err(|e| ServiceError::Request(format!("{e:?}")))?;
        let abort = web_sys::AbortController::new()
            .map_err(|e| ServiceError::Request(format!("{e:?}")))?;

        if let Some(previous) = self.in_flight.replace(Some(abort.clone())) {
            log::debug!("aborting previous stencil request");
            previous.abort();
        }

        let timed_out = Rc::new(Cell::new(false));
        let timeout = {
            let abort = abort.clone();
            let timed_out = Rc::clone(&timed_out);
            gloo_timers::callback::Timeout::new(self.timeout_ms, move || {
                timed_out.set(true);
                abort.abort();
            })
        };

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);
        init.set_signal(Some(&abort.signal()));

        log::debug!("POST {}", self.endpoint);
        let result = match post(&self.endpoint, &init).await {
            Err(ServiceError::Network(_)) if timed_out.get() => {
                Err(ServiceError::Timeout(self.timeout_ms))
            }
            Err(ServiceError::Network(_)) if abort.signal().aborted() => {
                Err(ServiceError::Cancelled)
            }
            other => other,
        };

        // Dropping the timeout cancels it.
        drop(timeout);

        // Forget the controller unless a newer request already replaced it.
        let mut slot = self.in_flight.borrow_mut();
        if slot.as_ref() == Some(&abort) {
            *slot = None;
        }

        result
    }

    fn cancel(&self) {
        if let Some(abort) = self.in_flight.take() {
            log::debug!("cancelling stencil request");
            abort.abort();
        }
    }
}

/// Translate the request fields into browser `FormData`.
fn build_form(request: &StencilRequest) -> Result<web_sys::FormData, JsValue> {
    let form = web_sys::FormData::new()?;
    for field in request.fields() {
        match field {
            FormField::File {
                name,
                filename,
                mime,
                bytes,
            } => {
                let blob = bytes_to_blob(bytes, mime)?;
                form.append_with_blob_and_filename(name, &blob, filename)?;
            }
            FormField::Text { name, value } => form.append_with_str(name, &value)?,
        }
    }
    Ok(form)
}

/// Send the request and read the full body.
#[allow(clippy::future_not_send)]
async fn post(
    endpoint: &str,
    init: &web_sys::RequestInit,
) -> Result<StencilResponse, ServiceError> {
    let window =
        web_sys::window().ok_or_else(|| ServiceError::Request("no global window".into()))?;

    let value = JsFuture::from(window.fetch_with_str_and_init(endpoint, init))
        .await
        .map_err(network_error)?;
    let response: web_sys::Response = value
        .dyn_into()
        .map_err(|_| ServiceError::Network("fetch did not resolve to a Response".into()))?;

    if !response.ok() {
        return Err(ServiceError::Status(response.status()));
    }

    let mime = response.headers().get("content-type").ok().flatten();
    let buffer = JsFuture::from(response.array_buffer().map_err(network_error)?)
        .await
        .map_err(network_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(StencilResponse { bytes, mime })
}

fn network_error(value: JsValue) -> ServiceError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map_or_else(|| format!("{value:?}"), |e| String::from(e.message()));
    ServiceError::Network(message)
}
