//! Seams between the sans-IO controller and the platform it runs on.

use std::cell::RefCell;

use crate::controller::SubmissionController;
use crate::error::{ResourceError, ServiceError};
use crate::form::StencilRequest;
use crate::types::StencilResponse;

/// The external stencil server.
///
/// Implementations send exactly one request per [`generate`](Self::generate)
/// call and never retry.
// Futures are awaited on a single-threaded executor (browser event loop
// or `block_on`), so no `Send` bound is promised.
#[allow(async_fn_in_trait)]
pub trait StencilService {
    /// POST `request` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] on network failure, non-success status,
    /// empty body, timeout, or cancellation.
    async fn generate(&self, request: &StencilRequest) -> Result<StencilResponse, ServiceError>;

    /// Abort the in-flight request, if any. The pending
    /// [`generate`](Self::generate) call then resolves with
    /// [`ServiceError::Cancelled`].
    fn cancel(&self) {}
}

/// Owner of platform-held resources: displayable handles for image bytes
/// and the save-as action.
pub trait ResourceStore {
    /// Resource reference (an object URL in the browser).
    type Handle;

    /// Make `bytes` displayable and downloadable.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the platform refuses.
    fn acquire(&mut self, bytes: &[u8], mime: &str) -> Result<Self::Handle, ResourceError>;

    /// Free a handle returned by [`acquire`](Self::acquire).
    fn release(&mut self, handle: Self::Handle);

    /// Offer the resource to the user as a file named `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the save could not be started.
    fn save_as(&self, handle: &Self::Handle, filename: &str) -> Result<(), ResourceError>;
}

/// Shared, interior-mutable access to a controller.
///
/// The async driver borrows the controller only between suspension
/// points, so a UI event handled while a request is in flight never
/// finds it locked.
pub trait ControllerCell<R: ResourceStore> {
    /// Run `f` with exclusive access to the controller.
    fn update<T>(&self, f: impl FnOnce(&mut SubmissionController<R>) -> T) -> T;
}

impl<R: ResourceStore> ControllerCell<R> for RefCell<SubmissionController<R>> {
    fn update<T>(&self, f: impl FnOnce(&mut SubmissionController<R>) -> T) -> T {
        f(&mut self.borrow_mut())
    }
}
