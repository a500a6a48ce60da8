//! Controller storage for the Dioxus app.

use dioxus::prelude::*;
use stencil_core::{ControllerCell, SubmissionController};

use crate::blob::BlobStore;

/// The controller as the app holds it.
pub type Session = Signal<SubmissionController<BlobStore>>;

impl ControllerCell<BlobStore> for Signal<SubmissionController<BlobStore>> {
    fn update<T>(&self, f: impl FnOnce(&mut SubmissionController<BlobStore>) -> T) -> T {
        // Signals are Copy handles; the write guard is dropped before
        // returning, so no borrow outlives the closure.
        let mut signal = *self;
        f(&mut signal.write())
    }
}
