//! stencil-core: Sans-IO submission pipeline for the stencil client.
//!
//! Models the whole client-side flow of turning a photo into a tattoo
//! stencil:
//! file intake -> threshold selection -> one POST to the stencil
//! server -> previewable/downloadable result.
//!
//! This crate has **no I/O dependencies**. The network round trip and
//! the browser-held resources (object URLs, save-as downloads) sit
//! behind the [`StencilService`] and [`ResourceStore`] traits, which
//! `stencil-io` implements for the browser and `stencil-cli` for the
//! command line.
//!
//! ```rust
//! # use std::cell::RefCell;
//! # use stencil_core::{ClientConfig, SubmissionController, ResourceStore, ResourceError};
//! # struct Noop;
//! # impl ResourceStore for Noop {
//! #     type Handle = ();
//! #     fn acquire(&mut self, _: &[u8], _: &str) -> Result<(), ResourceError> { Ok(()) }
//! #     fn release(&mut self, _: ()) {}
//! #     fn save_as(&self, _: &(), _: &str) -> Result<(), ResourceError> { Ok(()) }
//! # }
//! let controller = RefCell::new(SubmissionController::new(ClientConfig::default(), Noop));
//! assert!(!controller.borrow().view().generate_enabled);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod intake;
pub mod platform;
pub mod state;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use controller::{
    GenerationOutcome, GenerationTicket, IntakeOutcome, SubmissionController, generate, intake,
};
pub use error::{ResourceError, ServiceError, SubmissionError};
pub use form::{FormField, IMAGE_FIELD, StencilRequest, THRESHOLD_FIELD};
pub use intake::{IntakeError, IntakeFile, IntakeSource};
pub use platform::{ControllerCell, ResourceStore, StencilService};
pub use state::{Phase, ViewState};
pub use types::{
    Dimensions, GeneratedStencil, GenerationToken, SelectedImage, StencilResponse, Threshold,
};
