//! stencil-io: Browser I/O and Dioxus component library.
//!
//! Implements the `stencil-core` platform traits for the browser
//! ([`FetchStencilService`] over `fetch`, [`BlobStore`] over object
//! URLs) and provides the UI components of the stencil web client.

pub mod blob;
pub mod components;
pub mod page;
pub mod service;
pub mod session;

pub use blob::{BlobStore, BlobUrl};
pub use components::{ActionBar, FileUpload, ImagePanes, NoticeBanner, ThresholdSlider};
pub use service::FetchStencilService;
pub use session::Session;
