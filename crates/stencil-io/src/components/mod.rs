//! Dioxus UI components for the stencil client.
//!
//! Provides the file picker with its drop zone, the threshold slider,
//! the original/stencil image panes, the generate/download action bar,
//! and the error notice banner.

mod actions;
mod notice;
mod panes;
mod threshold;
mod upload;

pub use actions::ActionBar;
pub use notice::NoticeBanner;
pub use panes::ImagePanes;
pub use threshold::ThresholdSlider;
pub use upload::FileUpload;
