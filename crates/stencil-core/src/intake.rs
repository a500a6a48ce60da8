//! File intake: validate a picked or dropped file and read its header.
//!
//! Both intake paths (file picker and drag-and-drop) go through
//! [`validate`], so a non-image is rejected with the same message no
//! matter how it arrived.

use std::io::Cursor;
use std::rc::Rc;

use image::{ImageFormat, ImageReader};

use crate::types::{Dimensions, SelectedImage};

/// Image formats the stencil server can decode.
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// `accept` attribute for the file picker, matching [`ACCEPTED_FORMATS`].
pub const ACCEPT_ATTRIBUTE: &str = "image/png,image/jpeg,image/bmp,image/webp,image/gif";

/// How a file reached the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeSource {
    /// Chosen through the file picker (click-to-browse).
    Picker,
    /// Dropped onto the upload target.
    Drop,
}

impl IntakeSource {
    /// Short name for log messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Picker => "picker",
            Self::Drop => "drop",
        }
    }
}

/// A file handed over by the platform, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeFile {
    /// File name as reported by the platform.
    pub name: String,
    /// Media type declared by the platform, if any. Browsers leave
    /// this empty for unknown extensions.
    pub declared_type: Option<String>,
    /// Full file contents.
    pub bytes: Vec<u8>,
    /// Which intake path produced the file.
    pub source: IntakeSource,
}

/// Reasons a file is refused at intake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    /// The file has no content.
    #[error("{name} is empty")]
    Empty {
        /// Offending file name.
        name: String,
    },

    /// The file is not an image at all.
    #[error("{name} is not an image ({detail})")]
    NotAnImage {
        /// Offending file name.
        name: String,
        /// Declared media type or sniffing result.
        detail: String,
    },

    /// The file is an image in a format the server cannot read.
    #[error("{name} is a {format} image, which is not supported")]
    Unsupported {
        /// Offending file name.
        name: String,
        /// Detected format.
        format: String,
    },

    /// The header could not be decoded.
    #[error("failed to decode {name}: {detail}")]
    Decode {
        /// Offending file name.
        name: String,
        /// Decoder message.
        detail: String,
    },
}

impl IntakeError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Empty { name } => format!("{name} is empty. Choose another file."),
            Self::NotAnImage { name, .. } => {
                format!("{name} is not an image. Choose a PNG, JPEG, BMP, WebP or GIF file.")
            }
            Self::Unsupported { name, format } => {
                format!("{name} is a {format} image. Choose a PNG, JPEG, BMP, WebP or GIF file.")
            }
            Self::Decode { name, .. } => format!("{name} could not be read as an image."),
        }
    }
}

/// Validate an incoming file and turn it into a [`SelectedImage`].
///
/// Checks, in order:
/// 1. the file is non-empty,
/// 2. any declared media type is `image/*`,
/// 3. the bytes sniff as one of the accepted formats,
/// 4. the header yields pixel dimensions.
///
/// # Errors
///
/// Returns the first [`IntakeError`] encountered.
pub fn validate(file: IntakeFile) -> Result<SelectedImage, IntakeError> {
    let IntakeFile {
        name,
        declared_type,
        bytes,
        source,
    } = file;

    if bytes.is_empty() {
        return Err(IntakeError::Empty { name });
    }

    if let Some(declared) = declared_type.as_deref().filter(|t| !t.is_empty())
        && !declared.starts_with("image/")
    {
        return Err(IntakeError::NotAnImage {
            name,
            detail: format!("declared as {declared}"),
        });
    }

    let format = image::guess_format(&bytes).map_err(|_| IntakeError::NotAnImage {
        name: name.clone(),
        detail: "unrecognized content".into(),
    })?;

    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(IntakeError::Unsupported {
            name,
            format: format!("{format:?}"),
        });
    }

    let (width, height) = ImageReader::with_format(Cursor::new(bytes.as_slice()), format)
        .into_dimensions()
        .map_err(|e| IntakeError::Decode {
            name: name.clone(),
            detail: e.to_string(),
        })?;

    log::debug!(
        "accepted {name} via {}: {} {width}x{height}, {} bytes",
        source.label(),
        format.to_mime_type(),
        bytes.len(),
    );

    Ok(SelectedImage::new(
        name,
        format.to_mime_type(),
        Rc::from(bytes),
        Dimensions { width, height },
    ))
}
