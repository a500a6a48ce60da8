//! The multipart request sent to the stencil server.
//!
//! [`StencilRequest::fields`] is the single description of the wire
//! form; platform services translate it into `FormData` or a
//! `reqwest` form without deciding field names themselves.

use crate::types::{SelectedImage, Threshold};

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the threshold as a decimal string.
pub const THRESHOLD_FIELD: &str = "threshold";

/// One part of the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField<'a> {
    /// A binary file part.
    File {
        /// Field name.
        name: &'static str,
        /// Suggested file name sent with the part.
        filename: &'a str,
        /// Part media type.
        mime: &'a str,
        /// Part body.
        bytes: &'a [u8],
    },
    /// A plain text part.
    Text {
        /// Field name.
        name: &'static str,
        /// Field value.
        value: String,
    },
}

impl FormField<'_> {
    /// The field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File { name, .. } | Self::Text { name, .. } => *name,
        }
    }
}

/// A generation request: the selected image plus the threshold read at
/// the moment generation started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilRequest {
    image: SelectedImage,
    threshold: Threshold,
}

impl StencilRequest {
    /// Build a request. Cloning the image only bumps a reference count.
    #[must_use]
    pub const fn new(image: SelectedImage, threshold: Threshold) -> Self {
        Self { image, threshold }
    }

    /// The image being submitted.
    #[must_use]
    pub const fn image(&self) -> &SelectedImage {
        &self.image
    }

    /// The threshold being submitted.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Multipart fields in the order they are appended.
    #[must_use]
    pub fn fields(&self) -> [FormField<'_>; 2] {
        [
            FormField::File {
                name: IMAGE_FIELD,
                filename: self.image.name(),
                mime: self.image.mime(),
                bytes: self.image.bytes(),
            },
            FormField::Text {
                name: THRESHOLD_FIELD,
                value: self.threshold.form_value(),
            },
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::intake::{self, IntakeFile, IntakeSource};

    fn selected(name: &str) -> SelectedImage {
        let img = image::GrayImage::from_pixel(3, 3, image::Luma([90]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        intake::validate(IntakeFile {
            name: name.into(),
            declared_type: None,
            bytes: out.into_inner(),
            source: IntakeSource::Picker,
        })
        .unwrap()
    }

    #[test]
    fn fields_carry_image_then_threshold() {
        let image = selected("koi.png");
        let request = StencilRequest::new(image.clone(), Threshold::new(73).unwrap());
        let [file, text] = request.fields();

        assert_eq!(file.name(), IMAGE_FIELD);
        assert_eq!(
            file,
            FormField::File {
                name: "image",
                filename: "koi.png",
                mime: "image/png",
                bytes: image.bytes(),
            }
        );
        assert_eq!(
            text,
            FormField::Text {
                name: "threshold",
                value: "73".into(),
            }
        );
    }
}
