//! Shared types for the stencil submission pipeline.

use std::fmt;
use std::rc::Rc;

/// Media type assumed for a stencil response that carries no
/// `Content-Type` header. The server always encodes PNG.
pub const DEFAULT_STENCIL_MIME: &str = "image/png";

/// Edge-detection sensitivity forwarded unmodified to the stencil server.
///
/// The server expects a value in `0..=100` and rescales it to the 8-bit
/// range itself, so the client never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    /// Lowest accepted value.
    pub const MIN: u8 = 0;
    /// Highest accepted value.
    pub const MAX: u8 = 100;
    /// Value the slider starts at.
    pub const DEFAULT: Self = Self(50);

    /// Create a threshold, returning `None` if `value` exceeds [`Self::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Convert a raw slider reading into a threshold.
    ///
    /// Out-of-range values are clamped and fractional values rounded to
    /// the nearest integer. `NaN` falls back to [`Self::DEFAULT`].
    #[must_use]
    pub fn from_slider(value: f64) -> Self {
        if value.is_nan() {
            return Self::DEFAULT;
        }
        let clamped = value.round().clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = clamped as u8;
        Self(value)
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The value as sent in the `threshold` form field.
    #[must_use]
    pub fn form_value(self) -> String {
        self.0.to_string()
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The picture the user chose, validated and ready to submit.
///
/// Bytes are reference-counted so the in-flight request and the
/// controller can share them without copying a multi-megabyte photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    name: String,
    mime: &'static str,
    bytes: Rc<[u8]>,
    dimensions: Dimensions,
}

impl SelectedImage {
    pub(crate) fn new(
        name: String,
        mime: &'static str,
        bytes: Rc<[u8]>,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            name,
            mime,
            bytes,
            dimensions,
        }
    }

    /// Original file name as reported by the picker or drop event.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media type sniffed from the file contents (e.g. `image/jpeg`).
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.mime
    }

    /// Raw file bytes, exactly as read.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel dimensions read from the image header.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

/// Identifies one generation attempt.
///
/// Every call to `begin_generate` captures a fresh token; a response
/// whose token no longer matches the controller's is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GenerationToken(u64);

impl GenerationToken {
    /// The token following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// The raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Successful response body from the stencil server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilResponse {
    /// Image bytes, verbatim.
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if the server sent one.
    pub mime: Option<String>,
}

impl StencilResponse {
    /// Media type of the body, defaulting to PNG.
    #[must_use]
    pub fn media_type(&self) -> &str {
        self.mime.as_deref().unwrap_or(DEFAULT_STENCIL_MIME)
    }
}

/// A stencil returned by the server, held as a platform resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStencil<H> {
    handle: H,
    mime: String,
    byte_len: usize,
    token: GenerationToken,
}

impl<H> GeneratedStencil<H> {
    pub(crate) const fn new(
        handle: H,
        mime: String,
        byte_len: usize,
        token: GenerationToken,
    ) -> Self {
        Self {
            handle,
            mime,
            byte_len,
            token,
        }
    }

    /// Platform handle (an object URL in the browser).
    pub const fn handle(&self) -> &H {
        &self.handle
    }

    /// Media type reported by the server.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size of the stencil in bytes. Never zero for a stencil held by
    /// the controller.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// The generation that produced this stencil.
    #[must_use]
    pub const fn token(&self) -> GenerationToken {
        self.token
    }

    pub(crate) fn into_handle(self) -> H {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_rejects_values_above_max() {
        assert_eq!(Threshold::new(100).map(Threshold::get), Some(100));
        assert_eq!(Threshold::new(101), None);
        assert_eq!(Threshold::new(0).map(Threshold::get), Some(0));
    }

    #[test]
    fn slider_values_are_clamped_and_rounded() {
        assert_eq!(Threshold::from_slider(42.4).get(), 42);
        assert_eq!(Threshold::from_slider(42.5).get(), 43);
        assert_eq!(Threshold::from_slider(-3.0).get(), 0);
        assert_eq!(Threshold::from_slider(255.0).get(), 100);
        assert_eq!(Threshold::from_slider(f64::NAN), Threshold::DEFAULT);
        assert_eq!(Threshold::from_slider(f64::INFINITY).get(), 100);
    }

    #[test]
    fn threshold_form_value_is_plain_decimal() {
        assert_eq!(Threshold::DEFAULT.form_value(), "50");
        assert_eq!(Threshold::from_slider(7.0).form_value(), "7");
    }

    #[test]
    fn tokens_increase() {
        let first = GenerationToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 1);
        assert_eq!(second.to_string(), "#1");
    }

    #[test]
    fn response_media_type_defaults_to_png() {
        let mut response = StencilResponse {
            bytes: vec![1, 2, 3],
            mime: None,
        };
        assert_eq!(response.media_type(), "image/png");
        response.mime = Some("image/webp".into());
        assert_eq!(response.media_type(), "image/webp");
    }
}
