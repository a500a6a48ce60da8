//! Submission phases and the view state derived from them.

use std::fmt;

use crate::types::GenerationToken;

/// Where the controller is in the submission flow.
///
/// ```text
///            intake              begin_generate
///   Idle ───────────► ImageSelected ─────────► Generating ──ok──► StencilReady
///                          ▲  ▲                  │    │
///                          │  └──── intake ──────┘    └──err──► Failed
///                          └──────────── intake (from any phase)
/// ```
///
/// `StencilReady` and `Failed` both allow another `begin_generate`. A
/// cancelled request returns `Generating` to `StencilReady` when a
/// stencil exists and to `ImageSelected` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet.
    Idle,
    /// An image is selected; no generation has run for it.
    ImageSelected,
    /// A request is in flight.
    Generating {
        /// Token the in-flight request was started with.
        token: GenerationToken,
    },
    /// The last generation succeeded.
    StencilReady,
    /// The last generation failed.
    Failed,
}

impl Phase {
    /// Whether an image has been selected in this phase.
    #[must_use]
    pub const fn has_image(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_generating(self) -> bool {
        matches!(self, Self::Generating { .. })
    }

    /// The in-flight token, if any.
    #[must_use]
    pub const fn in_flight(self) -> Option<GenerationToken> {
        match self {
            Self::Generating { token } => Some(token),
            _ => None,
        }
    }

    /// Short name for log messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ImageSelected => "image-selected",
            Self::Generating { .. } => "generating",
            Self::StencilReady => "stencil-ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the UI should show, derived from the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ViewState {
    /// Threshold controls and the results area are shown.
    pub sections_visible: bool,
    /// The loading indicator is shown.
    pub loading_visible: bool,
    /// The generate control accepts clicks.
    pub generate_enabled: bool,
    /// The download control accepts clicks.
    pub download_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_lacks_an_image() {
        let token = GenerationToken::default();
        assert!(!Phase::Idle.has_image());
        for phase in [
            Phase::ImageSelected,
            Phase::Generating { token },
            Phase::StencilReady,
            Phase::Failed,
        ] {
            assert!(phase.has_image(), "{phase} should have an image");
        }
    }

    #[test]
    fn in_flight_token_only_while_generating() {
        let token = GenerationToken::default().next();
        assert_eq!(Phase::Generating { token }.in_flight(), Some(token));
        assert_eq!(Phase::StencilReady.in_flight(), None);
        assert!(!Phase::Failed.is_generating());
    }
}
