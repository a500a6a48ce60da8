//! Error taxonomy for user-triggered actions.
//!
//! Every failure is caught at the action that caused it and turned into
//! a notice for the user; nothing propagates past the controller.

use crate::intake::IntakeError;

/// Failure of the round trip to the stencil server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request could not be built (e.g. a browser API refused the
    /// form data).
    #[error("failed to build request: {0}")]
    Request(String),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server responded with HTTP {0}")]
    Status(u16),

    /// The server answered with an empty body.
    #[error("server returned an empty stencil")]
    EmptyResponse,

    /// No response within the configured timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u32),

    /// The request was aborted because a newer action superseded it.
    #[error("request cancelled")]
    Cancelled,
}

/// Failure to create, release, or save a platform resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors surfaced by [`SubmissionController`](crate::SubmissionController)
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Generate was requested before any image was selected.
    #[error("no image selected")]
    NoImageSelected,

    /// Download was requested before any stencil was generated.
    #[error("no stencil available")]
    NoStencilAvailable,

    /// Generate was requested while a previous request is in flight.
    #[error("a stencil is already being generated")]
    GenerationInProgress,

    /// The chosen file was refused.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// The round trip failed or the server rejected the request.
    #[error("stencil generation failed: {0}")]
    NetworkOrServerFailure(#[from] ServiceError),

    /// A platform resource could not be created or saved.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
}

impl SubmissionError {
    /// Message suitable for showing to the user.
    ///
    /// Server failures get one generic message regardless of the status
    /// code; the detail goes to the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoImageSelected => "Please select an image first.".into(),
            Self::NoStencilAvailable => "Generate a stencil first.".into(),
            Self::GenerationInProgress => "A stencil is already being generated.".into(),
            Self::Intake(e) => e.user_message(),
            Self::NetworkOrServerFailure(ServiceError::Timeout(_)) => {
                "The stencil server took too long to respond. Please try again.".into()
            }
            Self::NetworkOrServerFailure(_) => {
                "Could not generate the stencil. Make sure the server is running.".into()
            }
            Self::Resource(_) => "Could not prepare the image in the browser.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_failures_share_one_user_message() {
        let a = SubmissionError::from(ServiceError::Status(500)).user_message();
        let b = SubmissionError::from(ServiceError::Status(404)).user_message();
        let c = SubmissionError::from(ServiceError::Network("refused".into())).user_message();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn display_keeps_diagnostic_detail() {
        let err = SubmissionError::from(ServiceError::Status(502));
        assert_eq!(
            err.to_string(),
            "stencil generation failed: server responded with HTTP 502"
        );
    }

    #[test]
    fn intake_errors_pass_through() {
        let err = SubmissionError::from(IntakeError::Empty {
            name: "a.png".into(),
        });
        assert_eq!(err.to_string(), "a.png is empty");
        assert!(err.user_message().starts_with("a.png is empty"));
    }
}
