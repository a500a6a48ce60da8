//! The submission controller: intake, generation, and download.
//!
//! [`SubmissionController`] is a synchronous state machine. The one
//! network round trip is split around it:
//!
//! 1. [`SubmissionController::begin_generate`] checks preconditions,
//!    captures a [`GenerationToken`], and hands back the request.
//! 2. The caller awaits a [`StencilService`].
//! 3. [`SubmissionController::finish_generate`] applies the result, or
//!    discards it if the token has been superseded in the meantime.
//!
//! [`generate`] and [`intake`] run these steps against any
//! [`ControllerCell`], so the browser app and the CLI share one flow.

use crate::config::ClientConfig;
use crate::error::{ServiceError, SubmissionError};
use crate::form::StencilRequest;
use crate::intake::{self, IntakeFile};
use crate::platform::{ControllerCell, ResourceStore, StencilService};
use crate::state::{Phase, ViewState};
use crate::types::{GeneratedStencil, GenerationToken, SelectedImage, StencilResponse, Threshold};

/// The selected image together with its displayable handle.
struct Selection<H> {
    image: SelectedImage,
    preview: H,
}

/// Result of a successful intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOutcome {
    /// `true` the first time an image is accepted, when the controls and
    /// results sections appear. `false` on every later intake.
    pub revealed: bool,
    /// The in-flight generation this intake invalidated, if any.
    pub superseded: Option<GenerationToken>,
}

/// A started generation: the token to finish it with and the request
/// to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    /// Token identifying this attempt.
    pub token: GenerationToken,
    /// The request to POST.
    pub request: StencilRequest,
}

/// How a finished generation was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A new stencil replaced the previous one.
    Applied(GenerationToken),
    /// The request failed; the previous stencil, if any, is untouched.
    Failed(SubmissionError),
    /// The response arrived after a newer action and was dropped.
    Stale(GenerationToken),
    /// The request was aborted before it finished. No notice is shown
    /// and the previous stencil, if any, is untouched.
    Cancelled(GenerationToken),
}

/// Owns the submission state and every platform resource it creates.
///
/// Holds at most one preview handle and one stencil handle. A handle is
/// released when it is replaced and when the controller is dropped.
pub struct SubmissionController<R: ResourceStore> {
    config: ClientConfig,
    resources: R,
    phase: Phase,
    selection: Option<Selection<R::Handle>>,
    stencil: Option<GeneratedStencil<R::Handle>>,
    threshold: Threshold,
    last_token: GenerationToken,
    notice: Option<SubmissionError>,
    sections_revealed: bool,
}

impl<R: ResourceStore> SubmissionController<R> {
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: ClientConfig, resources: R) -> Self {
        let threshold = config.initial_threshold();
        Self {
            config,
            resources,
            phase: Phase::Idle,
            selection: None,
            stencil: None,
            threshold,
            last_token: GenerationToken::default(),
            notice: None,
            sections_revealed: false,
        }
    }

    /// The configuration the controller was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The platform resource store.
    #[must_use]
    pub const fn resources(&self) -> &R {
        &self.resources
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current threshold.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// The selected image, if any.
    #[must_use]
    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selection.as_ref().map(|s| &s.image)
    }

    /// Displayable handle of the selected image.
    #[must_use]
    pub fn preview(&self) -> Option<&R::Handle> {
        self.selection.as_ref().map(|s| &s.preview)
    }

    /// The current stencil, if a generation has succeeded.
    #[must_use]
    pub const fn stencil(&self) -> Option<&GeneratedStencil<R::Handle>> {
        self.stencil.as_ref()
    }

    /// The message to show the user, if the last action failed.
    #[must_use]
    pub const fn notice(&self) -> Option<&SubmissionError> {
        self.notice.as_ref()
    }

    /// Clear the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Show an error that happened before the controller was involved,
    /// such as the platform failing to read a dropped file.
    pub fn report(&mut self, err: SubmissionError) {
        self.reject(err);
    }

    /// Visibility and enablement of every UI element.
    #[must_use]
    pub const fn view(&self) -> ViewState {
        let generating = self.phase.is_generating();
        ViewState {
            sections_visible: self.sections_revealed,
            loading_visible: generating,
            generate_enabled: self.phase.has_image() && !generating,
            download_enabled: self.stencil.is_some(),
        }
    }

    /// Accept a picked or dropped file.
    ///
    /// Any in-flight generation is superseded: its response will be
    /// discarded as stale. The previous preview handle is released.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Intake`] if the file is refused and
    /// [`SubmissionError::Resource`] if no preview could be created. In
    /// both cases the previous selection stays in place.
    pub fn on_file_intake(&mut self, file: IntakeFile) -> Result<IntakeOutcome, SubmissionError> {
        let image = match intake::validate(file) {
            Ok(image) => image,
            Err(e) => return Err(self.reject(e.into())),
        };

        let preview = match self.resources.acquire(image.bytes(), image.mime()) {
            Ok(handle) => handle,
            Err(e) => return Err(self.reject(e.into())),
        };

        if let Some(old) = self.selection.replace(Selection { image, preview }) {
            self.resources.release(old.preview);
        }

        let superseded = self.phase.in_flight();
        if let Some(token) = superseded {
            log::info!("generation {token} superseded by a new image");
        }

        let revealed = !self.sections_revealed;
        self.sections_revealed = true;
        self.notice = None;
        self.transition(Phase::ImageSelected);

        Ok(IntakeOutcome {
            revealed,
            superseded,
        })
    }

    /// Update the threshold.
    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }

    /// Update the threshold from a raw slider reading.
    pub fn set_threshold_from_slider(&mut self, value: f64) {
        self.set_threshold(Threshold::from_slider(value));
    }

    /// Start a generation.
    ///
    /// On success the controller is [`Phase::Generating`] (loading
    /// indicator visible) until [`finish_generate`](Self::finish_generate)
    /// is called with the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NoImageSelected`] with no image and
    /// [`SubmissionError::GenerationInProgress`] while another request
    /// is in flight. Neither changes the phase.
    pub fn begin_generate(&mut self) -> Result<GenerationTicket, SubmissionError> {
        if self.phase.is_generating() {
            return Err(self.reject(SubmissionError::GenerationInProgress));
        }
        let Some(image) = self.selection.as_ref().map(|s| s.image.clone()) else {
            return Err(self.reject(SubmissionError::NoImageSelected));
        };

        let token = self.last_token.next();
        self.last_token = token;
        self.notice = None;
        self.transition(Phase::Generating { token });

        Ok(GenerationTicket {
            token,
            request: StencilRequest::new(image, self.threshold),
        })
    }

    /// Apply the result of the generation started with `token`.
    ///
    /// A result whose token is no longer in flight is dropped without
    /// touching any state. A cancelled request settles back without a
    /// notice. On failure the previous stencil is kept. On success the
    /// new stencil is acquired, then the previous one is released.
    pub fn finish_generate(
        &mut self,
        token: GenerationToken,
        result: Result<StencilResponse, ServiceError>,
    ) -> GenerationOutcome {
        if self.phase.in_flight() != Some(token) {
            log::debug!("dropping stale response for generation {token}");
            return GenerationOutcome::Stale(token);
        }

        let response = match result {
            Err(ServiceError::Cancelled) => {
                log::debug!("generation {token} cancelled");
                let settled = if self.stencil.is_some() {
                    Phase::StencilReady
                } else {
                    Phase::ImageSelected
                };
                self.transition(settled);
                return GenerationOutcome::Cancelled(token);
            }
            Ok(response) if response.bytes.is_empty() => {
                return self.fail(ServiceError::EmptyResponse.into());
            }
            Ok(response) => response,
            Err(e) => return self.fail(e.into()),
        };

        let handle = match self
            .resources
            .acquire(&response.bytes, response.media_type())
        {
            Ok(handle) => handle,
            Err(e) => return self.fail(e.into()),
        };

        let stencil = GeneratedStencil::new(
            handle,
            response.media_type().to_owned(),
            response.bytes.len(),
            token,
        );
        if let Some(old) = self.stencil.replace(stencil) {
            self.resources.release(old.into_handle());
        }

        self.notice = None;
        self.transition(Phase::StencilReady);
        GenerationOutcome::Applied(token)
    }

    /// Save the current stencil under the configured file name.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NoStencilAvailable`] before any
    /// successful generation, and [`SubmissionError::Resource`] if the
    /// platform refused the save.
    pub fn on_download(&mut self) -> Result<(), SubmissionError> {
        let Some(stencil) = self.stencil.as_ref() else {
            return Err(self.reject(SubmissionError::NoStencilAvailable));
        };

        let filename = &self.config.download_filename;
        if let Err(e) = self.resources.save_as(stencil.handle(), filename) {
            return Err(self.reject(e.into()));
        }
        log::info!(
            "saved stencil {} as {filename} ({} bytes of {})",
            stencil.token(),
            stencil.byte_len(),
            stencil.mime()
        );
        Ok(())
    }

    fn transition(&mut self, next: Phase) {
        log::debug!("submission {} -> {next}", self.phase);
        self.phase = next;
    }

    /// Record a refused action as the user notice.
    fn reject(&mut self, err: SubmissionError) -> SubmissionError {
        log::warn!("{err}");
        self.notice = Some(err.clone());
        err
    }

    fn fail(&mut self, err: SubmissionError) -> GenerationOutcome {
        self.transition(Phase::Failed);
        GenerationOutcome::Failed(self.reject(err))
    }
}

impl<R: ResourceStore> Drop for SubmissionController<R> {
    fn drop(&mut self) {
        if let Some(selection) = self.selection.take() {
            self.resources.release(selection.preview);
        }
        if let Some(stencil) = self.stencil.take() {
            self.resources.release(stencil.into_handle());
        }
    }
}

/// Accept a file and cancel any request it supersedes.
///
/// # Errors
///
/// Propagates the error from [`SubmissionController::on_file_intake`].
pub fn intake<C, S, R>(
    cell: &C,
    service: &S,
    file: IntakeFile,
) -> Result<IntakeOutcome, SubmissionError>
where
    C: ControllerCell<R>,
    S: StencilService,
    R: ResourceStore,
{
    let outcome = cell.update(|c| c.on_file_intake(file))?;
    if outcome.superseded.is_some() {
        service.cancel();
    }
    Ok(outcome)
}

/// Run one complete generation: begin, send exactly one request, finish.
///
/// The controller is borrowed only before and after the request, never
/// across the await.
///
/// # Errors
///
/// Returns the precondition error from
/// [`SubmissionController::begin_generate`]; no request is sent in that
/// case. Failures of the request itself are reported as
/// [`GenerationOutcome::Failed`].
#[allow(clippy::future_not_send)] // Single-threaded executors; the controller is !Send
pub async fn generate<C, S, R>(cell: &C, service: &S) -> Result<GenerationOutcome, SubmissionError>
where
    C: ControllerCell<R>,
    S: StencilService,
    R: ResourceStore,
{
    let GenerationTicket { token, request } = cell.update(|c| c.begin_generate())?;

    log::info!(
        "generation {token}: submitting {} ({} bytes) with threshold {}",
        request.image().name(),
        request.image().bytes().len(),
        request.threshold(),
    );
    let started = web_time::Instant::now();
    let result = service.generate(&request).await;
    let elapsed_ms = started.elapsed().as_millis();

    match &result {
        Ok(response) => log::info!(
            "generation {token}: {} bytes of {} in {elapsed_ms} ms",
            response.bytes.len(),
            response.media_type(),
        ),
        Err(e) => log::warn!("generation {token} failed after {elapsed_ms} ms: {e}"),
    }

    Ok(cell.update(|c| c.finish_generate(token, result)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    use super::*;
    use crate::error::ResourceError;
    use crate::intake::IntakeSource;

    /// Store that tracks live handles in a list shared with the test.
    #[derive(Default)]
    struct CountingStore {
        next: u32,
        live: Rc<RefCell<Vec<u32>>>,
        fail_acquire: bool,
    }

    impl ResourceStore for CountingStore {
        type Handle = u32;

        fn acquire(&mut self, _bytes: &[u8], _mime: &str) -> Result<u32, ResourceError> {
            if self.fail_acquire {
                return Err(ResourceError::JsError("quota".into()));
            }
            self.next += 1;
            self.live.borrow_mut().push(self.next);
            Ok(self.next)
        }

        fn release(&mut self, handle: u32) {
            self.live.borrow_mut().retain(|h| *h != handle);
        }

        fn save_as(&self, _handle: &u32, _filename: &str) -> Result<(), ResourceError> {
            Ok(())
        }
    }

    fn png_file(name: &str) -> IntakeFile {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        IntakeFile {
            name: name.into(),
            declared_type: Some("image/png".into()),
            bytes: out.into_inner(),
            source: IntakeSource::Picker,
        }
    }

    fn ok_response() -> Result<StencilResponse, ServiceError> {
        Ok(StencilResponse {
            bytes: vec![0x89, b'P', b'N', b'G'],
            mime: Some("image/png".into()),
        })
    }

    fn controller() -> SubmissionController<CountingStore> {
        SubmissionController::new(ClientConfig::default(), CountingStore::default())
    }

    #[test]
    fn starts_idle_with_everything_disabled() {
        let c = controller();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(
            c.view(),
            ViewState {
                sections_visible: false,
                loading_visible: false,
                generate_enabled: false,
                download_enabled: false,
            }
        );
        assert_eq!(c.threshold(), Threshold::DEFAULT);
    }

    #[test]
    fn sections_reveal_only_on_first_intake() {
        let mut c = controller();
        assert!(c.on_file_intake(png_file("a.png")).unwrap().revealed);
        assert!(!c.on_file_intake(png_file("b.png")).unwrap().revealed);
        assert!(c.view().sections_visible);
        assert_eq!(c.selected_image().unwrap().name(), "b.png");
    }

    #[test]
    fn replacing_the_image_releases_the_old_preview() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();
        c.on_file_intake(png_file("b.png")).unwrap();
        assert_eq!(*c.resources().live.borrow(), vec![2]);
        assert_eq!(c.preview(), Some(&2));
    }

    #[test]
    fn rejected_file_keeps_previous_selection() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();
        let mut bad = png_file("b.txt");
        bad.declared_type = Some("text/plain".into());
        let err = c.on_file_intake(bad).unwrap_err();
        assert!(matches!(err, SubmissionError::Intake(_)));
        assert_eq!(c.selected_image().unwrap().name(), "a.png");
        assert_eq!(c.notice(), Some(&err));
    }

    #[test]
    fn preview_acquire_failure_is_reported() {
        let mut c = SubmissionController::new(
            ClientConfig::default(),
            CountingStore {
                fail_acquire: true,
                ..CountingStore::default()
            },
        );
        let err = c.on_file_intake(png_file("a.png")).unwrap_err();
        assert!(matches!(err, SubmissionError::Resource(_)));
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.view().sections_visible);
    }

    #[test]
    fn generating_shows_loading_and_blocks_a_second_click() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();
        let ticket = c.begin_generate().unwrap();
        assert!(c.view().loading_visible);
        assert!(!c.view().generate_enabled);

        assert_eq!(
            c.begin_generate().unwrap_err(),
            SubmissionError::GenerationInProgress
        );
        assert_eq!(c.phase(), Phase::Generating { token: ticket.token });
    }

    #[test]
    fn success_replaces_and_releases_previous_stencil() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();

        let first = c.begin_generate().unwrap();
        assert_eq!(
            c.finish_generate(first.token, ok_response()),
            GenerationOutcome::Applied(first.token)
        );
        let first_handle = *c.stencil().unwrap().handle();

        let second = c.begin_generate().unwrap();
        c.finish_generate(second.token, ok_response());
        let second_handle = *c.stencil().unwrap().handle();

        assert_ne!(first_handle, second_handle);
        assert_eq!(
            *c.resources().live.borrow(),
            vec![*c.preview().unwrap(), second_handle]
        );
        assert_eq!(c.phase(), Phase::StencilReady);
        assert!(!c.view().loading_visible);
    }

    #[test]
    fn cancelled_request_settles_quietly() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();

        let ticket = c.begin_generate().unwrap();
        assert_eq!(
            c.finish_generate(ticket.token, Err(ServiceError::Cancelled)),
            GenerationOutcome::Cancelled(ticket.token)
        );
        assert_eq!(c.phase(), Phase::ImageSelected);
        assert!(c.notice().is_none());
        assert!(c.view().generate_enabled);

        let first = c.begin_generate().unwrap();
        c.finish_generate(first.token, ok_response());
        let kept = *c.stencil().unwrap().handle();

        let ticket = c.begin_generate().unwrap();
        assert_eq!(
            c.finish_generate(ticket.token, Err(ServiceError::Cancelled)),
            GenerationOutcome::Cancelled(ticket.token)
        );
        assert_eq!(c.phase(), Phase::StencilReady);
        assert!(c.notice().is_none());
        assert_eq!(*c.stencil().unwrap().handle(), kept);
    }

    #[test]
    fn intake_during_generation_makes_the_response_stale() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();
        let ticket = c.begin_generate().unwrap();

        let outcome = c.on_file_intake(png_file("b.png")).unwrap();
        assert_eq!(outcome.superseded, Some(ticket.token));

        assert_eq!(
            c.finish_generate(ticket.token, ok_response()),
            GenerationOutcome::Stale(ticket.token)
        );
        assert!(c.stencil().is_none());
        assert_eq!(c.phase(), Phase::ImageSelected);
        // Only the preview for b.png is live.
        assert_eq!(c.resources().live.borrow().len(), 1);
    }

    #[test]
    fn empty_body_is_a_failure() {
        let mut c = controller();
        c.on_file_intake(png_file("a.png")).unwrap();
        let ticket = c.begin_generate().unwrap();
        let outcome = c.finish_generate(
            ticket.token,
            Ok(StencilResponse {
                bytes: Vec::new(),
                mime: None,
            }),
        );
        assert_eq!(
            outcome,
            GenerationOutcome::Failed(SubmissionError::NetworkOrServerFailure(
                ServiceError::EmptyResponse
            ))
        );
        assert_eq!(c.phase(), Phase::Failed);
        assert!(c.view().generate_enabled);
    }

    #[test]
    fn dropping_the_controller_releases_everything() {
        let live = Rc::new(RefCell::new(Vec::new()));
        let mut c = SubmissionController::new(
            ClientConfig::default(),
            CountingStore {
                live: Rc::clone(&live),
                ..CountingStore::default()
            },
        );
        c.on_file_intake(png_file("a.png")).unwrap();
        let ticket = c.begin_generate().unwrap();
        c.finish_generate(ticket.token, ok_response());
        assert_eq!(live.borrow().len(), 2);

        drop(c);
        assert!(live.borrow().is_empty());
    }
}
