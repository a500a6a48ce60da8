use std::rc::Rc;

use dioxus::prelude::*;
use stencil_core::{
    ControllerCell, GenerationOutcome, IntakeError, IntakeFile, SubmissionController,
    SubmissionError, generate, intake,
};
use stencil_io::page;
use stencil_io::{
    ActionBar, BlobStore, FetchStencilService, FileUpload, ImagePanes, NoticeBanner, Session,
    ThresholdSlider,
};

/// Element the page scrolls to when the results first appear.
const RESULTS_ID: &str = "results";

fn main() {
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("logger already initialised: {e}").into());
    }
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the submission controller in a signal and wires the upload,
/// threshold, preview and action components to it.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let config = use_hook(page::load_config);
    let service = use_hook(|| Rc::new(FetchStencilService::new(&config)));
    let session: Session =
        use_signal(|| SubmissionController::new(config.clone(), BlobStore::default()));

    // --- File intake handler ---
    // Picker and drop both land here. A refused file leaves its notice
    // on the controller, so the error only needs logging.
    let on_file = {
        let service = Rc::clone(&service);
        move |file: IntakeFile| match intake(&session, &*service, file) {
            Ok(outcome) => {
                if outcome.revealed {
                    spawn(async {
                        // Let the sections render before scrolling to them.
                        gloo_timers::future::TimeoutFuture::new(0).await;
                        page::scroll_into_view(RESULTS_ID);
                    });
                }
            }
            Err(e) => log::debug!("intake refused: {e}"),
        }
    };

    let on_read_error = move |e: IntakeError| {
        session.update(|c| c.report(e.into()));
    };

    // --- Threshold handler ---
    let on_threshold = move |value: f64| {
        session.update(|c| c.set_threshold_from_slider(value));
    };

    // --- Generate handler ---
    // The controller refuses a second start while one is running, so a
    // double click spawns a task that ends immediately.
    let on_generate = {
        let service = Rc::clone(&service);
        move |()| {
            let service = Rc::clone(&service);
            spawn(async move {
                match generate(&session, &*service).await {
                    Ok(GenerationOutcome::Applied(token)) => {
                        log::debug!("generation {token} applied");
                    }
                    Ok(GenerationOutcome::Stale(token)) => {
                        log::debug!("generation {token} discarded as stale");
                    }
                    Ok(GenerationOutcome::Cancelled(token)) => {
                        log::debug!("generation {token} cancelled");
                    }
                    Ok(GenerationOutcome::Failed(e)) => log::debug!("generation failed: {e}"),
                    Err(e) => log::debug!("generation refused: {e}"),
                }
            });
        }
    };

    // --- Download handler ---
    let on_download = move |()| {
        if let Err(e) = session.update(SubmissionController::on_download) {
            log::debug!("download refused: {e}");
        }
    };

    let on_dismiss = move |()| {
        session.update(SubmissionController::dismiss_notice);
    };

    // --- Snapshot for rendering ---
    let (view, threshold, original, stencil, selected, notice) = {
        let controller = session.read();
        (
            controller.view(),
            controller.threshold(),
            controller.preview().map(|url| url.as_str().to_owned()),
            controller.stencil().map(|s| s.handle().as_str().to_owned()),
            controller
                .selected_image()
                .map(|image| format!("{} ({})", image.name(), image.dimensions())),
            controller.notice().map(SubmissionError::user_message),
        )
    };

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "app",
            header { class: "app-header",
                h1 { "Stencil" }
                p { class: "muted", "Turn a photo into a printable tattoo stencil" }
            }

            if let Some(message) = notice {
                NoticeBanner { message, on_dismiss }
            }

            main { class: "app-main",
                section { class: "card",
                    FileUpload { selected, on_file, on_read_error }
                }

                if view.sections_visible {
                    section { class: "card",
                        ThresholdSlider {
                            value: threshold,
                            on_change: on_threshold,
                            disabled: view.loading_visible,
                        }
                        ActionBar { view, on_generate, on_download }
                    }

                    section { class: "card", id: RESULTS_ID,
                        ImagePanes {
                            original,
                            stencil,
                            loading: view.loading_visible,
                        }
                    }
                }
            }
        }
    }
}
