//! File upload component with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use stencil_core::intake::ACCEPT_ATTRIBUTE;
use stencil_core::{IntakeError, IntakeFile, IntakeSource};

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Name of the currently selected image, if any.
    #[props(!optional)]
    selected: Option<String>,
    /// Called with the file contents once they have been read.
    on_file: EventHandler<IntakeFile>,
    /// Called when the browser could not read the file.
    on_read_error: EventHandler<IntakeError>,
}

/// A drop zone with a file picker button.
///
/// Both paths read the first file and hand it to `on_file` unvalidated;
/// format checks happen in the controller so picker and drop behave
/// identically.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);

    // Shared by the picker and the drop zone.
    let process_files = move |files: Vec<FileData>, source: IntakeSource| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        match file.read_bytes().await {
            Ok(bytes) => {
                log::debug!("read {name} from {} ({} bytes)", source.label(), bytes.len());
                props.on_file.call(IntakeFile {
                    name,
                    declared_type: None,
                    bytes: bytes.to_vec(),
                    source,
                });
            }
            Err(e) => {
                log::warn!("failed to read {name}: {e}");
                props.on_read_error.call(IntakeError::Decode {
                    name,
                    detail: e.to_string(),
                });
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files(), IntakeSource::Picker).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files(), IntakeSource::Drop).await;
    };

    let zone_class = drop_zone_class(dragging());

    // The whole zone is the picker's label, so a click anywhere browses.
    rsx! {
        label {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            input {
                r#type: "file",
                accept: ACCEPT_ATTRIBUTE,
                class: "hidden",
                onchange: handle_files,
            }

            if let Some(ref name) = props.selected {
                span { class: "upload-selected", "Selected: {name}" }
            }

            span { class: "upload-hint", "Drop a photo here or click to browse" }
            span { class: "btn btn-primary", "Choose image" }
            span { class: "upload-formats", "PNG, JPEG, BMP, WebP, GIF" }
        }
    }
}

const fn drop_zone_class(dragging: bool) -> &'static str {
    if dragging {
        "drop-zone drop-zone-active"
    } else {
        "drop-zone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(non_snake_case)]
    fn Harness() -> Element {
        rsx! {
            FileUpload {
                selected: Some("flash.png".to_owned()),
                on_file: |_: IntakeFile| {},
                on_read_error: |_: IntakeError| {},
            }
        }
    }

    fn render() -> String {
        let mut dom = VirtualDom::new(Harness);
        dom.rebuild_in_place();
        dioxus::ssr::render(&dom)
    }

    #[test]
    fn whole_zone_opens_the_picker() {
        let html = render();
        assert!(html.starts_with("<label"), "{html}");
        assert!(html.contains("drop-zone"), "{html}");
        assert!(html.contains("type=\"file\""), "{html}");
        assert_eq!(html.matches("<label").count(), 1, "{html}");
        assert!(html.ends_with("</label>"), "{html}");
    }

    #[test]
    fn shows_the_selected_file_name() {
        assert!(render().contains("Selected: flash.png"));
    }

    #[test]
    fn drop_zone_highlights_while_dragging() {
        assert!(drop_zone_class(true).contains("drop-zone-active"));
        assert!(!drop_zone_class(false).contains("drop-zone-active"));
    }
}
