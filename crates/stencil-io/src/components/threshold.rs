//! Threshold slider with a live readout.

use dioxus::prelude::*;
use stencil_core::Threshold;

/// Props for the [`ThresholdSlider`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ThresholdSliderProps {
    /// Current threshold.
    value: Threshold,
    /// Called with the raw slider position on every input event.
    on_change: EventHandler<f64>,
    /// Locks the slider while a request is running.
    #[props(default)]
    disabled: bool,
}

/// Range input over `0..=100`; the readout updates as the thumb moves.
#[component]
pub fn ThresholdSlider(props: ThresholdSliderProps) -> Element {
    let value = props.value.get();
    let (min, max) = (Threshold::MIN, Threshold::MAX);

    rsx! {
        div { class: "threshold",
            div { class: "threshold-header",
                label { r#for: "threshold", "Threshold" }
                span { class: "threshold-value", "{value}" }
            }
            p { class: "threshold-help",
                "Lower values keep more detail; higher values give bolder lines."
            }
            input {
                r#type: "range",
                id: "threshold",
                min: "{min}",
                max: "{max}",
                step: "1",
                value: "{value}",
                disabled: props.disabled,
                oninput: move |e| {
                    match parse_position(&e.value()) {
                        Some(v) => props.on_change.call(v),
                        None => log::warn!("slider parse failure from {:?}", e.value()),
                    }
                },
            }
        }
    }
}

fn parse_position(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_fractional_positions() {
        assert_eq!(parse_position("73"), Some(73.0));
        assert_eq!(parse_position(" 12.5 "), Some(12.5));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert_eq!(parse_position(""), None);
        assert_eq!(parse_position("abc"), None);
        assert_eq!(parse_position("NaN"), None);
        assert_eq!(parse_position("inf"), None);
    }
}
