//! Interaction events accepted by the bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractionEvent {
    /// Pointer position in normalized [0, 1] coordinates and motion magnitude.
    Mouse { x: f32, y: f32, magnitude: f32 },
    Click { x: f32, y: f32 },
    /// Scroll velocity in pixels per frame, signed.
    Scroll { velocity: f32 },
    Keypress { key: String },
    Section { id: String },
}

impl InteractionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionEvent::Mouse { .. } => "mouse",
            InteractionEvent::Click { .. } => "click",
            InteractionEvent::Scroll { .. } => "scroll",
            InteractionEvent::Keypress { .. } => "keypress",
            InteractionEvent::Section { .. } => "section",
        }
    }

    /// Build an event from a stringly-typed kind and a JSON payload.
    ///
    /// Unknown kinds are logged and yield `None`; missing numeric fields
    /// default to 0 and missing strings to empty.
    pub fn from_parts(kind: &str, payload: &Value) -> Option<Self> {
        let num = |key: &str| payload.get(key).and_then(Value::as_f64).unwrap_or(0.0) as f32;
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let event = match kind {
            "mouse" => {
                let magnitude = payload
                    .get("magnitude")
                    .or_else(|| payload.get("intensity"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0) as f32;
                InteractionEvent::Mouse {
                    x: num("x"),
                    y: num("y"),
                    magnitude,
                }
            }
            "click" => InteractionEvent::Click {
                x: num("x"),
                y: num("y"),
            },
            "scroll" => InteractionEvent::Scroll {
                velocity: num("velocity"),
            },
            "keypress" => InteractionEvent::Keypress { key: text("key") },
            "section" => {
                let id = payload
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| text("id"));
                InteractionEvent::Section { id }
            }
            other => {
                log::warn!("[bridge] ignoring unknown event type '{}'", other);
                return None;
            }
        };
        Some(event)
    }
}
