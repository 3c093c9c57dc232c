//! Effect preset catalog entries and their JSON document format.

use crate::constants::{DEFAULT_EFFECT_MS, DEFAULT_PERIODIC_EFFECT_MS};
use crate::easing::keyframe_value;
use crate::error::{LatticeError, LatticeResult};
use crate::geometry::PARAMETER_NAMES;
use crate::variables::Variable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Nesting level of an effect; deeper levels are damped harder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EffectLevel {
    System,
    Face,
    Card,
    Element,
}

impl EffectLevel {
    pub const ALL: [EffectLevel; 4] = [
        EffectLevel::System,
        EffectLevel::Face,
        EffectLevel::Card,
        EffectLevel::Element,
    ];

    pub fn multiplier(self) -> f32 {
        match self {
            EffectLevel::System => 1.0,
            EffectLevel::Face => 0.8,
            EffectLevel::Card => 0.6,
            EffectLevel::Element => 0.4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectLevel::System => "SYSTEM",
            EffectLevel::Face => "FACE",
            EffectLevel::Card => "CARD",
            EffectLevel::Element => "ELEMENT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectScope {
    /// Deltas on declarative variables.
    System,
    /// Element transforms on the focused layer.
    Focused,
    /// Element transforms on every other layer.
    Unfocused,
    All,
    /// Deltas on derived renderer parameters.
    Visualizer,
}

impl EffectScope {
    pub const ALL: [EffectScope; 5] = [
        EffectScope::System,
        EffectScope::Focused,
        EffectScope::Unfocused,
        EffectScope::All,
        EffectScope::Visualizer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectScope::System => "system",
            EffectScope::Focused => "focused",
            EffectScope::Unfocused => "unfocused",
            EffectScope::All => "all",
            EffectScope::Visualizer => "visualizer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn is_element(self) -> bool {
        matches!(self, EffectScope::Focused | EffectScope::Unfocused | EffectScope::All)
    }

    /// Whether `property` is addressable in this scope.
    pub fn accepts(self, property: &str) -> bool {
        match self {
            EffectScope::System => Variable::from_name(property).is_some(),
            EffectScope::Visualizer => PARAMETER_NAMES.contains(&property),
            _ => !property.is_empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Sine,
    Triangle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodicPattern {
    #[serde(default)]
    pub pattern: PatternKind,
    pub amplitude: f32,
    /// Cycles per second.
    pub frequency: f32,
    #[serde(default)]
    pub phase: f32,
}

impl PeriodicPattern {
    pub fn sample(&self, elapsed_s: f32) -> f32 {
        let x = TAU * self.frequency * elapsed_s + self.phase;
        let wave = match self.pattern {
            PatternKind::Sine => x.sin(),
            PatternKind::Triangle => {
                let u = (x / TAU).rem_euclid(1.0);
                1.0 - 4.0 * (u - 0.5).abs()
            }
        };
        self.amplitude * wave
    }
}

/// One property timeline: a constant, keyframes spread over the effect's
/// duration, or a periodic pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    Immediate(f32),
    Keyframes(Vec<f32>),
    Pattern(PeriodicPattern),
}

impl EffectValue {
    /// Value at `progress` in [0, 1], `elapsed_s` seconds after the trigger.
    pub fn sample(&self, progress: f32, elapsed_s: f32) -> f32 {
        match self {
            EffectValue::Immediate(v) => *v,
            EffectValue::Keyframes(frames) => keyframe_value(frames, progress).unwrap_or(0.0),
            EffectValue::Pattern(p) => p.sample(elapsed_s),
        }
    }

    /// Largest magnitude the timeline can reach.
    pub fn peak(&self) -> f32 {
        match self {
            EffectValue::Immediate(v) => v.abs(),
            EffectValue::Keyframes(frames) => frames.iter().fold(0.0, |m, v| m.max(v.abs())),
            EffectValue::Pattern(p) => p.amplitude.abs(),
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, EffectValue::Pattern(_))
    }
}

pub type ScopeEffects = BTreeMap<String, EffectValue>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectPreset {
    #[serde(skip)]
    pub name: String,
    pub level: EffectLevel,
    #[serde(default)]
    pub description: String,
    pub effects: BTreeMap<EffectScope, ScopeEffects>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl EffectPreset {
    pub fn new(name: impl Into<String>, level: EffectLevel, description: &str) -> Self {
        Self {
            name: name.into(),
            level,
            description: description.to_string(),
            effects: BTreeMap::new(),
            duration_ms: None,
        }
    }

    pub fn with(mut self, scope: EffectScope, property: &str, value: EffectValue) -> Self {
        self.effects
            .entry(scope)
            .or_default()
            .insert(property.to_string(), value);
        self
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Explicit duration, else the periodic default if any timeline is
    /// periodic, else the one-shot default.
    pub fn effective_duration_ms(&self) -> f64 {
        if let Some(d) = self.duration_ms {
            return d;
        }
        let periodic = self
            .effects
            .values()
            .flat_map(|props| props.values())
            .any(EffectValue::is_periodic);
        if periodic {
            DEFAULT_PERIODIC_EFFECT_MS
        } else {
            DEFAULT_EFFECT_MS
        }
    }

    /// Peak magnitude across every timeline, before level damping.
    pub fn peak(&self) -> f32 {
        self.effects
            .values()
            .flat_map(|props| props.values())
            .fold(0.0, |m, v| m.max(v.peak()))
    }
}

fn reject(msg: String) -> LatticeError {
    LatticeError::PresetImport(msg)
}

/// Validate one preset body from an import document.
pub fn parse_preset(name: &str, body: &Value) -> LatticeResult<EffectPreset> {
    if name.trim().is_empty() {
        return Err(reject("preset with empty name".into()));
    }
    let obj = body
        .as_object()
        .ok_or_else(|| reject(format!("{name}: preset must be an object")))?;
    if let Some(inner) = obj.get("name").and_then(Value::as_str) {
        if inner != name {
            return Err(reject(format!("{name}: name field '{inner}' does not match key")));
        }
    }
    let level = obj
        .get("level")
        .and_then(Value::as_str)
        .and_then(EffectLevel::from_name)
        .ok_or_else(|| reject(format!("{name}: missing or invalid level")))?;
    let effects = obj
        .get("effects")
        .and_then(Value::as_object)
        .ok_or_else(|| reject(format!("{name}: missing effects object")))?;

    let mut preset = EffectPreset::new(name, level, "");
    preset.description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    preset.duration_ms = match obj.get("durationMs") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(d) if d >= 0.0 => Some(d),
            _ => return Err(reject(format!("{name}: durationMs must be a non-negative number"))),
        },
    };

    for (scope_name, props) in effects {
        let scope = EffectScope::from_name(scope_name)
            .ok_or_else(|| reject(format!("{name}: unknown scope '{scope_name}'")))?;
        let props = props
            .as_object()
            .ok_or_else(|| reject(format!("{name}.{scope_name}: expected an object")))?;
        for (property, raw) in props {
            if !scope.accepts(property) {
                return Err(reject(format!(
                    "{name}.{scope_name}: unknown property '{property}'"
                )));
            }
            let value: EffectValue = serde_json::from_value(raw.clone()).map_err(|e| {
                reject(format!("{name}.{scope_name}.{property}: {e}"))
            })?;
            if let EffectValue::Keyframes(frames) = &value {
                if frames.is_empty() {
                    return Err(reject(format!(
                        "{name}.{scope_name}.{property}: empty keyframes"
                    )));
                }
            }
            preset = preset.with(scope, property, value);
        }
    }
    Ok(preset)
}

/// Validate a whole document (`name → preset`). All-or-nothing.
pub fn parse_document(json: &str) -> LatticeResult<Vec<EffectPreset>> {
    let doc: Value = serde_json::from_str(json)?;
    let map: &Map<String, Value> = doc
        .as_object()
        .ok_or_else(|| reject("document must map preset names to presets".into()))?;
    map.iter().map(|(name, body)| parse_preset(name, body)).collect()
}

/// Serialize presets into the import document format.
pub fn to_document<'a>(presets: impl Iterator<Item = &'a EffectPreset>) -> LatticeResult<String> {
    let mut map = Map::new();
    for p in presets {
        map.insert(p.name.clone(), serde_json::to_value(p)?);
    }
    Ok(serde_json::to_string_pretty(&Value::Object(map))?)
}

/// The built-in preset catalog.
pub fn builtin_presets() -> Vec<EffectPreset> {
    use EffectScope::*;
    use EffectValue::*;
    let pattern = |amplitude, frequency| {
        Pattern(PeriodicPattern {
            pattern: PatternKind::Sine,
            amplitude,
            frequency,
            phase: 0.0,
        })
    };
    vec![
        EffectPreset::new("portal-burst", EffectLevel::System, "Portal flash with a morph swell")
            .with(System, "portal-intensity", Keyframes(vec![0.0, 1.0, 0.0]))
            .with(System, "chaos-intensity", Immediate(0.3))
            .with(Visualizer, "morphFactor", Keyframes(vec![0.0, 0.6, 0.0]))
            .with_duration(900.0),
        EffectPreset::new("breathe", EffectLevel::System, "Slow intensity swell")
            .with(System, "global-intensity", pattern(0.1, 0.5))
            .with_duration(4000.0),
        EffectPreset::new("glitch-storm", EffectLevel::System, "Short chromatic burst")
            .with(Visualizer, "glitchIntensity", Keyframes(vec![0.0, 0.15, 0.05, 0.0]))
            .with(System, "glitch-intensity", Keyframes(vec![0.0, 0.15, 0.0])),
        EffectPreset::new("focus-glow", EffectLevel::Face, "Lift the focused layer")
            .with(Focused, "glow", Keyframes(vec![0.0, 1.0, 0.6, 0.0]))
            .with(Unfocused, "dim", Immediate(0.3)),
        EffectPreset::new("ripple", EffectLevel::Face, "Grid density ripple")
            .with(Visualizer, "gridDensity", pattern(4.0, 2.0))
            .with(All, "wave", pattern(0.5, 2.0)),
        EffectPreset::new("card-lift", EffectLevel::Card, "Raise and tilt one card")
            .with(Focused, "lift", Keyframes(vec![0.0, 1.0, 0.0]))
            .with(Focused, "tilt", Keyframes(vec![0.0, 0.5, 0.0])),
        EffectPreset::new("element-ping", EffectLevel::Element, "Small scale tap")
            .with(Focused, "scale", Keyframes(vec![0.0, 0.2, 0.0]))
            .with_duration(300.0),
        EffectPreset::new("calm", EffectLevel::Element, "Ease rotation down")
            .with(Visualizer, "rotationSpeed", Immediate(-0.2))
            .with_duration(1500.0),
    ]
}
