use crate::authority::catalog::DEFAULT_SECTION;
use crate::constants::*;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// The global mood. Interaction fields decay toward 0 between events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMoodState {
    pub intensity: f32,
    pub speed: f32,
    pub density: f32,
    pub dimension: f32,
    pub complexity: f32,
    pub coherence: f32,
    pub mouse_intensity: f32,
    pub click_pulse: f32,
    pub scroll_chaos: f32,
    pub active_section_id: String,
    pub transition_progress: f32,
}

impl Default for GlobalMoodState {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            speed: 1.0,
            density: 12.0,
            dimension: 3.5,
            complexity: 0.5,
            coherence: 1.0,
            mouse_intensity: 0.0,
            click_pulse: 0.0,
            scroll_chaos: 0.0,
            active_section_id: DEFAULT_SECTION.to_string(),
            transition_progress: 1.0,
        }
    }
}

impl GlobalMoodState {
    /// Sum of the three decaying interaction fields.
    pub fn interaction_energy(&self) -> f32 {
        self.mouse_intensity + self.click_pulse + self.scroll_chaos
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_progress < 1.0
    }
}

/// Per-reference-frame multipliers for the interaction fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecayRates {
    pub mouse: f32,
    pub click: f32,
    pub scroll: f32,
}

impl Default for DecayRates {
    fn default() -> Self {
        Self {
            mouse: MOUSE_DECAY,
            click: CLICK_DECAY,
            scroll: SCROLL_DECAY,
        }
    }
}

impl DecayRates {
    /// Rates outside (0, 1) would stop or reverse decay; reject them.
    pub fn is_valid(&self) -> bool {
        [self.mouse, self.click, self.scroll]
            .iter()
            .all(|r| *r > 0.0 && *r < 1.0)
    }
}

/// Multiplier for `dt_ms` of decay at `rate` per reference frame.
#[inline]
pub fn decay_factor(rate: f32, dt_ms: f64) -> f32 {
    rate.powf((dt_ms.max(0.0) / REFERENCE_FRAME_MS) as f32)
}

/// Decay one energy field, snapping tiny residues to 0.
#[inline]
pub fn decay_energy(value: f32, rate: f32, dt_ms: f64) -> f32 {
    let v = value * decay_factor(rate, dt_ms);
    if v < ENERGY_EPSILON {
        0.0
    } else {
        v
    }
}

/// Running interaction counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLedger {
    pub mouse: u64,
    pub click: u64,
    pub scroll: u64,
    pub section_changes: u64,
    pub effects: FnvHashMap<String, u64>,
}

impl InteractionLedger {
    pub fn effects_for(&self, category: &str) -> u64 {
        self.effects.get(category).copied().unwrap_or(0)
    }

    pub fn total_effects(&self) -> u64 {
        self.effects.values().sum()
    }
}
