//! Hierarchical, timed effect presets applied through the bridge.

pub mod preset;
pub mod profile;

pub use preset::{
    builtin_presets, parse_document, parse_preset, to_document, EffectLevel, EffectPreset,
    EffectScope, EffectValue, PatternKind, PeriodicPattern, ScopeEffects,
};
pub use profile::{MemoryPresetStore, PresetProfile, PresetStore, PROFILE_STORAGE_KEY};

use crate::bridge::{FocusState, ParameterTarget, RendererId, SynchronizationBridge};
use crate::error::LatticeResult;
use crate::sink::VariableSink;
use crate::variables::Variable;
use anyhow::Context;
use std::collections::BTreeMap;

/// Which layers an effect addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectTarget {
    /// Resolve element scopes through the current focus states.
    #[default]
    Auto,
    /// Pin element and visualizer scopes to one layer.
    Layer(RendererId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerOptions {
    /// Extra gain on top of the level multiplier.
    pub intensity: f32,
    pub duration_ms: Option<f64>,
    /// Run the preset at a different nesting level.
    pub level: Option<EffectLevel>,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            duration_ms: None,
            level: None,
        }
    }
}

/// One scope/property timeline of a triggered preset.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    pub preset: String,
    pub level: EffectLevel,
    pub scope: EffectScope,
    pub property: String,
    pub value: EffectValue,
    pub gain: f32,
    pub target: EffectTarget,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    touched: Vec<RendererId>,
}

impl ActiveEffect {
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
        }
    }

    /// Damped value at the current time.
    pub fn current_value(&self) -> f32 {
        self.value
            .sample(self.progress(), (self.elapsed_ms / 1000.0) as f32)
            * self.gain
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

pub struct EffectsOrchestrator {
    presets: BTreeMap<String, EffectPreset>,
    active: Vec<ActiveEffect>,
    profile: PresetProfile,
}

impl Default for EffectsOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectsOrchestrator {
    pub fn new() -> Self {
        let mut o = Self::empty();
        for p in builtin_presets() {
            o.presets.insert(p.name.clone(), p);
        }
        o
    }

    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
            active: Vec::new(),
            profile: PresetProfile::default(),
        }
    }

    pub fn preset(&self, name: &str) -> Option<&EffectPreset> {
        self.presets.get(name)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn insert_preset(&mut self, preset: EffectPreset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn active(&self) -> &[ActiveEffect] {
        &self.active
    }

    pub fn profile(&self) -> &PresetProfile {
        &self.profile
    }

    /// Start a preset. Missing presets are a logged no-op. Re-triggering a
    /// running preset replaces its timelines.
    pub fn trigger_effect<S: VariableSink>(
        &mut self,
        bridge: &mut SynchronizationBridge<S>,
        name: &str,
        target: EffectTarget,
        options: TriggerOptions,
    ) -> bool {
        let Some(preset) = self.presets.get(name) else {
            log::warn!("[effects] unknown preset '{}'", name);
            return false;
        };
        let level = options.level.unwrap_or(preset.level);
        let intensity = if options.intensity.is_finite() {
            options.intensity.max(0.0)
        } else {
            1.0
        };
        let gain = level.multiplier() * intensity;
        let duration_ms = options
            .duration_ms
            .unwrap_or_else(|| preset.effective_duration_ms())
            .max(0.0);

        let mut records = Vec::new();
        for (scope, props) in &preset.effects {
            for (property, value) in props {
                records.push(ActiveEffect {
                    preset: name.to_string(),
                    level,
                    scope: *scope,
                    property: property.clone(),
                    value: value.clone(),
                    gain,
                    target,
                    elapsed_ms: 0.0,
                    duration_ms,
                    touched: Vec::new(),
                });
            }
        }

        self.cancel_records(bridge, name);
        self.active.extend(records);
        self.profile.record(level, name);
        bridge.authority_mut().note_effect(level.name());
        log::debug!("[effects] triggered {} at {} (gain {:.2})", name, level.name(), gain);
        true
    }

    /// Stop a running preset and reset any element transforms it wrote.
    pub fn cancel_effect<S: VariableSink>(&mut self, bridge: &mut SynchronizationBridge<S>, name: &str) -> bool {
        let before = self.active.len();
        self.cancel_records(bridge, name);
        before != self.active.len()
    }

    fn cancel_records<S: VariableSink>(&mut self, bridge: &mut SynchronizationBridge<S>, name: &str) {
        let (cancelled, kept): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|r| r.preset == name);
        self.active = kept;
        for r in &cancelled {
            reset_element(bridge, r);
        }
    }

    /// Advance every timeline by `dt_ms` and write this frame's overlays.
    /// Call once per frame before `SynchronizationBridge::process_frame`.
    pub fn tick<S: VariableSink>(&mut self, bridge: &mut SynchronizationBridge<S>, dt_ms: f64) {
        bridge.clear_effect_overlays();
        let dt = dt_ms.max(0.0);
        for r in &mut self.active {
            r.elapsed_ms += dt;
        }

        let (done, running): (Vec<_>, Vec<_>) = self.active.drain(..).partition(ActiveEffect::is_done);
        self.active = running;
        for r in &done {
            reset_element(bridge, r);
        }

        let layers: Vec<(RendererId, FocusState)> = bridge.renderers().map(|e| (e.id, e.focus)).collect();
        for r in &mut self.active {
            let v = r.current_value();
            match r.scope {
                EffectScope::System => {
                    if let Some(var) = Variable::from_name(&r.property) {
                        bridge.add_variable_overlay(var, v);
                    }
                }
                EffectScope::Visualizer => {
                    let target = match r.target {
                        EffectTarget::Auto => ParameterTarget::Broadcast,
                        EffectTarget::Layer(id) => ParameterTarget::One(id),
                    };
                    bridge.add_parameter_overlay(target, &r.property, v);
                }
                scope => {
                    for id in resolve_layers(scope, r.target, &layers) {
                        bridge.write_layer_variable(id, &r.property, v);
                        if !r.touched.contains(&id) {
                            r.touched.push(id);
                        }
                    }
                }
            }
        }
    }

    // ---- catalog import/export ----

    /// Validate and add presets from a JSON document. Nothing is added when
    /// any entry is invalid. Returns the number imported.
    pub fn import_presets(&mut self, json: &str) -> LatticeResult<usize> {
        let presets = parse_document(json)?;
        let n = presets.len();
        for p in presets {
            if self.presets.contains_key(&p.name) {
                log::info!("[effects] preset '{}' replaced by import", p.name);
            }
            self.presets.insert(p.name.clone(), p);
        }
        Ok(n)
    }

    pub fn export_presets(&self) -> LatticeResult<String> {
        to_document(self.presets.values())
    }

    // ---- profile ----

    pub fn export_profile(&self) -> LatticeResult<String> {
        self.profile.to_json()
    }

    pub fn import_profile(&mut self, json: &str) -> LatticeResult<()> {
        let profile = PresetProfile::from_json(json)?;
        for (level, name) in &profile.active {
            if !self.presets.contains_key(name) {
                log::warn!("[effects] profile names unknown preset '{}' for {}", name, level.name());
            }
        }
        self.profile = profile;
        Ok(())
    }

    pub fn save_profile(&self, store: &mut dyn PresetStore) -> anyhow::Result<()> {
        let json = self.export_profile()?;
        store
            .save(PROFILE_STORAGE_KEY, &json)
            .context("saving preset profile")
    }

    /// Returns false when the store holds no profile.
    pub fn load_profile(&mut self, store: &dyn PresetStore) -> anyhow::Result<bool> {
        match store.load(PROFILE_STORAGE_KEY).context("loading preset profile")? {
            Some(json) => {
                self.import_profile(&json)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn resolve_layers(
    scope: EffectScope,
    target: EffectTarget,
    layers: &[(RendererId, FocusState)],
) -> Vec<RendererId> {
    if let EffectTarget::Layer(id) = target {
        return layers.iter().filter(|(l, _)| *l == id).map(|(l, _)| *l).collect();
    }
    layers
        .iter()
        .filter(|(_, focus)| match scope {
            EffectScope::Focused => *focus == FocusState::Focused,
            EffectScope::Unfocused => *focus != FocusState::Focused,
            _ => true,
        })
        .map(|(id, _)| *id)
        .collect()
}

/// Element transforms are deltas; writing 0 restores the neutral state.
fn reset_element<S: VariableSink>(bridge: &mut SynchronizationBridge<S>, record: &ActiveEffect) {
    if !record.scope.is_element() {
        return;
    }
    for id in &record.touched {
        bridge.write_layer_variable(*id, &record.property, 0.0);
    }
}
