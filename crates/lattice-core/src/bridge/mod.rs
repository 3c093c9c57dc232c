//! Event ingestion and per-frame propagation to variables and renderers.

pub mod animation;
pub mod queue;
pub mod registry;

pub use animation::{AnimationSet, AnimationTarget, Keyframes, VariableAnimation};
pub use queue::{EventBatch, EventQueue};
pub use registry::{FocusState, RendererEntry, RendererId, RendererOptions, RendererRegistry};

use crate::authority::{decay_factor, InstanceRole, ParameterAuthority};
use crate::clock::FrameClock;
use crate::constants::*;
use crate::error::{LatticeError, LatticeResult};
use crate::geometry::ParameterPatch;
use crate::interaction::InteractionEvent;
use crate::sink::{VariableSink, VariableValue};
use crate::surface::{FrameState, LayerRenderer, PointerSignal};
use crate::variables::Variable;
use fnv::FnvHashMap;

const LAYER_FOCUS_VARIABLE: &str = "focus";

/// Pointer coordinates clamped to [0, 1]; non-finite components go to the center.
fn unit_point(x: f32, y: f32) -> [f32; 2] {
    let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
    [unit(x), unit(y)]
}

/// Number of queued events to apply for a frame that took `frame_ms`.
pub fn events_per_frame(frame_ms: f64) -> usize {
    if frame_ms <= FRAME_BUDGET_FAST_MS {
        MAX_EVENTS_PER_FRAME
    } else if frame_ms <= FRAME_BUDGET_SLOW_MS {
        2
    } else {
        MIN_EVENTS_PER_FRAME
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterTarget {
    One(RendererId),
    Broadcast,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BridgeDiagnostics {
    pub frames: u64,
    pub events_processed: u64,
    pub events_dropped: u64,
    pub renderer_failures: u64,
    pub variable_writes: u64,
    pub last_batch: usize,
    pub last_frame_ms: f64,
}

pub struct SynchronizationBridge<S: VariableSink> {
    authority: ParameterAuthority,
    sink: S,
    queue: EventQueue,
    animations: AnimationSet,
    registry: RendererRegistry,
    written: FnvHashMap<Variable, VariableValue>,
    variable_overlays: FnvHashMap<Variable, f32>,
    parameter_overlays: Vec<(ParameterTarget, String, f32)>,
    pointer: [f32; 2],
    focus_point: [f32; 2],
    scroll_velocity: f32,
    hold_ms: Option<f64>,
    diagnostics: BridgeDiagnostics,
}

impl<S: VariableSink> SynchronizationBridge<S> {
    pub fn new(authority: ParameterAuthority, sink: S) -> Self {
        Self::with_queue(authority, sink, EventQueue::default())
    }

    pub fn with_queue(authority: ParameterAuthority, sink: S, queue: EventQueue) -> Self {
        Self {
            authority,
            sink,
            queue,
            animations: AnimationSet::default(),
            registry: RendererRegistry::default(),
            written: FnvHashMap::default(),
            variable_overlays: FnvHashMap::default(),
            parameter_overlays: Vec::new(),
            pointer: [0.5, 0.5],
            focus_point: [0.5, 0.5],
            scroll_velocity: 0.0,
            hold_ms: None,
            diagnostics: BridgeDiagnostics::default(),
        }
    }

    pub fn authority(&self) -> &ParameterAuthority {
        &self.authority
    }

    pub fn authority_mut(&mut self) -> &mut ParameterAuthority {
        &mut self.authority
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn diagnostics(&self) -> BridgeDiagnostics {
        BridgeDiagnostics {
            events_dropped: self.queue.dropped(),
            ..self.diagnostics
        }
    }

    // ---- renderer lifecycle ----

    pub fn register(&mut self, renderer: Box<dyn LayerRenderer>, options: RendererOptions) -> RendererId {
        let label = renderer.label().to_string();
        let role = options.role;
        let id = self.registry.insert(renderer, options);
        log::info!("[bridge] registered {} as #{} ({})", label, id, role.name());
        id
    }

    /// Remove and destroy a renderer. Returns false for unknown ids.
    pub fn unregister(&mut self, id: RendererId) -> bool {
        match self.registry.remove(id) {
            Some(mut entry) => {
                entry.renderer.destroy();
                log::info!("[bridge] unregistered #{}", id);
                true
            }
            None => {
                log::warn!("[bridge] unregister: unknown renderer #{}", id);
                false
            }
        }
    }

    pub fn renderer_ids(&self) -> Vec<RendererId> {
        self.registry.ids()
    }

    pub fn renderer(&self, id: RendererId) -> Option<&RendererEntry> {
        self.registry.get(id)
    }

    pub fn renderers(&self) -> impl Iterator<Item = &RendererEntry> {
        self.registry.iter()
    }

    pub fn focus_state(&self, id: RendererId) -> Option<FocusState> {
        self.registry.get(id).map(|e| e.focus)
    }

    /// Move a layer's focus center, e.g. after the host resized its canvas.
    pub fn set_center(&mut self, id: RendererId, x: f32, y: f32) -> bool {
        match self.registry.get_mut(id) {
            Some(e) => {
                e.center = [x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)];
                true
            }
            None => false,
        }
    }

    pub fn start_all(&mut self) {
        for e in self.registry.iter_mut() {
            e.renderer.start();
        }
    }

    pub fn stop_all(&mut self) {
        for e in self.registry.iter_mut() {
            e.renderer.stop();
        }
    }

    /// Persist `patch` as an override for the target and apply it now.
    pub fn update_parameters(&mut self, target: ParameterTarget, patch: &ParameterPatch) -> LatticeResult<()> {
        let mut failures = 0;
        match target {
            ParameterTarget::One(id) => {
                let entry = self
                    .registry
                    .get_mut(id)
                    .ok_or_else(|| LatticeError::unknown("renderer", id.to_string()))?;
                failures += apply_patch(entry, patch, true);
            }
            ParameterTarget::Broadcast => {
                for entry in self.registry.iter_mut() {
                    failures += apply_patch(entry, patch, true);
                }
            }
        }
        self.diagnostics.renderer_failures += failures;
        Ok(())
    }

    pub fn clear_overrides(&mut self, id: RendererId) {
        if let Some(e) = self.registry.get_mut(id) {
            e.overrides = ParameterPatch::default();
        }
    }

    // ---- ingestion ----

    pub fn queue_event(&mut self, event: InteractionEvent) {
        self.queue.push(event);
    }

    /// Stringly-typed entry point for hosts. Unknown kinds are dropped.
    pub fn handle_event(&mut self, kind: &str, payload: &serde_json::Value) -> bool {
        match InteractionEvent::from_parts(kind, payload) {
            Some(ev) => {
                self.queue_event(ev);
                true
            }
            None => false,
        }
    }

    pub fn begin_hold(&mut self) {
        self.hold_ms = Some(0.0);
        for e in self.registry.iter_mut() {
            e.renderer.interact(PointerSignal::HoldStart);
        }
    }

    pub fn end_hold(&mut self) {
        self.hold_ms = None;
        for e in self.registry.iter_mut() {
            e.renderer.interact(PointerSignal::HoldEnd);
        }
    }

    // ---- variables ----

    /// Animate a named variable. Unknown names are ignored with a warning.
    pub fn animate_variable(&mut self, name: &str, target: AnimationTarget, duration_ms: f64) -> bool {
        match Variable::from_name(name) {
            Some(var) => {
                self.animate(var, target, duration_ms);
                true
            }
            None => {
                log::warn!("[bridge] animate: unknown variable '{}'", name);
                false
            }
        }
    }

    /// Start (or replace) an animation; it begins at the current value.
    pub fn animate(&mut self, var: Variable, target: AnimationTarget, duration_ms: f64) {
        let start = self.current_value(var);
        self.animations.start(var, start, target, duration_ms);
    }

    pub fn is_animating(&self, var: Variable) -> bool {
        self.animations.is_running(var)
    }

    /// Interpolated value if animating, otherwise the last written scalar.
    pub fn current_value(&self, var: Variable) -> f32 {
        self.animations
            .current(var)
            .or_else(|| self.written.get(&var).and_then(VariableValue::as_scalar))
            .unwrap_or(0.0)
    }

    pub fn written(&self, var: Variable) -> Option<&VariableValue> {
        self.written.get(&var)
    }

    pub fn clear_effect_overlays(&mut self) {
        self.variable_overlays.clear();
        self.parameter_overlays.clear();
    }

    /// Additive offset applied to `var` on the next writes.
    pub fn add_variable_overlay(&mut self, var: Variable, delta: f32) {
        *self.variable_overlays.entry(var).or_insert(0.0) += delta;
    }

    /// Additive offset applied to a derived parameter before it is pushed.
    pub fn add_parameter_overlay(&mut self, target: ParameterTarget, name: &str, delta: f32) {
        self.parameter_overlays.push((target, name.to_string(), delta));
    }

    /// Element-scoped value for one layer, unfiltered.
    pub fn write_layer_variable(&mut self, id: RendererId, name: &str, value: f32) {
        if let Some(e) = self.registry.get(id) {
            self.sink
                .set_layer(e.renderer.label(), name, &VariableValue::Scalar(value));
            self.diagnostics.variable_writes += 1;
        }
    }

    // ---- frame loop ----

    /// One frame from a clock: process, then render.
    pub fn frame(&mut self, clock: &mut dyn FrameClock) {
        let dt = clock.delta_ms();
        self.process_frame(dt);
        self.render_all(&FrameState::new(clock.now_ms(), dt));
    }

    /// Apply up to K queued events, tick the mood, advance animations, then
    /// write variables and push derived parameters to every renderer.
    /// Animations that finished this frame are retired after their final
    /// value is written.
    pub fn process_frame(&mut self, frame_ms: f64) {
        let dt = frame_ms.max(0.0);
        let batch = self.queue.pop_batch(events_per_frame(dt));
        self.diagnostics.last_batch = batch.len();
        for ev in batch {
            self.apply_event(ev);
            self.diagnostics.events_processed += 1;
        }

        self.authority.tick(dt);
        self.animations.advance(dt);
        self.scroll_velocity *= decay_factor(self.authority.decay_rates().scroll, dt);
        if self.scroll_velocity.abs() < ENERGY_EPSILON {
            self.scroll_velocity = 0.0;
        }
        if let Some(h) = &mut self.hold_ms {
            *h += dt;
        }

        self.write_variables(false);
        self.push_parameters();
        // final keyframes are written above before the animation is dropped
        self.animations.retire_finished();
        self.diagnostics.frames += 1;
        self.diagnostics.last_frame_ms = dt;
    }

    /// Force-write every variable and push every derived parameter set.
    pub fn sync_all_layers(&mut self) {
        self.write_variables(true);
        self.push_parameters();
        let focus: Vec<(RendererId, FocusState)> = self.registry.iter().map(|e| (e.id, e.focus)).collect();
        for (id, state) in focus {
            self.write_layer_variable(id, LAYER_FOCUS_VARIABLE, state.weight());
        }
    }

    /// Render every active layer, isolating failures. Returns layers drawn.
    pub fn render_all(&mut self, frame: &FrameState) -> usize {
        let mut drawn = 0;
        let mut failures = 0;
        for e in self.registry.iter_mut() {
            if !e.renderer.is_active() {
                continue;
            }
            match e.renderer.render(frame) {
                Ok(()) => drawn += 1,
                Err(err) => {
                    e.failures += 1;
                    failures += 1;
                    log::warn!("[bridge] {} failed to render: {}", e.renderer.label(), err);
                }
            }
        }
        self.diagnostics.renderer_failures += failures;
        drawn
    }

    fn apply_event(&mut self, ev: InteractionEvent) {
        match &ev {
            InteractionEvent::Mouse { x, y, magnitude } => {
                self.authority.update_interaction(&ev);
                let point = unit_point(*x, *y);
                self.pointer = point;
                self.refocus(point);
                let m = if magnitude.is_finite() { magnitude.abs().min(1.0) } else { 0.0 };
                for e in self.registry.iter_mut() {
                    let w = e.focus.weight();
                    if w > 0.0 {
                        e.renderer.interact(PointerSignal::Move {
                            x: point[0],
                            y: point[1],
                            intensity: m * w,
                        });
                    }
                }
                self.animate(Variable::MouseInfluence, AnimationTarget::Scalar(m), MOUSE_INFLUENCE_ANIM_MS);
            }
            InteractionEvent::Click { x, y } => {
                self.authority.update_interaction(&ev);
                let point = unit_point(*x, *y);
                self.pointer = point;
                self.refocus(point);
                for e in self.registry.iter_mut() {
                    if e.focus.weight() > 0.0 {
                        e.renderer.interact(PointerSignal::Click {
                            x: point[0],
                            y: point[1],
                        });
                    }
                }
            }
            InteractionEvent::Scroll { velocity } => {
                self.authority.update_interaction(&ev);
                let v = if velocity.is_finite() {
                    (velocity / SCROLL_VELOCITY_SCALE).clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                self.scroll_velocity = v;
                self.animate(Variable::ChaosIntensity, AnimationTarget::Scalar(v.abs()), CHAOS_ANIM_MS);
            }
            InteractionEvent::Keypress { key } => self.handle_key(key),
            InteractionEvent::Section { id } => {
                self.change_section(id);
            }
        }
    }

    fn handle_key(&mut self, key: &str) {
        if key == "Escape" {
            self.registry.clear_focus();
            self.focus_point = [0.5, 0.5];
            self.write_focus_states();
            return;
        }
        let digit = key
            .chars()
            .next()
            .filter(|_| key.chars().count() == 1)
            .and_then(|c| c.to_digit(10))
            .filter(|d| *d >= 1);
        match digit {
            Some(d) => {
                let target = self.authority.sections().nth(d as usize - 1).map(str::to_string);
                match target {
                    Some(id) => {
                        self.change_section(&id);
                    }
                    None => log::debug!("[bridge] no section for key '{}'", key),
                }
            }
            None => log::debug!("[bridge] key '{}' ignored", key),
        }
    }

    /// Cut to a section and morph every renderer toward its geometry theme.
    fn change_section(&mut self, id: &str) -> bool {
        if !self.authority.transition_to_section(id) {
            return false;
        }
        let theme = self.authority.section_parameters(id).geometry.theme_name();
        for e in self.registry.iter_mut() {
            if e.renderer.set_theme(theme) {
                e.theme_id = Some(theme.to_string());
            }
        }
        self.animate(Variable::PortalIntensity, AnimationTarget::from(&[1.0, 0.0][..]), PORTAL_ANIM_MS);
        true
    }

    fn refocus(&mut self, point: [f32; 2]) {
        self.focus_point = self.registry.update_focus(point).unwrap_or(point);
        self.write_focus_states();
    }

    fn write_focus_states(&mut self) {
        for e in self.registry.iter() {
            self.sink.set_layer(
                e.renderer.label(),
                LAYER_FOCUS_VARIABLE,
                &VariableValue::Scalar(e.focus.weight()),
            );
        }
    }

    fn write_variables(&mut self, force: bool) {
        let mood = self.authority.snapshot();
        let active = mood.active_section_id.clone();
        let content = self.authority.instance_parameters(&active, InstanceRole::Content);
        let accent = self.authority.instance_parameters(&active, InstanceRole::Accent);
        let hue = self.authority.section_parameters(&active).hue;
        let hold = self
            .hold_ms
            .map(|h| (h.min(HOLD_CAP_MS) / HOLD_CAP_MS) as f32)
            .unwrap_or(0.0);

        for var in Variable::ALL {
            let base = match var {
                Variable::GlobalIntensity => mood.intensity,
                Variable::GlobalSpeed => mood.speed,
                Variable::GlobalDensity => mood.density,
                Variable::DimensionalDepth => mood.dimension,
                Variable::Complexity => mood.complexity,
                Variable::Coherence => mood.coherence,
                Variable::ChaosIntensity => mood.scroll_chaos.max((mood.coherence - 1.0).abs()).min(1.0),
                Variable::MouseInfluence => mood.mouse_intensity,
                Variable::MouseX => self.pointer[0],
                Variable::MouseY => self.pointer[1],
                Variable::ClickPulse => mood.click_pulse,
                Variable::ScrollChaos => mood.scroll_chaos,
                Variable::ScrollVelocity => self.scroll_velocity,
                Variable::PortalIntensity => 0.0,
                Variable::TransitionProgress => mood.transition_progress,
                Variable::SectionHue => hue,
                Variable::AccentColor => {
                    let value = VariableValue::vector(&accent.color);
                    self.write(var, value, force);
                    continue;
                }
                Variable::GridDensity => content.grid_density,
                Variable::MorphFactor => content.morph_factor,
                Variable::RotationSpeed => content.rotation_speed,
                Variable::GlitchIntensity => content.glitch_intensity,
                Variable::ColorShift => content.color_shift,
                Variable::FocusX => self.focus_point[0],
                Variable::FocusY => self.focus_point[1],
                Variable::HoldIntensity => hold,
            };
            let animated = self.animations.current(var).unwrap_or(base);
            let value = animated + self.variable_overlays.get(&var).copied().unwrap_or(0.0);
            self.write(var, VariableValue::Scalar(value), force);
        }
    }

    fn write(&mut self, var: Variable, value: VariableValue, force: bool) {
        if !force {
            if let Some(prev) = self.written.get(&var) {
                if prev.close_to(&value, VARIABLE_EPSILON) {
                    return;
                }
            }
        }
        self.sink.set(var.name(), &value);
        self.written.insert(var, value);
        self.diagnostics.variable_writes += 1;
    }

    fn push_parameters(&mut self) {
        let mut failures = 0;
        for e in self.registry.iter_mut() {
            let derived = self.authority.active_instance_parameters(e.role);
            let mut patch = ParameterPatch::full(&derived);
            // geometry only changes through themes or explicit overrides
            patch.geometry = None;
            let mut deltas: FnvHashMap<&str, f32> = FnvHashMap::default();
            for (target, name, delta) in &self.parameter_overlays {
                let applies = match target {
                    ParameterTarget::Broadcast => true,
                    ParameterTarget::One(id) => *id == e.id,
                };
                if applies {
                    *deltas.entry(name.as_str()).or_insert(0.0) += delta;
                }
            }
            for (name, delta) in deltas {
                if let Some(base) = derived.get_named(name) {
                    patch.set_named(name, base + delta);
                }
            }
            patch.overlay(&e.overrides);
            failures += apply_patch(e, &patch, false);
        }
        self.diagnostics.renderer_failures += failures;
    }
}

/// Push a patch to one entry, optionally recording it as an override.
/// Returns the number of failures (0 or 1).
fn apply_patch(entry: &mut RendererEntry, patch: &ParameterPatch, persist: bool) -> u64 {
    if persist {
        entry.overrides.overlay(patch);
    }
    match entry.renderer.update_parameters(patch) {
        Ok(()) => 0,
        Err(err) => {
            entry.failures += 1;
            if entry.failures == 1 {
                log::warn!("[bridge] {} rejected parameters: {}", entry.renderer.label(), err);
            } else {
                log::debug!("[bridge] {} rejected parameters: {}", entry.renderer.label(), err);
            }
            1
        }
    }
}
