//! Global mood state and the section → role parameter cascade.

pub mod catalog;
pub mod mood;

pub use catalog::{
    ColorTransform, InstanceRole, RoleCatalog, RoleModifier, SectionCatalog, SectionModifier,
    DEFAULT_SECTION,
};
pub use mood::{decay_energy, decay_factor, DecayRates, GlobalMoodState, InteractionLedger};

use crate::constants::*;
use crate::geometry::{GeometryKind, LatticeParameters};
use crate::interaction::InteractionEvent;

#[inline]
fn clamp_range(v: f32, (lo, hi): (f32, f32)) -> f32 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        lo
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Global mood with one section's modifiers applied.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionParameters {
    pub section_id: String,
    pub intensity: f32,
    pub speed: f32,
    pub density: f32,
    pub density_mod: f32,
    pub complexity: f32,
    pub dimension: f32,
    pub coherence: f32,
    pub geometry: GeometryKind,
    pub base_color: [f32; 3],
    pub hue: f32,
}

/// Sole owner and writer of the global mood.
#[derive(Clone, Debug)]
pub struct ParameterAuthority {
    mood: GlobalMoodState,
    sections: SectionCatalog,
    roles: RoleCatalog,
    decay: DecayRates,
    ledger: InteractionLedger,
}

impl Default for ParameterAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterAuthority {
    pub fn new() -> Self {
        Self::with_catalogs(
            SectionCatalog::builtin(),
            RoleCatalog::builtin(),
            DecayRates::default(),
        )
    }

    pub fn with_catalogs(sections: SectionCatalog, roles: RoleCatalog, decay: DecayRates) -> Self {
        let mood = GlobalMoodState {
            active_section_id: sections.default_id().to_string(),
            ..GlobalMoodState::default()
        };
        let decay = if decay.is_valid() {
            decay
        } else {
            log::warn!("[authority] decay rates {:?} outside (0, 1), using defaults", decay);
            DecayRates::default()
        };
        Self {
            mood,
            sections,
            roles,
            decay,
            ledger: InteractionLedger::default(),
        }
    }

    /// Immutable copy of the mood; callers never hold the live state.
    pub fn snapshot(&self) -> GlobalMoodState {
        self.mood.clone()
    }

    pub fn active_section(&self) -> &str {
        &self.mood.active_section_id
    }

    pub fn sections(&self) -> &SectionCatalog {
        &self.sections
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    pub fn section_ids(&self) -> Vec<&str> {
        self.sections.ids().collect()
    }

    pub fn decay_rates(&self) -> DecayRates {
        self.decay
    }

    pub fn set_decay_rates(&mut self, decay: DecayRates) {
        if decay.is_valid() {
            self.decay = decay;
        } else {
            log::warn!("[authority] rejected decay rates {:?}", decay);
        }
    }

    pub fn ledger(&self) -> &InteractionLedger {
        &self.ledger
    }

    /// Count a triggered effect under `category` (the effect level name).
    pub fn note_effect(&mut self, category: &str) {
        *self.ledger.effects.entry(category.to_string()).or_insert(0) += 1;
    }

    /// Section stage of the cascade. Unknown ids fall back to the default section.
    pub fn section_parameters(&self, id: &str) -> SectionParameters {
        let (resolved, s) = self.sections.resolve(id);
        let g = &self.mood;
        SectionParameters {
            section_id: resolved.to_string(),
            intensity: clamp_range(g.intensity * s.intensity_mod, INTENSITY_RANGE),
            speed: clamp_range(g.speed * s.speed_mod, SPEED_RANGE),
            density: clamp_range(g.density * s.density_mod, GRID_DENSITY_RANGE),
            density_mod: s.density_mod,
            complexity: clamp_range(g.complexity * s.complexity_mod, INTENSITY_RANGE),
            dimension: clamp_range(g.dimension, DIMENSION_RANGE),
            coherence: clamp_range(g.coherence, COHERENCE_RANGE),
            geometry: s.geometry,
            base_color: s.base_color,
            hue: s.hue(),
        }
    }

    /// Role stage of the cascade: every derived field clamped to its range.
    pub fn instance_parameters(&self, id: &str, role: InstanceRole) -> LatticeParameters {
        let sp = self.section_parameters(id);
        self.derive(&sp, role)
    }

    pub fn active_instance_parameters(&self, role: InstanceRole) -> LatticeParameters {
        let sp = self.section_parameters(&self.mood.active_section_id);
        self.derive(&sp, role)
    }

    fn derive(&self, sp: &SectionParameters, role: InstanceRole) -> LatticeParameters {
        let g = &self.mood;
        let r = self.roles.get(role);
        let sens = r.interaction_sensitivity;
        let chaos = g.scroll_chaos * sens;

        let params = LatticeParameters {
            geometry: sp.geometry,
            grid_density: r.grid_scale * sp.density_mod * g.density,
            morph_factor: r.morph_scale * sp.complexity * (1.0 + g.scroll_chaos),
            rotation_speed: r.rotation_scale * sp.speed * ROTATION_SPEED_GAIN,
            dimension: g.dimension + r.dimension_boost + MOUSE_DIMENSION_GAIN * g.mouse_intensity * sens,
            pattern_intensity: (0.3 + sp.intensity) * sp.coherence,
            line_thickness: 0.02 + 0.02 * sp.complexity,
            shell_width: 0.03 + 0.04 * sp.complexity,
            tetra_thickness: 0.04 + 0.04 * sp.complexity,
            universe_modifier: 0.8 + 0.4 * sp.intensity,
            glitch_intensity: 0.02 + 0.1 * chaos + 0.05 * (sp.coherence - 1.0).abs(),
            color_shift: 0.5 * (1.0 - g.transition_progress) + 0.3 * g.click_pulse * sens,
            primary_intensity: g.mouse_intensity * sens,
            secondary_intensity: chaos,
            detail_intensity: g.click_pulse * sens,
            color: r.color_transform.apply(sp.base_color),
        };
        params.clamped()
    }

    pub fn update_interaction(&mut self, event: &InteractionEvent) {
        match event {
            InteractionEvent::Mouse { magnitude, .. } => {
                self.ledger.mouse += 1;
                self.mood.mouse_intensity = finite_or_zero(*magnitude).abs().min(1.0);
            }
            InteractionEvent::Click { .. } => {
                self.ledger.click += 1;
                self.mood.click_pulse = (self.mood.click_pulse + CLICK_PULSE_STEP).min(1.0);
            }
            InteractionEvent::Scroll { velocity } => {
                self.ledger.scroll += 1;
                let magnitude = (finite_or_zero(*velocity).abs() / SCROLL_VELOCITY_SCALE).min(1.0);
                self.mood.scroll_chaos = magnitude;
                self.mood.intensity = clamp_range(
                    self.mood.intensity + SCROLL_INTENSITY_GAIN * magnitude,
                    INTENSITY_RANGE,
                );
            }
            InteractionEvent::Section { id } => {
                self.transition_to_section(id);
            }
            InteractionEvent::Keypress { key } => {
                log::debug!("[authority] keypress '{}' has no mood effect", key);
            }
        }
    }

    /// Begin a cut to `id`. Returns true only on a genuine change.
    pub fn transition_to_section(&mut self, id: &str) -> bool {
        if id == self.mood.active_section_id {
            return false;
        }
        if !self.sections.contains(id) {
            log::warn!("[authority] transition to unknown section '{}' ignored", id);
            return false;
        }
        log::info!(
            "[authority] section {} -> {}",
            self.mood.active_section_id,
            id
        );
        self.mood.active_section_id = id.to_string();
        self.mood.transition_progress = 0.0;
        self.mood.coherence = COHERENCE_OVERSHOOT;
        self.ledger.section_changes += 1;
        true
    }

    /// Advance the mood by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64) {
        let dt = dt_ms.max(0.0);
        let m = &mut self.mood;
        m.mouse_intensity = decay_energy(m.mouse_intensity, self.decay.mouse, dt);
        m.click_pulse = decay_energy(m.click_pulse, self.decay.click, dt);
        m.scroll_chaos = decay_energy(m.scroll_chaos, self.decay.scroll, dt);

        if m.transition_progress < 1.0 {
            m.transition_progress =
                (m.transition_progress + (dt / TRANSITION_DURATION_MS) as f32).min(1.0);
        }

        let dc = (m.coherence - 1.0) * decay_factor(COHERENCE_RELAX, dt);
        m.coherence = if dc.abs() < ENERGY_EPSILON { 1.0 } else { 1.0 + dc };

        if m.interaction_energy() == 0.0 {
            let di = (m.intensity - INTENSITY_FLOOR) * decay_factor(INTENSITY_RELAX, dt);
            m.intensity = if di.abs() < ENERGY_EPSILON {
                INTENSITY_FLOOR
            } else {
                INTENSITY_FLOOR + di
            };
        }
    }
}
