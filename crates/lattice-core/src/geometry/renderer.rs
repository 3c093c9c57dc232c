use super::params::{LatticeParameters, ParameterPatch};
use super::theme::{ThemeCatalog, ThemeTransition};
use super::uniforms::LatticeUniforms;
use crate::constants::*;
use crate::error::RenderSurfaceError;
use crate::surface::{FrameState, LayerRenderer, PointerSignal};

/// Where a renderer's pixels go. The wgpu-backed targets live in the hosts;
/// tests use recording targets.
pub trait DrawTarget {
    fn resolution(&self) -> [f32; 2];

    fn draw(&mut self, uniforms: &LatticeUniforms) -> Result<(), RenderSurfaceError>;

    fn release(&mut self) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceStatus {
    Active,
    Stopped,
    Failed(RenderSurfaceError),
}

/// Per-surface pointer state, independent of the global mood.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalInteraction {
    pub intensity: f32,
    pub mouse: [f32; 2],
    pub holding: bool,
    pub hold_ms: f64,
}

impl Default for LocalInteraction {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            mouse: [0.5, 0.5],
            holding: false,
            hold_ms: 0.0,
        }
    }
}

impl LocalInteraction {
    /// 0 at hold start, 1 once the hold reaches the cap.
    pub fn hold_fraction(&self) -> f32 {
        if !self.holding {
            return 0.0;
        }
        (self.hold_ms.min(HOLD_CAP_MS) / HOLD_CAP_MS) as f32
    }
}

/// One visual surface: a parameter set, an optional theme transition, local
/// interaction state and a draw target.
pub struct GeometryRenderer<T: DrawTarget> {
    label: String,
    target: T,
    themes: ThemeCatalog,
    theme_id: String,
    params: LatticeParameters,
    transition: Option<ThemeTransition>,
    local: LocalInteraction,
    status: SurfaceStatus,
    elapsed_ms: f64,
    frames: u64,
    destroyed: bool,
}

impl<T: DrawTarget> GeometryRenderer<T> {
    pub fn new(label: impl Into<String>, target: T, theme_id: &str) -> Self {
        let label = label.into();
        let themes = ThemeCatalog::builtin();
        let params = match themes.get(theme_id) {
            Some(p) => p.clone(),
            None => {
                log::warn!("[renderer] {}: unknown theme '{}', using defaults", label, theme_id);
                LatticeParameters::default()
            }
        };
        Self {
            label,
            target,
            themes,
            theme_id: theme_id.to_string(),
            params,
            transition: None,
            local: LocalInteraction::default(),
            status: SurfaceStatus::Stopped,
            elapsed_ms: 0.0,
            frames: 0,
            destroyed: false,
        }
    }

    pub fn register_theme(&mut self, id: impl Into<String>, params: LatticeParameters) {
        self.themes.insert(id, params);
    }

    /// Begin an eased transition toward the named theme. Unknown ids are ignored.
    pub fn set_theme(&mut self, id: &str) -> bool {
        let Some(target) = self.themes.get(id).cloned() else {
            log::warn!("[renderer] {}: unknown theme '{}'", self.label, id);
            return false;
        };
        let from = match &self.transition {
            Some(t) => t.sample(),
            None => self.params.clone(),
        };
        self.theme_id = id.to_string();
        self.transition = Some(ThemeTransition::new(from, target));
        true
    }

    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Merge a partial update, last write wins per field. While a theme
    /// transition runs the patch also lands in its target.
    pub fn update_parameters(&mut self, patch: &ParameterPatch) {
        self.params.merge(patch);
        if let Some(t) = &mut self.transition {
            t.to.merge(patch);
        }
    }

    pub fn parameters(&self) -> &LatticeParameters {
        &self.params
    }

    /// Step any running theme transition without drawing.
    pub fn advance(&mut self, dt_ms: f64) {
        let Some(t) = &mut self.transition else {
            return;
        };
        self.params = t.advance(dt_ms);
        if t.is_complete() {
            self.params = t.to.clone();
            self.transition = None;
        }
    }

    pub fn interact(&mut self, signal: PointerSignal) {
        match signal {
            PointerSignal::Move { x, y, intensity } => {
                self.local.mouse = [x, y];
                self.local.intensity = self.local.intensity.max(intensity.clamp(0.0, 1.0));
            }
            PointerSignal::Click { x, y } => {
                self.local.mouse = [x, y];
                self.local.intensity = 1.0;
            }
            PointerSignal::HoldStart => {
                self.local.holding = true;
                self.local.hold_ms = 0.0;
            }
            PointerSignal::HoldEnd => {
                self.local.holding = false;
                self.local.hold_ms = 0.0;
            }
        }
    }

    pub fn local_interaction(&self) -> &LocalInteraction {
        &self.local
    }

    /// Uniforms for the current state: clamped parameters plus the local
    /// interaction boosts.
    pub fn frame_uniforms(&self) -> LatticeUniforms {
        let p = self.params.clamped();
        let i = self.local.intensity;
        let elapsed_s = (self.elapsed_ms / 1000.0) as f32;

        let mut u = LatticeUniforms::from_parameters(&p, self.target.resolution());
        u.time = elapsed_s;
        u.mouse = self.local.mouse;
        u.grid_density = (p.grid_density * (1.0 + GRID_INTERACTION_BOOST * i))
            .clamp(GRID_DENSITY_RANGE.0, GRID_DENSITY_RANGE.1);
        u.dimension = (p.dimension + HOLD_DIMENSION_BOOST * self.local.hold_fraction())
            .min(DIMENSION_DRAW_MAX);
        u.rotation_angle = elapsed_s * p.rotation_speed * (1.0 + i);
        u
    }

    /// Draw one frame. Stopped surfaces skip the draw; a failed surface reports
    /// its error on the frame it failed and stays silent afterwards.
    pub fn render(&mut self, frame: &FrameState) -> Result<(), RenderSurfaceError> {
        if self.status != SurfaceStatus::Active {
            return Ok(());
        }
        let dt = frame.dt_ms.max(0.0);
        self.elapsed_ms += dt;
        self.advance(dt);
        if self.local.holding {
            self.local.hold_ms += dt;
        }

        let uniforms = self.frame_uniforms();
        if let Err(e) = self.target.draw(&uniforms) {
            self.fail(e.clone());
            return Err(e);
        }
        self.frames += 1;
        self.local.intensity *= LOCAL_INTERACTION_DECAY;
        if self.local.intensity < ENERGY_EPSILON {
            self.local.intensity = 0.0;
        }
        Ok(())
    }

    /// Disable this surface permanently.
    pub fn fail(&mut self, err: RenderSurfaceError) {
        log::error!("[renderer] {}: {}; rendering disabled", self.label, err);
        self.status = SurfaceStatus::Failed(err);
    }

    pub fn start(&mut self) {
        if self.destroyed {
            log::warn!("[renderer] {}: start after destroy ignored", self.label);
            return;
        }
        if self.status == SurfaceStatus::Stopped {
            self.status = SurfaceStatus::Active;
        }
    }

    pub fn stop(&mut self) {
        if self.status == SurfaceStatus::Active {
            self.status = SurfaceStatus::Stopped;
        }
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.target.release();
        self.transition = None;
        self.destroyed = true;
        log::debug!("[renderer] {}: destroyed after {} frames", self.label, self.frames);
    }

    pub fn status(&self) -> &SurfaceStatus {
        &self.status
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: DrawTarget> LayerRenderer for GeometryRenderer<T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn update_parameters(&mut self, patch: &ParameterPatch) -> Result<(), RenderSurfaceError> {
        GeometryRenderer::update_parameters(self, patch);
        Ok(())
    }

    fn set_theme(&mut self, theme_id: &str) -> bool {
        GeometryRenderer::set_theme(self, theme_id)
    }

    fn interact(&mut self, signal: PointerSignal) {
        GeometryRenderer::interact(self, signal)
    }

    fn render(&mut self, frame: &FrameState) -> Result<(), RenderSurfaceError> {
        GeometryRenderer::render(self, frame)
    }

    fn start(&mut self) {
        GeometryRenderer::start(self)
    }

    fn stop(&mut self) {
        GeometryRenderer::stop(self)
    }

    fn destroy(&mut self) {
        GeometryRenderer::destroy(self)
    }

    fn is_active(&self) -> bool {
        self.status == SurfaceStatus::Active
    }
}
