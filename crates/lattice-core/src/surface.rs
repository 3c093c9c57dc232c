//! The contract every visual surface implements, GPU-backed or not.

use crate::error::RenderSurfaceError;
use crate::geometry::ParameterPatch;

/// Timing for one displayed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    pub time_ms: f64,
    pub dt_ms: f64,
}

impl FrameState {
    pub fn new(time_ms: f64, dt_ms: f64) -> Self {
        Self { time_ms, dt_ms }
    }
}

/// Pointer input forwarded to a single surface. Coordinates are normalized to [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerSignal {
    Move { x: f32, y: f32, intensity: f32 },
    Click { x: f32, y: f32 },
    HoldStart,
    HoldEnd,
}

/// Lifecycle and parameter surface shared by the lattice renderer and any
/// host-supplied fallback (e.g. a 2D canvas painter).
pub trait LayerRenderer {
    fn label(&self) -> &str;

    fn update_parameters(&mut self, patch: &ParameterPatch) -> Result<(), RenderSurfaceError>;

    /// Returns false when the theme id is unknown.
    fn set_theme(&mut self, theme_id: &str) -> bool;

    fn interact(&mut self, signal: PointerSignal);

    fn render(&mut self, frame: &FrameState) -> Result<(), RenderSurfaceError>;

    fn start(&mut self);

    fn stop(&mut self);

    fn destroy(&mut self);

    fn is_active(&self) -> bool;
}
