use crate::authority::InstanceRole;
use crate::constants::FOCUS_ADJACENT_DISTANCE;
use crate::geometry::{GeometryKind, ParameterPatch};
use crate::surface::LayerRenderer;
use serde::{Deserialize, Serialize};

pub type RendererId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    Focused,
    Adjacent,
    #[default]
    Distant,
}

impl FocusState {
    /// Share of a pointer interaction a layer receives.
    pub fn weight(self) -> f32 {
        match self {
            FocusState::Focused => 1.0,
            FocusState::Adjacent => 0.5,
            FocusState::Distant => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RendererOptions {
    pub role: InstanceRole,
    pub initial_geometry: Option<GeometryKind>,
    pub theme_id: Option<String>,
    /// Layer center in normalized screen coordinates.
    pub center: [f32; 2],
}

impl RendererOptions {
    pub fn new(role: InstanceRole) -> Self {
        Self {
            role,
            initial_geometry: None,
            theme_id: None,
            center: [0.5, 0.5],
        }
    }

    pub fn with_center(mut self, x: f32, y: f32) -> Self {
        self.center = [x, y];
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryKind) -> Self {
        self.initial_geometry = Some(geometry);
        self
    }

    pub fn with_theme(mut self, theme_id: impl Into<String>) -> Self {
        self.theme_id = Some(theme_id.into());
        self
    }
}

pub struct RendererEntry {
    pub id: RendererId,
    pub renderer: Box<dyn LayerRenderer>,
    pub role: InstanceRole,
    pub center: [f32; 2],
    pub focus: FocusState,
    pub theme_id: Option<String>,
    /// Explicit per-layer parameters layered over the derived set every frame.
    pub overrides: ParameterPatch,
    pub failures: u64,
}

/// Registered layers in registration order.
#[derive(Default)]
pub struct RendererRegistry {
    entries: Vec<RendererEntry>,
    next_id: RendererId,
}

impl RendererRegistry {
    pub fn insert(&mut self, mut renderer: Box<dyn LayerRenderer>, options: RendererOptions) -> RendererId {
        self.next_id += 1;
        let id = self.next_id;
        if let Some(geometry) = options.initial_geometry {
            let patch = ParameterPatch::default().with_geometry(geometry);
            if let Err(e) = renderer.update_parameters(&patch) {
                log::warn!("[bridge] {}: initial geometry rejected: {}", renderer.label(), e);
            }
        }
        self.entries.push(RendererEntry {
            id,
            renderer,
            role: options.role,
            center: options.center,
            focus: FocusState::Distant,
            theme_id: options.theme_id,
            overrides: ParameterPatch::default(),
            failures: 0,
        });
        id
    }

    pub fn remove(&mut self, id: RendererId) -> Option<RendererEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: RendererId) -> Option<&RendererEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: RendererId) -> Option<&mut RendererEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RendererEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RendererEntry> {
        self.entries.iter_mut()
    }

    pub fn ids(&self) -> Vec<RendererId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute focus for a pointer at `point`. Returns the focused layer's
    /// center, or `None` when nothing is registered.
    pub fn update_focus(&mut self, point: [f32; 2]) -> Option<[f32; 2]> {
        let dist = |c: [f32; 2]| ((c[0] - point[0]).powi(2) + (c[1] - point[1]).powi(2)).sqrt();
        let nearest = self
            .entries
            .iter()
            .min_by(|a, b| dist(a.center).total_cmp(&dist(b.center)))
            .map(|e| e.id)?;
        let mut focused_center = None;
        for e in &mut self.entries {
            e.focus = if e.id == nearest {
                focused_center = Some(e.center);
                FocusState::Focused
            } else if dist(e.center) <= FOCUS_ADJACENT_DISTANCE {
                FocusState::Adjacent
            } else {
                FocusState::Distant
            };
        }
        focused_center
    }

    pub fn clear_focus(&mut self) {
        for e in &mut self.entries {
            e.focus = FocusState::Distant;
        }
    }
}
