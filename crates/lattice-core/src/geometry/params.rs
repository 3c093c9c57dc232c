use crate::constants::*;
use crate::easing::lerp;
use crate::geometry::GeometryKind;
use serde::{Deserialize, Serialize};

/// Full per-surface parameter set consumed by a renderer.
///
/// Values are stored as written; `clamped` is applied when uniforms are built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatticeParameters {
    pub geometry: GeometryKind,
    pub grid_density: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
    pub dimension: f32,
    pub pattern_intensity: f32,
    pub line_thickness: f32,
    pub shell_width: f32,
    pub tetra_thickness: f32,
    pub universe_modifier: f32,
    pub glitch_intensity: f32,
    pub color_shift: f32,
    pub primary_intensity: f32,
    pub secondary_intensity: f32,
    pub detail_intensity: f32,
    pub color: [f32; 3],
}

impl Default for LatticeParameters {
    fn default() -> Self {
        Self {
            geometry: GeometryKind::Hypercube,
            grid_density: 12.0,
            morph_factor: 0.5,
            rotation_speed: 0.5,
            dimension: 3.5,
            pattern_intensity: 0.8,
            line_thickness: 0.03,
            shell_width: 0.05,
            tetra_thickness: 0.06,
            universe_modifier: 1.0,
            glitch_intensity: 0.02,
            color_shift: 0.0,
            primary_intensity: 0.0,
            secondary_intensity: 0.0,
            detail_intensity: 0.0,
            color: [0.0, 1.0, 1.0],
        }
    }
}

/// Names accepted by `get_named` / `ParameterPatch::set_named`, in uniform-contract spelling.
pub const PARAMETER_NAMES: [&str; 14] = [
    "gridDensity",
    "morphFactor",
    "rotationSpeed",
    "dimension",
    "patternIntensity",
    "lineThickness",
    "shellWidth",
    "tetraThickness",
    "universeModifier",
    "glitchIntensity",
    "colorShift",
    "primaryIntensity",
    "secondaryIntensity",
    "detailIntensity",
];

impl LatticeParameters {
    /// Blend toward `to`; the geometry index switches at the halfway point.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut color = [0.0; 3];
        for (i, c) in color.iter_mut().enumerate() {
            *c = lerp(self.color[i], to.color[i], t);
        }
        Self {
            geometry: if t < 0.5 { self.geometry } else { to.geometry },
            grid_density: lerp(self.grid_density, to.grid_density, t),
            morph_factor: lerp(self.morph_factor, to.morph_factor, t),
            rotation_speed: lerp(self.rotation_speed, to.rotation_speed, t),
            dimension: lerp(self.dimension, to.dimension, t),
            pattern_intensity: lerp(self.pattern_intensity, to.pattern_intensity, t),
            line_thickness: lerp(self.line_thickness, to.line_thickness, t),
            shell_width: lerp(self.shell_width, to.shell_width, t),
            tetra_thickness: lerp(self.tetra_thickness, to.tetra_thickness, t),
            universe_modifier: lerp(self.universe_modifier, to.universe_modifier, t),
            glitch_intensity: lerp(self.glitch_intensity, to.glitch_intensity, t),
            color_shift: lerp(self.color_shift, to.color_shift, t),
            primary_intensity: lerp(self.primary_intensity, to.primary_intensity, t),
            secondary_intensity: lerp(self.secondary_intensity, to.secondary_intensity, t),
            detail_intensity: lerp(self.detail_intensity, to.detail_intensity, t),
            color,
        }
    }

    pub fn clamped(&self) -> Self {
        let c = |v: f32, (lo, hi): (f32, f32)| {
            if v.is_finite() {
                v.clamp(lo, hi)
            } else {
                lo
            }
        };
        Self {
            geometry: self.geometry,
            grid_density: c(self.grid_density, GRID_DENSITY_RANGE),
            morph_factor: c(self.morph_factor, MORPH_RANGE),
            rotation_speed: c(self.rotation_speed, ROTATION_SPEED_RANGE),
            dimension: c(self.dimension, DIMENSION_RANGE),
            pattern_intensity: c(self.pattern_intensity, PATTERN_INTENSITY_RANGE),
            line_thickness: c(self.line_thickness, LINE_THICKNESS_RANGE),
            shell_width: c(self.shell_width, SHELL_WIDTH_RANGE),
            tetra_thickness: c(self.tetra_thickness, TETRA_THICKNESS_RANGE),
            universe_modifier: c(self.universe_modifier, UNIVERSE_RANGE),
            glitch_intensity: c(self.glitch_intensity, GLITCH_RANGE),
            color_shift: c(self.color_shift, (0.0, 1.0)),
            primary_intensity: c(self.primary_intensity, (0.0, 1.0)),
            secondary_intensity: c(self.secondary_intensity, (0.0, 1.0)),
            detail_intensity: c(self.detail_intensity, (0.0, 1.0)),
            color: self.color.map(|v| c(v, (0.0, 1.0))),
        }
    }

    pub fn merge(&mut self, patch: &ParameterPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = patch.$field { self.$field = v; })*
            };
        }
        take!(
            geometry,
            grid_density,
            morph_factor,
            rotation_speed,
            dimension,
            pattern_intensity,
            line_thickness,
            shell_width,
            tetra_thickness,
            universe_modifier,
            glitch_intensity,
            color_shift,
            primary_intensity,
            secondary_intensity,
            detail_intensity,
            color
        );
    }

    pub fn get_named(&self, name: &str) -> Option<f32> {
        Some(match name {
            "gridDensity" => self.grid_density,
            "morphFactor" => self.morph_factor,
            "rotationSpeed" => self.rotation_speed,
            "dimension" => self.dimension,
            "patternIntensity" => self.pattern_intensity,
            "lineThickness" => self.line_thickness,
            "shellWidth" => self.shell_width,
            "tetraThickness" => self.tetra_thickness,
            "universeModifier" => self.universe_modifier,
            "glitchIntensity" => self.glitch_intensity,
            "colorShift" => self.color_shift,
            "primaryIntensity" => self.primary_intensity,
            "secondaryIntensity" => self.secondary_intensity,
            "detailIntensity" => self.detail_intensity,
            _ => return None,
        })
    }

    /// Every scalar field as a flat list (geometry index first, then the named
    /// fields, then color). Used to compare parameter sets field by field.
    pub fn numeric_fields(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(PARAMETER_NAMES.len() + 4);
        out.push(self.geometry.index() as f32);
        out.extend(PARAMETER_NAMES.iter().filter_map(|n| self.get_named(n)));
        out.extend_from_slice(&self.color);
        out
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterPatch {
    pub geometry: Option<GeometryKind>,
    pub grid_density: Option<f32>,
    pub morph_factor: Option<f32>,
    pub rotation_speed: Option<f32>,
    pub dimension: Option<f32>,
    pub pattern_intensity: Option<f32>,
    pub line_thickness: Option<f32>,
    pub shell_width: Option<f32>,
    pub tetra_thickness: Option<f32>,
    pub universe_modifier: Option<f32>,
    pub glitch_intensity: Option<f32>,
    pub color_shift: Option<f32>,
    pub primary_intensity: Option<f32>,
    pub secondary_intensity: Option<f32>,
    pub detail_intensity: Option<f32>,
    pub color: Option<[f32; 3]>,
}

impl ParameterPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns false when `name` is not a known parameter.
    pub fn set_named(&mut self, name: &str, value: f32) -> bool {
        let slot = match name {
            "gridDensity" => &mut self.grid_density,
            "morphFactor" => &mut self.morph_factor,
            "rotationSpeed" => &mut self.rotation_speed,
            "dimension" => &mut self.dimension,
            "patternIntensity" => &mut self.pattern_intensity,
            "lineThickness" => &mut self.line_thickness,
            "shellWidth" => &mut self.shell_width,
            "tetraThickness" => &mut self.tetra_thickness,
            "universeModifier" => &mut self.universe_modifier,
            "glitchIntensity" => &mut self.glitch_intensity,
            "colorShift" => &mut self.color_shift,
            "primaryIntensity" => &mut self.primary_intensity,
            "secondaryIntensity" => &mut self.secondary_intensity,
            "detailIntensity" => &mut self.detail_intensity,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Layer `other` on top: its `Some` fields win.
    pub fn overlay(&mut self, other: &ParameterPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            geometry,
            grid_density,
            morph_factor,
            rotation_speed,
            dimension,
            pattern_intensity,
            line_thickness,
            shell_width,
            tetra_thickness,
            universe_modifier,
            glitch_intensity,
            color_shift,
            primary_intensity,
            secondary_intensity,
            detail_intensity,
            color
        );
    }

    pub fn with_geometry(mut self, geometry: GeometryKind) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// A patch that overwrites every field of the target.
    pub fn full(params: &LatticeParameters) -> Self {
        Self {
            geometry: Some(params.geometry),
            grid_density: Some(params.grid_density),
            morph_factor: Some(params.morph_factor),
            rotation_speed: Some(params.rotation_speed),
            dimension: Some(params.dimension),
            pattern_intensity: Some(params.pattern_intensity),
            line_thickness: Some(params.line_thickness),
            shell_width: Some(params.shell_width),
            tetra_thickness: Some(params.tetra_thickness),
            universe_modifier: Some(params.universe_modifier),
            glitch_intensity: Some(params.glitch_intensity),
            color_shift: Some(params.color_shift),
            primary_intensity: Some(params.primary_intensity),
            secondary_intensity: Some(params.secondary_intensity),
            detail_intensity: Some(params.detail_intensity),
            color: Some(params.color),
        }
    }
}
