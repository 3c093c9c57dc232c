//! CPU reference of the `lattice.wgsl` fragment stage.
//!
//! Used by tests and by hosts that want to sample a pixel without a GPU
//! round-trip. Any change here must be mirrored in the shader.

use super::lattice::{evaluate_index, LatticeStyle};
use super::projection::{lift_to_4d, place_on_screen, project_4d, RotationAngles};
use super::uniforms::LatticeUniforms;
use crate::constants::CHROMATIC_OFFSET_SCALE;
use glam::{Vec2, Vec3};

const SCREEN_SPIN: f32 = 0.1; // fraction of the 4D angle applied as 2D spin
const MOUSE_PAN: f32 = 0.2;

/// Lattice closeness at a normalized fragment coordinate (`uv` in [0, 1]²).
pub fn lattice_value(uv: Vec2, u: &LatticeUniforms) -> f32 {
    let aspect = u.resolution[0] / u.resolution[1].max(1.0);
    let centered = (uv - Vec2::splat(0.5)) * Vec2::new(aspect, 1.0);
    let pan = (Vec2::from(u.mouse) - Vec2::splat(0.5)) * MOUSE_PAN;
    let placed = place_on_screen(centered, u.rotation_angle * SCREEN_SPIN, pan);
    let p4 = lift_to_4d(
        placed * u.universe_modifier,
        u.time,
        u.dimension,
        u.morph_factor,
    );
    let p3 = project_4d(p4, RotationAngles::from_angle(u.rotation_angle));
    let style = LatticeStyle {
        time: u.time,
        line_thickness: u.line_thickness,
        shell_width: u.shell_width,
        tetra_thickness: u.tetra_thickness,
    };
    evaluate_index(i64::from(u.geometry), p3, u.grid_density, &style)
}

/// Offset between the three chromatic samples, in uv units.
#[inline]
pub fn chromatic_offset(u: &LatticeUniforms) -> f32 {
    (u.glitch_intensity + 0.02 * u.secondary_intensity) * CHROMATIC_OFFSET_SCALE
}

/// Premultiplied-free RGBA for one fragment.
pub fn shade(uv: Vec2, u: &LatticeUniforms) -> [f32; 4] {
    let offset = Vec2::new(chromatic_offset(u), 0.0);
    let r = lattice_value(uv + offset, u);
    let g = lattice_value(uv, u);
    let b = lattice_value(uv - offset, u);

    let base = Vec3::new(u.base_color[0], u.base_color[1], u.base_color[2]);
    let tint = base.lerp(Vec3::ONE - base, u.color_shift);
    let glow = 1.0 + 0.5 * u.primary_intensity + 0.3 * u.detail_intensity;
    let rgb = (tint * Vec3::new(r, g, b) * u.pattern_intensity * glow).clamp(Vec3::ZERO, Vec3::ONE);
    let alpha = (r.max(g).max(b) * u.pattern_intensity).clamp(0.0, 1.0);
    [rgb.x, rgb.y, rgb.z, alpha]
}
