use super::params::LatticeParameters;

/// Uniform block shared with `lattice.wgsl`. Field order and padding match the
/// WGSL `Uniforms` struct exactly (112 bytes, 16-byte aligned).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LatticeUniforms {
    pub resolution: [f32; 2],
    pub mouse: [f32; 2],
    pub time: f32,
    pub dimension: f32,
    pub grid_density: f32,
    pub line_thickness: f32,
    pub universe_modifier: f32,
    pub pattern_intensity: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
    pub shell_width: f32,
    pub tetra_thickness: f32,
    pub glitch_intensity: f32,
    pub color_shift: f32,
    pub primary_intensity: f32,
    pub secondary_intensity: f32,
    pub detail_intensity: f32,
    pub geometry: u32,
    pub rotation_angle: f32,
    pub _pad: [f32; 3],
    pub base_color: [f32; 4],
}

pub const LATTICE_UNIFORMS_SIZE: usize = std::mem::size_of::<LatticeUniforms>();

impl LatticeUniforms {
    /// Copy the (already clamped) parameter set into the block. Per-frame
    /// fields (time, mouse, rotation angle, boosted density/dimension) are
    /// filled in by the renderer afterwards.
    pub fn from_parameters(p: &LatticeParameters, resolution: [f32; 2]) -> Self {
        Self {
            resolution,
            mouse: [0.5, 0.5],
            time: 0.0,
            dimension: p.dimension,
            grid_density: p.grid_density,
            line_thickness: p.line_thickness,
            universe_modifier: p.universe_modifier,
            pattern_intensity: p.pattern_intensity,
            morph_factor: p.morph_factor,
            rotation_speed: p.rotation_speed,
            shell_width: p.shell_width,
            tetra_thickness: p.tetra_thickness,
            glitch_intensity: p.glitch_intensity,
            color_shift: p.color_shift,
            primary_intensity: p.primary_intensity,
            secondary_intensity: p.secondary_intensity,
            detail_intensity: p.detail_intensity,
            geometry: p.geometry.index(),
            rotation_angle: 0.0,
            _pad: [0.0; 3],
            base_color: [p.color[0], p.color[1], p.color[2], 1.0],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
