//! Scalar interpolation helpers shared by variable animations and theme transitions.

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out: fast start, soft landing.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Cubic ease-in-out, symmetric around t = 0.5.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Hermite smoothstep as used by the shaders. A degenerate edge pair acts as a step.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Progress through a sequence of keyframes, `t` in [0, 1].
///
/// The sequence is split into equal-length segments and each segment is
/// interpolated linearly. An empty slice yields `None`.
pub fn keyframe_value(frames: &[f32], t: f32) -> Option<f32> {
    match frames.len() {
        0 => None,
        1 => Some(frames[0]),
        n => {
            let t = t.clamp(0.0, 1.0);
            let segments = (n - 1) as f32;
            let pos = t * segments;
            let i = (pos.floor() as usize).min(n - 2);
            let local = pos - i as f32;
            Some(lerp(frames[i], frames[i + 1], local))
        }
    }
}
