//! The eight lattice families.
//!
//! Each family maps a projected 3D point and a grid density to a "closeness
//! to structural boundary" scalar in [0, 1]. The WGSL fragment shader carries
//! the same functions; keep both in step.

use crate::easing::smoothstep;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

const TORUS_MAJOR: f32 = 0.3;
const TORUS_MINOR: f32 = 0.1;
const FRACTAL_ITERATIONS: usize = 5;

const TETRA_VERTICES: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    #[default]
    Hypercube,
    Tetrahedron,
    Sphere,
    Torus,
    Klein,
    Fractal,
    Wave,
    Crystal,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 8] = [
        GeometryKind::Hypercube,
        GeometryKind::Tetrahedron,
        GeometryKind::Sphere,
        GeometryKind::Torus,
        GeometryKind::Klein,
        GeometryKind::Fractal,
        GeometryKind::Wave,
        GeometryKind::Crystal,
    ];

    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Any index outside 0..=7 selects the hypercube lattice.
    #[inline]
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Name of the built-in theme that showcases this geometry.
    pub fn theme_name(self) -> &'static str {
        match self {
            GeometryKind::Hypercube => "hypercube",
            GeometryKind::Tetrahedron => "tetrahedron",
            GeometryKind::Sphere => "sphere",
            GeometryKind::Torus => "torus",
            GeometryKind::Klein => "klein",
            GeometryKind::Fractal => "fractal",
            GeometryKind::Wave => "wave",
            GeometryKind::Crystal => "crystal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.theme_name() == name)
    }
}

/// Per-draw style inputs shared by all lattice families.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeStyle {
    pub time: f32,
    pub line_thickness: f32,
    pub shell_width: f32,
    pub tetra_thickness: f32,
}

impl Default for LatticeStyle {
    fn default() -> Self {
        Self {
            time: 0.0,
            line_thickness: 0.03,
            shell_width: 0.05,
            tetra_thickness: 0.06,
        }
    }
}

#[inline]
fn cell(p: Vec3, grid: f32) -> Vec3 {
    let s = p * grid;
    s - s.floor()
}

#[inline]
fn band(distance: f32, width: f32) -> f32 {
    1.0 - smoothstep(0.0, width, distance)
}

pub fn hypercube_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let q = cell(p, grid);
    let faces = q.min(Vec3::ONE - q);
    // an edge is where two faces meet: use the two nearest face distances
    let mut e = faces.to_array();
    e.sort_by(f32::total_cmp);
    let d = Vec2::new(e[0], e[1]).length();
    band(d, style.line_thickness)
}

pub fn tetrahedral_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let q = cell(p, grid);
    let d = TETRA_VERTICES
        .iter()
        .map(|v| q.distance(*v))
        .fold(f32::MAX, f32::min);
    band(d, style.tetra_thickness * 2.0)
}

pub fn spherical_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let r = p.length() * grid;
    let f = r - r.floor();
    band(f.min(1.0 - f), style.shell_width)
}

pub fn toroidal_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let q = cell(p, grid) - Vec3::splat(0.5);
    let ring = Vec2::new(q.x, q.z).length() - TORUS_MAJOR;
    let d = (Vec2::new(ring, q.y).length() - TORUS_MINOR).abs();
    band(d, style.line_thickness)
}

/// Figure-eight immersion of the Klein bottle, sampled as a height field per cell.
pub fn klein_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let q = cell(p, grid);
    let u = q.x * TAU;
    let v = q.y * TAU;
    let h = ((u * 0.5).cos() * v.sin() - (u * 0.5).sin() * (2.0 * v).sin()) * 0.25 + 0.5;
    band((q.z - h).abs(), style.line_thickness * 2.0)
}

pub fn fractal_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let mut q = cell(p, grid * 0.25) * 2.0 - Vec3::ONE;
    let mut acc = 0.0;
    let mut weight = 0.5;
    for _ in 0..FRACTAL_ITERATIONS {
        q = q.abs() * 2.0 - Vec3::ONE;
        let d = (q.length() - 1.0).abs();
        acc += weight * band(d, style.line_thickness * 4.0);
        weight *= 0.5;
    }
    acc.clamp(0.0, 1.0)
}

pub fn wave_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let t = style.time;
    let s = (p.x * grid + t).sin()
        + (p.y * grid * 1.3 + t * 1.7).sin()
        + (p.z * grid * 0.7 - t * 0.9).sin()
        + (p.length() * grid - t * 2.1).sin();
    band((s * 0.25).abs(), style.line_thickness * 4.0)
}

pub fn crystal_lattice(p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let q = cell(p, grid) - Vec3::splat(0.5);
    let cheb = q.abs().max_element();
    let d = (0.5 - cheb).min((cheb - 0.25).abs());
    band(d, style.line_thickness)
}

pub fn evaluate(kind: GeometryKind, p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    let v = match kind {
        GeometryKind::Hypercube => hypercube_lattice(p, grid, style),
        GeometryKind::Tetrahedron => tetrahedral_lattice(p, grid, style),
        GeometryKind::Sphere => spherical_lattice(p, grid, style),
        GeometryKind::Torus => toroidal_lattice(p, grid, style),
        GeometryKind::Klein => klein_lattice(p, grid, style),
        GeometryKind::Fractal => fractal_lattice(p, grid, style),
        GeometryKind::Wave => wave_lattice(p, grid, style),
        GeometryKind::Crystal => crystal_lattice(p, grid, style),
    };
    v.clamp(0.0, 1.0)
}

#[inline]
pub fn evaluate_index(index: i64, p: Vec3, grid: f32, style: &LatticeStyle) -> f32 {
    evaluate(GeometryKind::from_index(index), p, grid, style)
}
