//! Named parameter presets and the eased transition between them.

use super::lattice::GeometryKind;
use super::params::LatticeParameters;
use crate::constants::THEME_TRANSITION_MS;
use crate::easing::ease_in_out_cubic;
use fnv::FnvHashMap;

#[derive(Clone, Debug, Default)]
pub struct ThemeCatalog {
    themes: FnvHashMap<String, LatticeParameters>,
}

fn theme(
    geometry: GeometryKind,
    grid_density: f32,
    morph_factor: f32,
    rotation_speed: f32,
    dimension: f32,
    color: [f32; 3],
) -> LatticeParameters {
    LatticeParameters {
        geometry,
        grid_density,
        morph_factor,
        rotation_speed,
        dimension,
        color,
        ..LatticeParameters::default()
    }
}

impl ThemeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One theme per geometry family, keyed by `GeometryKind::theme_name`.
    pub fn builtin() -> Self {
        let mut themes = FnvHashMap::default();
        let entries = [
            theme(GeometryKind::Hypercube, 12.0, 0.5, 0.5, 3.5, [0.0, 1.0, 1.0]),
            theme(GeometryKind::Tetrahedron, 10.0, 0.7, 0.6, 3.6, [1.0, 0.0, 1.0]),
            theme(GeometryKind::Sphere, 8.0, 0.4, 0.3, 3.3, [1.0, 1.0, 0.0]),
            theme(GeometryKind::Torus, 14.0, 0.8, 0.7, 3.7, [0.0, 1.0, 0.0]),
            theme(GeometryKind::Klein, 9.0, 1.0, 0.4, 3.9, [1.0, 0.5, 0.0]),
            theme(GeometryKind::Fractal, 16.0, 1.2, 0.8, 4.0, [0.5, 0.0, 1.0]),
            theme(GeometryKind::Wave, 6.0, 0.6, 1.0, 3.4, [0.0, 0.5, 1.0]),
            theme(GeometryKind::Crystal, 20.0, 0.3, 0.2, 3.2, [1.0, 1.0, 1.0]),
        ];
        for params in entries {
            themes.insert(params.geometry.theme_name().to_string(), params);
        }
        Self { themes }
    }

    pub fn insert(&mut self, id: impl Into<String>, params: LatticeParameters) {
        self.themes.insert(id.into(), params);
    }

    pub fn get(&self, id: &str) -> Option<&LatticeParameters> {
        self.themes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.themes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Eased interpolation from one full parameter set to another.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeTransition {
    pub from: LatticeParameters,
    pub to: LatticeParameters,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
}

impl ThemeTransition {
    pub fn new(from: LatticeParameters, to: LatticeParameters) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms: THEME_TRANSITION_MS,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Advance by `dt_ms` and return the interpolated parameters.
    pub fn advance(&mut self, dt_ms: f64) -> LatticeParameters {
        self.elapsed_ms += dt_ms.max(0.0);
        self.sample()
    }

    pub fn sample(&self) -> LatticeParameters {
        self.from.lerp(&self.to, ease_in_out_cubic(self.progress()))
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
}
