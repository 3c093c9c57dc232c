//! Per-surface lattice rendering: parameters, themes, projection and the
//! eight lattice families.

pub mod lattice;
pub mod params;
pub mod projection;
pub mod renderer;
pub mod shading;
pub mod theme;
pub mod uniforms;

pub use lattice::{evaluate, evaluate_index, GeometryKind, LatticeStyle};
pub use params::{LatticeParameters, ParameterPatch, PARAMETER_NAMES};
pub use projection::{project_4d, RotationAngles};
pub use renderer::{DrawTarget, GeometryRenderer, LocalInteraction, SurfaceStatus};
pub use shading::shade;
pub use theme::{ThemeCatalog, ThemeTransition};
pub use uniforms::{LatticeUniforms, LATTICE_UNIFORMS_SIZE};
