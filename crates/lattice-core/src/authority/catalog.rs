//! Static section and role catalogs.

use crate::constants::{BRIGHTEN_FACTOR, DARKEN_FACTOR};
use crate::error::{LatticeError, LatticeResult};
use crate::geometry::GeometryKind;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SECTION: &str = "home";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionModifier {
    pub intensity_mod: f32,
    pub speed_mod: f32,
    pub density_mod: f32,
    pub complexity_mod: f32,
    #[serde(alias = "geometryId")]
    pub geometry: GeometryKind,
    pub base_color: [f32; 3],
    #[serde(default)]
    pub display_name: String,
}

impl SectionModifier {
    /// Hue in degrees of the base color, 0 for greys.
    pub fn hue(&self) -> f32 {
        let [r, g, b] = self.base_color;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        if d <= f32::EPSILON {
            return 0.0;
        }
        let h = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h * 60.0
    }
}

fn section(
    name: &str,
    intensity_mod: f32,
    speed_mod: f32,
    density_mod: f32,
    complexity_mod: f32,
    geometry: GeometryKind,
    base_color: [f32; 3],
) -> SectionModifier {
    SectionModifier {
        intensity_mod,
        speed_mod,
        density_mod,
        complexity_mod,
        geometry,
        base_color,
        display_name: name.to_string(),
    }
}

/// Ordered section table. Order matters: keypress digits index into it.
#[derive(Clone, Debug)]
pub struct SectionCatalog {
    order: Vec<String>,
    sections: FnvHashMap<String, SectionModifier>,
    default_id: String,
    fallback: SectionModifier,
}

impl SectionCatalog {
    pub fn builtin() -> Self {
        Self::build(Self::builtin_entries(), DEFAULT_SECTION.to_string())
    }

    /// The built-in sections in catalog order.
    pub fn builtin_entries() -> Vec<(String, SectionModifier)> {
        vec![
            ("home".to_string(), section("Home", 1.0, 1.0, 1.0, 1.0, GeometryKind::Hypercube, [0.0, 1.0, 1.0])),
            ("about".to_string(), section("About", 0.8, 0.8, 0.9, 0.8, GeometryKind::Tetrahedron, [1.0, 0.0, 1.0])),
            ("projects".to_string(), section("Projects", 1.1, 1.2, 1.1, 1.2, GeometryKind::Sphere, [1.0, 1.0, 0.0])),
            ("research".to_string(), section("Research", 0.9, 0.7, 1.3, 1.4, GeometryKind::Torus, [0.0, 1.0, 0.0])),
            ("gallery".to_string(), section("Gallery", 1.2, 1.1, 0.8, 1.1, GeometryKind::Klein, [1.0, 0.5, 0.0])),
            ("blog".to_string(), section("Blog", 0.7, 0.9, 1.0, 0.9, GeometryKind::Fractal, [0.5, 0.0, 1.0])),
            ("contact".to_string(), section("Contact", 0.6, 0.6, 0.7, 0.6, GeometryKind::Wave, [0.0, 0.5, 1.0])),
            ("lab".to_string(), section("Lab", 1.3, 1.5, 1.5, 1.5, GeometryKind::Crystal, [1.0, 0.2, 0.4])),
        ]
    }

    /// Replace the whole table. The default id must name one of the entries.
    pub fn from_entries(
        entries: Vec<(String, SectionModifier)>,
        default_id: &str,
    ) -> LatticeResult<Self> {
        if entries.is_empty() {
            return Err(LatticeError::Configuration("section catalog is empty".into()));
        }
        if !entries.iter().any(|(id, _)| id == default_id) {
            return Err(LatticeError::Configuration(format!(
                "default section '{default_id}' is not in the catalog"
            )));
        }
        Ok(Self::build(entries, default_id.to_string()))
    }

    fn build(entries: Vec<(String, SectionModifier)>, default_id: String) -> Self {
        let mut order = Vec::with_capacity(entries.len());
        let mut sections = FnvHashMap::default();
        for (id, modifier) in entries {
            if sections.insert(id.clone(), modifier).is_none() {
                order.push(id);
            }
        }
        let fallback = sections
            .get(&default_id)
            .cloned()
            .unwrap_or_else(|| section("Home", 1.0, 1.0, 1.0, 1.0, GeometryKind::Hypercube, [0.0, 1.0, 1.0]));
        Self {
            order,
            sections,
            default_id,
            fallback,
        }
    }

    pub fn get(&self, id: &str) -> Option<&SectionModifier> {
        self.sections.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Look up `id`, falling back to the default section with a warning.
    pub fn resolve<'a>(&'a self, id: &'a str) -> (&'a str, &'a SectionModifier) {
        if let Some(m) = self.sections.get(id) {
            return (id, m);
        }
        log::warn!(
            "[authority] unknown section '{}', falling back to '{}'",
            id,
            self.default_id
        );
        (self.default_id.as_str(), &self.fallback)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Zero-based position in catalog order.
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceRole {
    Background,
    Shadow,
    Content,
    Highlight,
    Accent,
}

impl InstanceRole {
    pub const ALL: [InstanceRole; 5] = [
        InstanceRole::Background,
        InstanceRole::Shadow,
        InstanceRole::Content,
        InstanceRole::Highlight,
        InstanceRole::Accent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InstanceRole::Background => "background",
            InstanceRole::Shadow => "shadow",
            InstanceRole::Content => "content",
            InstanceRole::Highlight => "highlight",
            InstanceRole::Accent => "accent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Like [`InstanceRole::from_name`], but unknown or missing names fall
    /// back to `Content`.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("[authority] unknown role '{}', using content", name);
            Self::Content
        })
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTransform {
    #[default]
    Identity,
    Darken,
    Brighten,
    Complement,
}

impl ColorTransform {
    pub fn apply(self, c: [f32; 3]) -> [f32; 3] {
        match self {
            ColorTransform::Identity => c,
            ColorTransform::Darken => c.map(|v| v * DARKEN_FACTOR),
            ColorTransform::Brighten => c.map(|v| (v * BRIGHTEN_FACTOR).min(1.0)),
            ColorTransform::Complement => c.map(|v| 1.0 - v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleModifier {
    pub grid_scale: f32,
    pub morph_scale: f32,
    pub rotation_scale: f32,
    pub dimension_boost: f32,
    pub interaction_sensitivity: f32,
    #[serde(default)]
    pub color_transform: ColorTransform,
}

#[derive(Clone, Debug)]
pub struct RoleCatalog {
    roles: [RoleModifier; 5],
}

impl RoleCatalog {
    pub fn builtin() -> Self {
        let role = |grid_scale: f32,
                    morph_scale: f32,
                    rotation_scale: f32,
                    dimension_boost: f32,
                    sensitivity: f32,
                    color_transform: ColorTransform| {
            RoleModifier {
                grid_scale,
                morph_scale,
                rotation_scale,
                dimension_boost,
                interaction_sensitivity: sensitivity,
                color_transform,
            }
        };
        Self {
            roles: [
                role(0.5, 0.5, 0.5, 0.0, 0.3, ColorTransform::Darken),
                role(0.8, 0.7, 0.7, 0.05, 0.5, ColorTransform::Darken),
                role(1.0, 1.0, 1.0, 0.1, 1.0, ColorTransform::Identity),
                role(1.4, 1.3, 1.2, 0.2, 1.2, ColorTransform::Brighten),
                role(2.0, 1.6, 1.5, 0.3, 1.5, ColorTransform::Complement),
            ],
        }
    }

    pub fn get(&self, role: InstanceRole) -> &RoleModifier {
        &self.roles[role.slot()]
    }

    pub fn set(&mut self, role: InstanceRole, modifier: RoleModifier) {
        self.roles[role.slot()] = modifier;
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
