//! The 25 declarative live values written by the bridge.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variable {
    GlobalIntensity,
    GlobalSpeed,
    GlobalDensity,
    DimensionalDepth,
    Complexity,
    Coherence,
    ChaosIntensity,
    MouseInfluence,
    MouseX,
    MouseY,
    ClickPulse,
    ScrollChaos,
    ScrollVelocity,
    PortalIntensity,
    TransitionProgress,
    SectionHue,
    AccentColor,
    GridDensity,
    MorphFactor,
    RotationSpeed,
    GlitchIntensity,
    ColorShift,
    FocusX,
    FocusY,
    HoldIntensity,
}

impl Variable {
    pub const ALL: [Variable; 25] = [
        Variable::GlobalIntensity,
        Variable::GlobalSpeed,
        Variable::GlobalDensity,
        Variable::DimensionalDepth,
        Variable::Complexity,
        Variable::Coherence,
        Variable::ChaosIntensity,
        Variable::MouseInfluence,
        Variable::MouseX,
        Variable::MouseY,
        Variable::ClickPulse,
        Variable::ScrollChaos,
        Variable::ScrollVelocity,
        Variable::PortalIntensity,
        Variable::TransitionProgress,
        Variable::SectionHue,
        Variable::AccentColor,
        Variable::GridDensity,
        Variable::MorphFactor,
        Variable::RotationSpeed,
        Variable::GlitchIntensity,
        Variable::ColorShift,
        Variable::FocusX,
        Variable::FocusY,
        Variable::HoldIntensity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variable::GlobalIntensity => "global-intensity",
            Variable::GlobalSpeed => "global-speed",
            Variable::GlobalDensity => "global-density",
            Variable::DimensionalDepth => "dimensional-depth",
            Variable::Complexity => "complexity",
            Variable::Coherence => "coherence",
            Variable::ChaosIntensity => "chaos-intensity",
            Variable::MouseInfluence => "mouse-influence",
            Variable::MouseX => "mouse-x",
            Variable::MouseY => "mouse-y",
            Variable::ClickPulse => "click-pulse",
            Variable::ScrollChaos => "scroll-chaos",
            Variable::ScrollVelocity => "scroll-velocity",
            Variable::PortalIntensity => "portal-intensity",
            Variable::TransitionProgress => "transition-progress",
            Variable::SectionHue => "section-hue",
            Variable::AccentColor => "accent-color",
            Variable::GridDensity => "grid-density",
            Variable::MorphFactor => "morph-factor",
            Variable::RotationSpeed => "rotation-speed",
            Variable::GlitchIntensity => "glitch-intensity",
            Variable::ColorShift => "color-shift",
            Variable::FocusX => "focus-x",
            Variable::FocusY => "focus-y",
            Variable::HoldIntensity => "hold-intensity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("--").unwrap_or(name);
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}
