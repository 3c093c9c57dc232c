pub mod authority;
pub mod bridge;
pub mod clock;
pub mod config;
pub mod constants;
pub mod easing;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod interaction;
pub mod sink;
pub mod surface;
pub mod variables;
pub static LATTICE_WGSL: &str = include_str!("../shaders/lattice.wgsl");

pub use authority::{GlobalMoodState, InstanceRole, ParameterAuthority};
pub use bridge::{ParameterTarget, RendererId, RendererOptions, SynchronizationBridge};
pub use clock::{FrameClock, InstantClock, ManualClock};
pub use config::LatticeConfig;
pub use effects::{EffectLevel, EffectTarget, EffectsOrchestrator, TriggerOptions};
pub use error::{LatticeError, LatticeResult, RenderSurfaceError};
pub use geometry::{DrawTarget, GeometryKind, GeometryRenderer, LatticeParameters, ParameterPatch};
pub use interaction::InteractionEvent;
pub use sink::{MemorySink, VariableSink, VariableValue};
pub use surface::{FrameState, LayerRenderer, PointerSignal};
pub use variables::Variable;
