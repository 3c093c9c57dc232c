use thiserror::Error;

/// Failures that are fatal for a single render surface and nothing else.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderSurfaceError {
    #[error("shader compile/link failed: {0}")]
    ShaderCompile(String),

    #[error("GPU context lost")]
    ContextLost,

    #[error("no GPU shader capability: {0}")]
    Unavailable(String),

    #[error("draw failed: {0}")]
    Draw(String),
}

#[derive(Error, Debug)]
pub enum LatticeError {
    /// Malformed external configuration; callers fall back to built-in defaults.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown section/role/theme/preset name.
    #[error("unknown {kind}: {name}")]
    UnknownIdentifier { kind: &'static str, name: String },

    /// Preset document rejected by import validation.
    #[error("preset import rejected: {0}")]
    PresetImport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Surface(#[from] RenderSurfaceError),
}

impl LatticeError {
    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind,
            name: name.into(),
        }
    }
}

pub type LatticeResult<T> = Result<T, LatticeError>;
