use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("render target must be at least 1x1 pixels, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },

    #[error("sample budget must allow at least one frame")]
    NoSamples,

    #[error("at least one sample per pixel is required")]
    NoPixelSamples,

    #[error("vertical field of view must lie in (0, pi) radians, got {0}")]
    InvalidFieldOfView(f32),

    #[error("near distance must be positive and finite, got {0}")]
    InvalidNear(f32),

    #[error("movement speed must be finite and not negative, got {0}")]
    InvalidMovementSpeed(f32),

    #[error("look sensitivity must be finite and not negative, got {0}")]
    InvalidLookSensitivity(f32),
}
