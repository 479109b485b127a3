use thiserror::Error;

/// Everything that can go wrong while building a balloon pit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitError {
    #[error("Viewport {width}x{height} is not a usable render surface")]
    InvalidViewport { width: f32, height: f32 },
    #[error("Palette {0:?} has no colors")]
    EmptyPalette(&'static str),
    #[error("Range {name:?} is inverted ({min} > {max})")]
    InvertedRange { name: &'static str, min: f32, max: f32 },
    #[error("{name:?} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("A balloon needs 1 to 3 constraints, got {0}")]
    ConstraintCount(usize),
}
