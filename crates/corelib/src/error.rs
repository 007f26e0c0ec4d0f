//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("entity {0} does not exist")]
    UnknownEntity(u32),
    #[error("light index {index} out of range ({count} lights in scene)")]
    UnknownLight { index: usize, count: usize },
    #[error("invalid light animator bounds: min {min:?} exceeds max {max:?}")]
    InvalidBounds { min: [f32; 3], max: [f32; 3] },
}

pub type CoreResult<T> = Result<T, CoreError>;
