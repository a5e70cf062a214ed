use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Point count mismatch: expected {expected} points, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("Point index {index} is out of range for a group of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}
