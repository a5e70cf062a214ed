use crate::core::space::error::SpaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("Unsupported {record} record version {found} (expected {expected})")]
    UnsupportedVersion {
        record: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Invalid volume kind tag: {0}")]
    InvalidKind(u8),

    #[error("Stored box is invalid: {0}")]
    Space(#[from] SpaceError),
}
