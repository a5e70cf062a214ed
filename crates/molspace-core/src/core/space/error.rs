use super::SpaceKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpaceError {
    #[error("Box side along {axis} has zero length")]
    ZeroLength { axis: char },

    #[error("Box side along {axis} is {length}, above the maximum of {max}")]
    TooLarge { axis: char, length: f64, max: f64 },

    #[error("Box dimensions and volumes must be finite")]
    NonFinite,

    #[error("Cannot set a negative volume ({0})")]
    NegativeVolume(f64),

    #[error("Cannot {operation} from a {from} space into a {to} space")]
    Incompatible {
        operation: &'static str,
        from: SpaceKind,
        to: SpaceKind,
    },

    #[error("Operation '{operation}' is not supported by a {kind} space")]
    Unsupported {
        operation: &'static str,
        kind: SpaceKind,
    },
}
