//! Versioned binary records for the geometric value types.
//!
//! Every record starts with a four-byte magic tag and a little-endian `u32`
//! version, followed by the fields of the value in declaration order. Numbers are
//! little-endian, `f64` values are stored as their IEEE-754 bits and counts as
//! `u64`. Derived quantities are never trusted on read: bounding boxes and box
//! lengths are recomputed from the primary fields.

pub mod error;
pub mod records;
mod stream;
pub mod traits;
