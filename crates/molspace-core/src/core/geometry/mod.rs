//! # Geometry Module
//!
//! Value types describing where points are and how pairwise results are stored.
//!
//! - [`aabox`] - Axis-aligned bounding boxes with a cached bounding radius
//! - [`coords`] - Shared, copy-on-write groups of points and their editor
//! - [`matrix`] - Dense, reusable outer×inner result buffers
//! - [`error`] - Errors raised by group construction and editing
//!
//! ```ignore
//! use molspace::core::geometry::coords::CoordGroup;
//! use nalgebra::{Point3, Vector3};
//!
//! let group = CoordGroup::from_slice(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
//! let moved = group.translated(&Vector3::new(0.0, 2.0, 0.0));
//! assert_eq!(moved.aabox().center(), Point3::new(0.5, 2.0, 0.0));
//! ```

pub mod aabox;
pub mod coords;
pub mod error;
pub mod matrix;
