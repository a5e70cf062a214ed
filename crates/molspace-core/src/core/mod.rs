//! # Core Module
//!
//! This module provides the geometric building blocks shared by every distance
//! calculation in molspace.
//!
//! ## Architecture
//!
//! - **Geometry** ([`geometry`]) - Axis-aligned boxes, coordinate groups and pair matrices
//! - **Spaces** ([`space`]) - The `Space` contract, Cartesian and periodic volumes, configuration
//! - **Binary I/O** ([`io`]) - Versioned, field-ordered records for the value types
//!
//! ## Key Capabilities
//!
//! - **Minimum-image distances** between whole groups with a single wrap per group pair
//! - **Conservative cutoff rejection** using bounding spheres before any exact work
//! - **Periodic replica enumeration** around a center group
//! - **Copy-on-write coordinates** that are cheap to share and safe to edit

pub mod geometry;
pub mod io;
pub mod space;
