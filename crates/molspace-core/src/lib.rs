//! # molspace
//!
//! Simulation volumes and distance kernels for molecular modeling.
//!
//! The crate answers one question as cheaply as possible: how far apart are two
//! sets of points inside a given simulation volume? Force-field evaluators ask it
//! for every group pair inside the non-bonded double loop, and Monte Carlo movers
//! ask it whenever a trial move needs a periodic image or a rescaled box.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Bounding boxes, shared coordinate groups with
//!   their copy-on-write editor, reusable pair matrices, the [`Space`](core::space::Space)
//!   contract with its Cartesian and periodic-box implementations, and the
//!   versioned binary records used to persist them.
//!
//! - **[`engine`]: The Consumers.** Higher-level tasks built on top of the core:
//!   a (parallel) cutoff-based contact search between groups and the
//!   volume-rescaling step of a constant-pressure move.

pub mod core;
pub mod engine;
