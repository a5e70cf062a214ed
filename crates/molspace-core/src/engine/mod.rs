//! # Engine Module
//!
//! Higher-level tasks that drive the spatial core the way a simulation does.
//!
//! ## Architecture
//!
//! - **Contact Search** ([`contacts`]) - All group pairs closer than a cutoff, using the
//!   conservative `beyond` test before any exact distance work, in parallel when the
//!   `parallel` feature is enabled
//! - **Volume Rescaling** ([`rescale`]) - The geometric half of a constant-pressure move:
//!   resize a copy of the volume and carry every group into it
//!
//! Tasks never mutate their inputs. A resized volume and its remapped groups are
//! returned together and only become visible once the caller swaps them in.

pub mod contacts;
pub mod rescale;
