//! Layout calculation modules
//!
//! This module handles all the geometric decisions made before drawing:
//! - Page geometry (margins, bands, drawable height)
//! - Segmentation of tall captures into page slices
//! - Table of contents sizing
//! - The final page plan

mod geometry;
mod plan;
mod segment;
mod toc;

pub use geometry::*;
pub use plan::*;
pub use segment::*;
pub use toc::*;
