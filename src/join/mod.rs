//! Spatial join of features against census tracts
//!
//! [`index`] provides an R-tree over tract bounding boxes so each feature
//! only gets clipped against the handful of tracts it could touch;
//! [`allocate`] does the actual length-based allocation and point
//! assignment.

pub mod allocate;
pub mod index;

pub use allocate::{allocate_lines, assign_point, LineAllocation, LineAllocations};
pub use index::TractIndex;
