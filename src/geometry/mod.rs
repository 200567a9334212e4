//! Geometry utilities for geomodel.
//!
//! Bounding boxes for meshes and models, and tolerance-based detection of
//! coincident points used by the import adapters.

pub mod bounding_box;
pub mod colocation;

pub use bounding_box::BoundingBox;
pub use colocation::{ColocatedInfo, Tolerance, colocate};
