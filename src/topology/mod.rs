//! Topology of a geomodel: component identifiers, boundary/incidence
//! relations and the unique-vertex registry.
//!
//! - [`component_id`]: `ComponentId`, `ComponentKind` and local vertex handles
//! - [`relations`]: the mirrored boundary/incidence adjacency maps
//! - [`unique_vertices`]: union-find of mesh vertices shared between components

pub mod component_id;
pub mod relations;
pub mod unique_vertices;

pub use component_id::{ComponentId, ComponentKind, ComponentMeshVertex};
pub use relations::TopologyGraph;
pub use unique_vertices::{UniqueVertexId, UniqueVertexRegistry};
