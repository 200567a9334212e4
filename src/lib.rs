#![cfg_attr(docsrs, feature(doc_cfg))]
//! # geomodel
//!
//! geomodel stores boundary-representation models of geological and
//! engineering volumes: typed components (corners, lines, surfaces, blocks)
//! each carrying its own mesh, the boundary/incidence relations between
//! them, and a registry of *unique vertices* identifying mesh vertices that
//! coincide across components.
//!
//! ## Features
//! - [`model::Model`] for 3D BReps and 2D Sections, with relation and
//!   unique-vertex editing and full invariant validation
//! - Lossless native persistence (`.brep`, `.sect`, `.surf`) with version
//!   checks and migration of older files
//! - Import adapters for Gmsh `.msh` (v2 and v4), SVG paths, PLY and VTK
//!   PolyData surfaces, plus Gmsh export
//! - Extension based dispatch through a pluggable [`io::FormatRegistry`]
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! geomodel = "0.1"
//! # Optional features:
//! # features = ["check-invariants"]
//! ```
//!
//! ```rust,no_run
//! use geomodel::prelude::*;
//!
//! let model = geomodel::io::load_brep("cube.msh")?;
//! println!("{} blocks, {} unique vertices", model.nb_blocks(), model.nb_unique_vertices());
//! geomodel::io::save_brep(&model, "cube.brep")?;
//! # Ok::<(), ModelError>(())
//! ```
//!
//! ## Invariant checking
//!
//! With the `check-invariants` feature every component insertion and removal
//! re-validates the whole model and panics on the first violation. Without
//! it, call [`model::Model::validate`] (or
//! [`DebugInvariants::validate_invariants`]) explicitly.

pub mod debug_invariants;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod mesh_error;
pub mod model;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{BoundingBox, Tolerance};
    pub use crate::io::{
        FormatRegistry, ModelReader, ModelWriter, SurfaceReader, SurfaceWriter,
    };
    pub use crate::mesh::{
        CellType, EdgedCurve, MeshEntity, Point, PointSet, PolygonalSurface, PolyhedralSolid,
        Polyhedron,
    };
    pub use crate::mesh_error::ModelError;
    pub use crate::model::{Component, Model, ModelKind};
    pub use crate::topology::{ComponentId, ComponentKind, ComponentMeshVertex, UniqueVertexId};
}
