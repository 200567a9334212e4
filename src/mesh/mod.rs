//! Meshes carried by model components.
//!
//! Each component kind owns one mesh flavour:
//!
//! | kind    | mesh                   | elements  |
//! |---------|------------------------|-----------|
//! | Corner  | [`PointSet`]           | none      |
//! | Line    | [`EdgedCurve`]         | edges     |
//! | Surface | [`PolygonalSurface`]   | polygons  |
//! | Block   | [`PolyhedralSolid`]    | polyhedra |
//!
//! [`MeshEntity`] is the closed union of the four, so a component's kind is
//! always derived from the mesh it carries.

pub mod cell_type;
pub mod edged_curve;
pub mod point_set;
pub mod polygonal_surface;
pub mod polyhedral_solid;

pub use cell_type::CellType;
pub use edged_curve::EdgedCurve;
pub use point_set::PointSet;
pub use polygonal_surface::PolygonalSurface;
pub use polyhedral_solid::{PolyhedralSolid, Polyhedron};

use crate::geometry::BoundingBox;
use crate::mesh_error::ModelError;
use crate::topology::component_id::ComponentKind;
use serde::{Deserialize, Serialize};

/// Vertex position. Sections keep `z = 0`.
pub type Point = [f64; 3];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshEntity {
    PointSet(PointSet),
    EdgedCurve(EdgedCurve),
    PolygonalSurface(PolygonalSurface),
    PolyhedralSolid(PolyhedralSolid),
}

impl MeshEntity {
    /// Component kind carrying this mesh flavour.
    pub fn kind(&self) -> ComponentKind {
        match self {
            MeshEntity::PointSet(_) => ComponentKind::Corner,
            MeshEntity::EdgedCurve(_) => ComponentKind::Line,
            MeshEntity::PolygonalSurface(_) => ComponentKind::Surface,
            MeshEntity::PolyhedralSolid(_) => ComponentKind::Block,
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            MeshEntity::PointSet(m) => &m.points,
            MeshEntity::EdgedCurve(m) => &m.points,
            MeshEntity::PolygonalSurface(m) => &m.points,
            MeshEntity::PolyhedralSolid(m) => &m.points,
        }
    }

    pub fn nb_vertices(&self) -> usize {
        self.points().len()
    }

    /// Number of edges, polygons or polyhedra; zero for point sets.
    pub fn nb_elements(&self) -> usize {
        match self {
            MeshEntity::PointSet(_) => 0,
            MeshEntity::EdgedCurve(m) => m.nb_edges(),
            MeshEntity::PolygonalSurface(m) => m.nb_polygons(),
            MeshEntity::PolyhedralSolid(m) => m.nb_polyhedra(),
        }
    }

    /// Mesh vertices of element `element`.
    pub fn element_vertices(&self, element: u32) -> Option<Vec<u32>> {
        let e = element as usize;
        match self {
            MeshEntity::PointSet(_) => None,
            MeshEntity::EdgedCurve(m) => m.edges.get(e).map(|edge| edge.to_vec()),
            MeshEntity::PolygonalSurface(m) => {
                (e < m.nb_polygons()).then(|| m.polygon_vertices(element).to_vec())
            }
            MeshEntity::PolyhedralSolid(m) => m.polyhedra.get(e).map(|p| p.vertices.clone()),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.points())
    }

    /// Structural checks: element indices in range, minimal element sizes.
    pub fn check(&self) -> Result<(), ModelError> {
        match self {
            MeshEntity::PointSet(_) => Ok(()),
            MeshEntity::EdgedCurve(m) => m.check(),
            MeshEntity::PolygonalSurface(m) => m.check(),
            MeshEntity::PolyhedralSolid(m) => m.check(),
        }
    }

    pub fn as_edged_curve(&self) -> Option<&EdgedCurve> {
        match self {
            MeshEntity::EdgedCurve(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_polygonal_surface(&self) -> Option<&PolygonalSurface> {
        match self {
            MeshEntity::PolygonalSurface(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_polyhedral_solid(&self) -> Option<&PolyhedralSolid> {
        match self {
            MeshEntity::PolyhedralSolid(m) => Some(m),
            _ => None,
        }
    }
}

impl From<PointSet> for MeshEntity {
    fn from(m: PointSet) -> Self {
        MeshEntity::PointSet(m)
    }
}

impl From<EdgedCurve> for MeshEntity {
    fn from(m: EdgedCurve) -> Self {
        MeshEntity::EdgedCurve(m)
    }
}

impl From<PolygonalSurface> for MeshEntity {
    fn from(m: PolygonalSurface) -> Self {
        MeshEntity::PolygonalSurface(m)
    }
}

impl From<PolyhedralSolid> for MeshEntity {
    fn from(m: PolyhedralSolid) -> Self {
        MeshEntity::PolyhedralSolid(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let corner: MeshEntity = PointSet::single([1.0, 2.0, 3.0]).into();
        assert_eq!(corner.kind(), ComponentKind::Corner);
        assert_eq!(corner.nb_elements(), 0);
        assert_eq!(corner.element_vertices(0), None);
        let line: MeshEntity = EdgedCurve::polyline(vec![[0.0; 3], [0.0, 0.0, 2.0]]).into();
        assert_eq!(line.kind(), ComponentKind::Line);
        assert_eq!(line.element_vertices(0), Some(vec![0, 1]));
        assert_eq!(line.bounding_box().max, [0.0, 0.0, 2.0]);
    }

    #[test]
    fn serde_tags_variant() {
        let mesh: MeshEntity = PointSet::single([0.5, 0.0, 0.0]).into();
        let json = serde_json::to_value(&mesh).unwrap();
        assert_eq!(json["type"], "point_set");
        let back: MeshEntity = serde_json::from_value(json).unwrap();
        assert_eq!(back, mesh);
    }
}
