//! Polyhedral volume mesh carried by blocks.

use crate::mesh::Point;
use crate::mesh::cell_type::CellType;
use crate::mesh_error::ModelError;
use serde::{Deserialize, Serialize};

/// One polyhedron: its mesh vertices and its facets as lists of indices into
/// `vertices` (local to the polyhedron).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polyhedron {
    pub vertices: Vec<u32>,
    pub facets: Vec<Vec<u32>>,
}

impl Polyhedron {
    /// Polyhedron of a standard linear cell type.
    pub fn from_cell(cell: CellType, vertices: Vec<u32>) -> Self {
        let facets = cell.facets().iter().map(|f| f.to_vec()).collect();
        Self { vertices, facets }
    }

    /// Linear cell type this polyhedron matches, if any.
    pub fn cell_type(&self) -> Option<CellType> {
        CellType::from_polyhedron(self.vertices.len(), &self.facets)
    }

    /// Mesh vertices of facet `facet`.
    pub fn facet_vertices(&self, facet: usize) -> Vec<u32> {
        self.facets
            .get(facet)
            .map(|f| {
                f.iter()
                    .filter_map(|lv| self.vertices.get(*lv as usize).copied())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyhedralSolid {
    pub points: Vec<Point>,
    pub polyhedra: Vec<Polyhedron>,
}

impl PolyhedralSolid {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            polyhedra: Vec::new(),
        }
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_polyhedra(&self) -> usize {
        self.polyhedra.len()
    }

    pub fn add_point(&mut self, point: Point) -> u32 {
        self.points.push(point);
        (self.points.len() - 1) as u32
    }

    pub fn add_polyhedron(&mut self, polyhedron: Polyhedron) -> u32 {
        self.polyhedra.push(polyhedron);
        (self.polyhedra.len() - 1) as u32
    }

    pub fn polyhedra_around_vertex(&self, vertex: u32) -> Vec<u32> {
        self.polyhedra
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vertices.contains(&vertex))
            .map(|(i, _)| i as u32)
            .collect()
    }

    pub(crate) fn check(&self) -> Result<(), ModelError> {
        let n = self.points.len() as u32;
        for (i, p) in self.polyhedra.iter().enumerate() {
            if p.vertices.len() < 4 || p.facets.len() < 4 {
                return Err(ModelError::InvalidMesh(format!(
                    "polyhedron {i} has {} vertices and {} facets",
                    p.vertices.len(),
                    p.facets.len()
                )));
            }
            if let Some(v) = p.vertices.iter().find(|v| **v >= n) {
                return Err(ModelError::InvalidMesh(format!(
                    "polyhedron {i} refers to vertex {v} out of {n}"
                )));
            }
            let local = p.vertices.len() as u32;
            for (f, facet) in p.facets.iter().enumerate() {
                if facet.len() < 3 || facet.iter().any(|lv| *lv >= local) {
                    return Err(ModelError::InvalidMesh(format!(
                        "facet {f} of polyhedron {i} is malformed: {facet:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}
