//! Linear element types and their reference-element topology.
//!
//! Vertex numbering follows the Gmsh convention, so element connectivity read
//! from an `.msh` file can be used directly.

/// Linear element types understood by the adapters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum CellType {
    /// 0D vertex.
    Vertex,
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D tensor-product cell (hex).
    Hexahedron,
    /// 3D wedge/prism.
    Prism,
    /// 3D pyramid.
    Pyramid,
}

const TET_FACETS: &[&[u32]] = &[&[0, 1, 2], &[0, 2, 3], &[1, 3, 2], &[0, 3, 1]];
const HEX_FACETS: &[&[u32]] = &[
    &[0, 1, 2, 3],
    &[7, 6, 5, 4],
    &[0, 3, 7, 4],
    &[1, 5, 6, 2],
    &[2, 6, 7, 3],
    &[0, 4, 5, 1],
];
const PRISM_FACETS: &[&[u32]] = &[
    &[0, 1, 2],
    &[5, 4, 3],
    &[0, 2, 5, 3],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
];
const PYRAMID_FACETS: &[&[u32]] = &[&[0, 3, 4], &[0, 4, 1], &[4, 3, 2], &[1, 4, 2], &[0, 1, 2, 3]];

impl CellType {
    /// Returns the topological dimension of the cell.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Vertex => 0,
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron | CellType::Hexahedron | CellType::Prism | CellType::Pyramid => 3,
        }
    }

    pub fn nb_vertices(self) -> usize {
        match self {
            CellType::Vertex => 1,
            CellType::Segment => 2,
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Facets of a 3D cell as lists of local vertices, outward oriented.
    ///
    /// Empty for cells of lower dimension.
    pub fn facets(self) -> &'static [&'static [u32]] {
        match self {
            CellType::Tetrahedron => TET_FACETS,
            CellType::Hexahedron => HEX_FACETS,
            CellType::Prism => PRISM_FACETS,
            CellType::Pyramid => PYRAMID_FACETS,
            _ => &[],
        }
    }

    /// Gmsh element type code.
    pub fn gmsh_code(self) -> u32 {
        match self {
            CellType::Segment => 1,
            CellType::Triangle => 2,
            CellType::Quadrilateral => 3,
            CellType::Tetrahedron => 4,
            CellType::Hexahedron => 5,
            CellType::Prism => 6,
            CellType::Pyramid => 7,
            CellType::Vertex => 15,
        }
    }

    pub fn from_gmsh_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => CellType::Segment,
            2 => CellType::Triangle,
            3 => CellType::Quadrilateral,
            4 => CellType::Tetrahedron,
            5 => CellType::Hexahedron,
            6 => CellType::Prism,
            7 => CellType::Pyramid,
            15 => CellType::Vertex,
            _ => return None,
        })
    }

    /// Recognizes a linear polyhedron from its vertex and facet counts.
    pub fn from_polyhedron(nb_vertices: usize, facets: &[Vec<u32>]) -> Option<Self> {
        [
            CellType::Tetrahedron,
            CellType::Pyramid,
            CellType::Prism,
            CellType::Hexahedron,
        ]
        .into_iter()
        .find(|t| {
            t.nb_vertices() == nb_vertices
                && t.facets().len() == facets.len()
                && t.facets()
                    .iter()
                    .zip(facets)
                    .all(|(a, b)| *a == b.as_slice())
        })
    }
}
