//! Polygonal surface mesh carried by surfaces, and returned by the surface
//! readers (PLY, VTP).
//!
//! Polygon connectivity is stored flattened: `polygon_vertices` holds every
//! polygon's vertices back to back and `polygon_offsets[p]..polygon_offsets[p + 1]`
//! delimits polygon `p`.

use crate::mesh::Point;
use crate::mesh_error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonalSurface {
    pub points: Vec<Point>,
    polygon_vertices: Vec<u32>,
    polygon_offsets: Vec<u32>,
}

impl Default for PolygonalSurface {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            polygon_vertices: Vec::new(),
            polygon_offsets: vec![0],
        }
    }
}

impl PolygonalSurface {
    /// Surface with the given vertices and no polygon.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn from_polygons<P: AsRef<[u32]>>(points: Vec<Point>, polygons: &[P]) -> Self {
        let mut surface = Self::new(points);
        for polygon in polygons {
            surface.add_polygon(polygon.as_ref());
        }
        surface
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_polygons(&self) -> usize {
        self.polygon_offsets.len().saturating_sub(1)
    }

    pub fn point(&self, vertex: u32) -> Option<Point> {
        self.points.get(vertex as usize).copied()
    }

    pub fn add_point(&mut self, point: Point) -> u32 {
        self.points.push(point);
        (self.points.len() - 1) as u32
    }

    /// Appends a polygon and returns its index.
    pub fn add_polygon(&mut self, vertices: &[u32]) -> u32 {
        self.polygon_vertices.extend_from_slice(vertices);
        self.polygon_offsets.push(self.polygon_vertices.len() as u32);
        (self.nb_polygons() - 1) as u32
    }

    /// Vertices of polygon `polygon`, or an empty slice when out of range.
    pub fn polygon_vertices(&self, polygon: u32) -> &[u32] {
        let p = polygon as usize;
        match (self.polygon_offsets.get(p), self.polygon_offsets.get(p + 1)) {
            (Some(&start), Some(&end)) => &self.polygon_vertices[start as usize..end as usize],
            _ => &[],
        }
    }

    pub fn polygons(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.nb_polygons() as u32).map(move |p| self.polygon_vertices(p))
    }

    /// Polygons using `vertex`.
    pub fn polygons_around_vertex(&self, vertex: u32) -> Vec<u32> {
        self.polygons()
            .enumerate()
            .filter(|(_, vs)| vs.contains(&vertex))
            .map(|(p, _)| p as u32)
            .collect()
    }

    /// For each polygon and each of its edges `(v[i], v[i + 1])`, the polygon
    /// on the other side of the edge.
    ///
    /// Border edges and edges shared by more than two polygons have no adjacent.
    pub fn polygon_adjacencies(&self) -> Vec<Vec<Option<u32>>> {
        let mut sharing: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
        for (p, vs) in self.polygons().enumerate() {
            for i in 0..vs.len() {
                let (a, b) = (vs[i], vs[(i + 1) % vs.len()]);
                sharing.entry((a.min(b), a.max(b))).or_default().push(p as u32);
            }
        }
        self.polygons()
            .enumerate()
            .map(|(p, vs)| {
                (0..vs.len())
                    .map(|i| {
                        let (a, b) = (vs[i], vs[(i + 1) % vs.len()]);
                        match sharing.get(&(a.min(b), a.max(b))).map(Vec::as_slice) {
                            Some(&[x, y]) if x == p as u32 => Some(y),
                            Some(&[x, y]) if y == p as u32 => Some(x),
                            _ => None,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn check(&self) -> Result<(), ModelError> {
        let n = self.points.len() as u32;
        if self.polygon_offsets.first() != Some(&0)
            || self.polygon_offsets.windows(2).any(|w| w[0] > w[1])
            || self.polygon_offsets.last().copied() != Some(self.polygon_vertices.len() as u32)
        {
            return Err(ModelError::InvalidMesh(
                "polygon offsets are inconsistent with the vertex table".into(),
            ));
        }
        for (p, vs) in self.polygons().enumerate() {
            if vs.len() < 3 {
                return Err(ModelError::InvalidMesh(format!(
                    "polygon {p} has {} vertices",
                    vs.len()
                )));
            }
            if let Some(v) = vs.iter().find(|v| **v >= n) {
                return Err(ModelError::InvalidMesh(format!(
                    "polygon {p} refers to vertex {v} out of {n}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> PolygonalSurface {
        PolygonalSurface::from_polygons(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn flattened_polygons() {
        let s = two_triangles();
        assert_eq!(s.nb_polygons(), 2);
        assert_eq!(s.polygon_vertices(1), &[0, 2, 3]);
        assert!(s.polygon_vertices(2).is_empty());
        assert_eq!(s.polygons_around_vertex(2), vec![0, 1]);
        assert_eq!(s.polygons_around_vertex(3), vec![1]);
        assert!(s.check().is_ok());
    }

    #[test]
    fn adjacencies_across_shared_edge() {
        let adj = two_triangles().polygon_adjacencies();
        assert_eq!(adj[0], vec![None, None, Some(1)]);
        assert_eq!(adj[1], vec![Some(0), None, None]);
    }

    #[test]
    fn degenerate_polygon_rejected() {
        let mut s = two_triangles();
        s.add_polygon(&[0, 1]);
        assert!(matches!(s.check(), Err(ModelError::InvalidMesh(_))));
    }
}
