//! Polyline mesh carried by lines.

use crate::mesh::Point;
use crate::mesh_error::ModelError;
use serde::{Deserialize, Serialize};

/// Vertices joined by edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgedCurve {
    pub points: Vec<Point>,
    pub edges: Vec<[u32; 2]>,
}

impl EdgedCurve {
    pub fn new(points: Vec<Point>, edges: Vec<[u32; 2]>) -> Self {
        Self { points, edges }
    }

    /// Open polyline through `points` in order.
    pub fn polyline(points: Vec<Point>) -> Self {
        let edges = (1..points.len() as u32).map(|i| [i - 1, i]).collect();
        Self { points, edges }
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn add_point(&mut self, point: Point) -> u32 {
        self.points.push(point);
        (self.points.len() - 1) as u32
    }

    pub fn add_edge(&mut self, v0: u32, v1: u32) -> u32 {
        self.edges.push([v0, v1]);
        (self.edges.len() - 1) as u32
    }

    /// Edges having `vertex` as an endpoint.
    pub fn edges_around_vertex(&self, vertex: u32) -> Vec<u32> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.contains(&vertex))
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Vertices used by exactly one edge, in increasing order.
    ///
    /// An open chain has two; a chain that loops on a single local vertex has none.
    pub fn end_vertices(&self) -> Vec<u32> {
        let mut degree = vec![0usize; self.points.len()];
        for [a, b] in &self.edges {
            for v in [a, b] {
                if let Some(d) = degree.get_mut(*v as usize) {
                    *d += 1;
                }
            }
        }
        degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 1)
            .map(|(v, _)| v as u32)
            .collect()
    }

    pub(crate) fn check(&self) -> Result<(), ModelError> {
        let n = self.points.len() as u32;
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.iter().any(|v| *v >= n) {
                return Err(ModelError::InvalidMesh(format!(
                    "edge {i} refers to vertex {edge:?} out of {n}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_ends() {
        let curve = EdgedCurve::polyline(vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(curve.nb_edges(), 2);
        assert_eq!(curve.end_vertices(), vec![0, 2]);
        assert_eq!(curve.edges_around_vertex(1), vec![0, 1]);
    }

    #[test]
    fn loop_has_no_end() {
        let mut curve = EdgedCurve::polyline(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        curve.add_edge(2, 0);
        assert!(curve.end_vertices().is_empty());
        assert!(curve.check().is_ok());
        curve.add_edge(2, 7);
        assert!(curve.check().is_err());
    }
}
