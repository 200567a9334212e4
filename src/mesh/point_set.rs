//! Point set mesh carried by corners.

use crate::mesh::Point;
use serde::{Deserialize, Serialize};

/// A bare list of vertices without elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub points: Vec<Point>,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Point set holding a single vertex, as a corner requires.
    pub fn single(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }
}
