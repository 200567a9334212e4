//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in 3D. An empty box has `min > max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub const fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Smallest box containing every point of `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(*p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.min[d] > self.max[d])
    }

    pub fn add_point(&mut self, p: [f64; 3]) {
        for d in 0..3 {
            self.min[d] = self.min[d].min(p[d]);
            self.max[d] = self.max[d].max(p[d]);
        }
    }

    pub fn add_box(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.add_point(other.min);
        self.add_point(other.max);
    }

    /// Length of the diagonal, `0.0` for an empty box.
    pub fn diagonal_length(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (0..3)
            .map(|d| (self.max[d] - self.min[d]).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|d| self.min[d] <= p[d] && p[d] <= self.max[d])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_points_and_boxes() {
        let mut a = BoundingBox::from_points(&[[0.0, 0.0, 0.0], [1.0, 2.0, 0.0]]);
        assert_eq!(a.max, [1.0, 2.0, 0.0]);
        let b = BoundingBox::from_points(&[[-1.0, 0.5, 3.0]]);
        a.add_box(&b);
        assert_eq!(a.min, [-1.0, 0.0, 0.0]);
        assert_eq!(a.max, [1.0, 2.0, 3.0]);
        assert!(a.contains([0.0, 1.0, 1.0]));
        a.add_box(&BoundingBox::empty());
        assert_eq!(a.min, [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_box_has_zero_diagonal() {
        assert!(BoundingBox::empty().is_empty());
        assert_eq!(BoundingBox::empty().diagonal_length(), 0.0);
        let unit = BoundingBox::from_points(&[[0.0; 3], [3.0, 4.0, 0.0]]);
        assert!((unit.diagonal_length() - 5.0).abs() < 1e-12);
    }
}
