//! Detection of coincident points within a tolerance.
//!
//! Used by adapters that import geometry without explicit vertex sharing
//! (e.g. SVG paths) to decide which endpoints denote the same location.

use crate::geometry::bounding_box::BoundingBox;
use std::collections::HashMap;

/// Distance under which two points are considered coincident.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    /// Fraction of the bounding-box diagonal of the processed points.
    Relative(f64),
    /// Fixed distance.
    Absolute(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Relative(1e-5)
    }
}

impl Tolerance {
    /// Resolves the tolerance against the extent of `bbox`.
    pub fn resolve(self, bbox: &BoundingBox) -> f64 {
        match self {
            Tolerance::Relative(fraction) => fraction * bbox.diagonal_length(),
            Tolerance::Absolute(distance) => distance,
        }
    }
}

/// Result of [`colocate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColocatedInfo {
    /// For each input point, the index of its representative in `unique_points`.
    pub colocated_mapping: Vec<usize>,
    /// One representative per group of coincident points, in first-seen order.
    pub unique_points: Vec<[f64; 3]>,
}

impl ColocatedInfo {
    pub fn nb_unique_points(&self) -> usize {
        self.unique_points.len()
    }
}

fn distance2(a: [f64; 3], b: [f64; 3]) -> f64 {
    (0..3).map(|d| (a[d] - b[d]).powi(2)).sum()
}

/// Groups points closer than `epsilon`.
///
/// The first point of each group becomes its representative; a later point
/// joins the first representative found within `epsilon`. Points are hashed
/// on a grid of cell size `epsilon`, so only the 27 neighbouring cells are
/// searched.
pub fn colocate(points: &[[f64; 3]], epsilon: f64) -> ColocatedInfo {
    let mut info = ColocatedInfo {
        colocated_mapping: Vec::with_capacity(points.len()),
        unique_points: Vec::new(),
    };
    if !(epsilon > 0.0) || !epsilon.is_finite() {
        // exact matching
        let mut seen: HashMap<[u64; 3], usize> = HashMap::new();
        for p in points {
            let key = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
            let next = info.unique_points.len();
            let idx = *seen.entry(key).or_insert(next);
            if idx == next {
                info.unique_points.push(*p);
            }
            info.colocated_mapping.push(idx);
        }
        return info;
    }

    let eps2 = epsilon * epsilon;
    let cell_of = |p: [f64; 3]| -> [i64; 3] {
        [
            (p[0] / epsilon).floor() as i64,
            (p[1] / epsilon).floor() as i64,
            (p[2] / epsilon).floor() as i64,
        ]
    };
    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for p in points {
        let cell = cell_of(*p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [cell[0] + dx, cell[1] + dy, cell[2] + dz];
                    let Some(candidates) = grid.get(&key) else {
                        continue;
                    };
                    for &c in candidates {
                        if distance2(info.unique_points[c], *p) <= eps2 {
                            found = Some(c);
                            break 'search;
                        }
                    }
                }
            }
        }
        let idx = match found {
            Some(c) => c,
            None => {
                let idx = info.unique_points.len();
                info.unique_points.push(*p);
                grid.entry(cell).or_default().push(idx);
                idx
            }
        };
        info.colocated_mapping.push(idx);
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_nearby_points() {
        let pts = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1e-7, 0.0, 0.0],
            [1.0, 1e-7, 0.0],
            [2.0, 0.0, 0.0],
        ];
        let info = colocate(&pts, 1e-5);
        assert_eq!(info.colocated_mapping, vec![0, 1, 0, 1, 2]);
        assert_eq!(info.nb_unique_points(), 3);
        assert_eq!(info.unique_points[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn neighbours_across_cell_boundaries() {
        // straddles a grid line at x = 1e-3
        let pts = [[0.999_999e-3, 0.0, 0.0], [1.000_001e-3, 0.0, 0.0]];
        let info = colocate(&pts, 1e-3);
        assert_eq!(info.nb_unique_points(), 1);
    }

    #[test]
    fn zero_epsilon_is_exact() {
        let pts = [[0.5, 0.5, 0.0], [0.5, 0.5, 0.0], [0.5, 0.5 + 1e-12, 0.0]];
        let info = colocate(&pts, 0.0);
        assert_eq!(info.colocated_mapping, vec![0, 0, 1]);
    }

    #[test]
    fn relative_tolerance_scales_with_box() {
        let bbox = BoundingBox::from_points(&[[0.0; 3], [300.0, 400.0, 0.0]]);
        assert!((Tolerance::default().resolve(&bbox) - 5e-3).abs() < 1e-12);
        assert_eq!(Tolerance::Absolute(0.1).resolve(&bbox), 0.1);
    }
}
