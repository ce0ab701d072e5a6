//! Calibration target geometry.
//!
//! A target is described by the 3D coordinates of its labeled interior
//! corners in target-local units, with Z = 0 (planar board). Corner ids are
//! row-major indices, matching the ids a charuco/checkerboard detector
//! reports.

use serde::{Deserialize, Serialize};

use crate::{Pt3, Real};

/// Physical layout of a planar calibration target: one labeled 3D point per
/// interior corner. Immutable after construction.
#[derive(Clone, Debug)]
pub struct TargetModel {
    points: Vec<Pt3>,
    corners_x: usize,
    corners_y: usize,
    square_size: Real,
}

impl TargetModel {
    /// Charuco board with `squares_x` x `squares_y` squares of edge
    /// `square_size`. Interior corners form a
    /// `(squares_x - 1) x (squares_y - 1)` grid; corner id `0` sits at the
    /// target origin and ids increase along +X first (row-major).
    pub fn charuco(squares_x: usize, squares_y: usize, square_size: Real) -> Self {
        Self::interior_grid(squares_x, squares_y, square_size)
    }

    /// Checkerboard with the same interior-corner layout as a charuco board
    /// of identical dimensions.
    pub fn checkerboard(squares_x: usize, squares_y: usize, square_size: Real) -> Self {
        Self::interior_grid(squares_x, squares_y, square_size)
    }

    fn interior_grid(squares_x: usize, squares_y: usize, square_size: Real) -> Self {
        let corners_x = squares_x.saturating_sub(1);
        let corners_y = squares_y.saturating_sub(1);

        let mut points = Vec::with_capacity(corners_x * corners_y);
        for row in 0..corners_y {
            for col in 0..corners_x {
                points.push(Pt3::new(
                    col as Real * square_size,
                    row as Real * square_size,
                    0.0,
                ));
            }
        }

        Self {
            points,
            corners_x,
            corners_y,
            square_size,
        }
    }

    /// Total number of labeled corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the target has no corners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Target-local coordinates of corner `id`, if the id is in range.
    #[inline]
    pub fn point(&self, id: usize) -> Option<Pt3> {
        self.points.get(id).copied()
    }

    /// All corner points in id order.
    pub fn points(&self) -> &[Pt3] {
        &self.points
    }

    /// Interior corner grid extent `(corners_x, corners_y)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.corners_x, self.corners_y)
    }

    /// Edge length of one board square.
    pub fn square_size(&self) -> Real {
        self.square_size
    }
}

/// Serializable target description, resolved into a [`TargetModel`] at load
/// time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "board_type", rename_all = "snake_case")]
pub enum TargetSpec {
    Charuco {
        squares_x: usize,
        squares_y: usize,
        square_size: Real,
    },
    Checkerboard {
        squares_x: usize,
        squares_y: usize,
        square_size: Real,
    },
}

impl TargetSpec {
    pub fn build(&self) -> TargetModel {
        match *self {
            TargetSpec::Charuco {
                squares_x,
                squares_y,
                square_size,
            } => TargetModel::charuco(squares_x, squares_y, square_size),
            TargetSpec::Checkerboard {
                squares_x,
                squares_y,
                square_size,
            } => TargetModel::checkerboard(squares_x, squares_y, square_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charuco_interior_corner_count() {
        let target = TargetModel::charuco(5, 4, 0.03);
        assert_eq!(target.len(), 12);
        assert_eq!(target.grid_size(), (4, 3));
    }

    #[test]
    fn corner_ids_are_row_major() {
        let target = TargetModel::charuco(4, 3, 0.05);
        // 3 corners per row, 2 rows
        assert_eq!(target.point(0), Some(Pt3::new(0.0, 0.0, 0.0)));
        assert_eq!(target.point(2), Some(Pt3::new(0.10, 0.0, 0.0)));
        assert_eq!(target.point(3), Some(Pt3::new(0.0, 0.05, 0.0)));
        assert_eq!(target.point(6), None);
    }

    #[test]
    fn spec_builds_matching_model() {
        let spec = TargetSpec::Charuco {
            squares_x: 7,
            squares_y: 5,
            square_size: 0.02,
        };
        let target = spec.build();
        assert_eq!(target.len(), 24);
        assert_eq!(target.square_size(), 0.02);
    }

    #[test]
    fn spec_json_roundtrip() {
        let spec = TargetSpec::Checkerboard {
            squares_x: 8,
            squares_y: 6,
            square_size: 0.025,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let restored: TargetSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.build().len(), 35);
    }
}
