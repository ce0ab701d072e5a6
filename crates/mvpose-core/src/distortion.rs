//! Brown-Conrady lens distortion.

use serde::{Deserialize, Serialize};

use crate::{Real, Vec2};

/// Radial-tangential (Brown-Conrady) distortion with coefficients
/// `(k1, k2, p1, p2, k3)`, acting on normalized image coordinates.
///
/// The inverse mapping has no closed form; [`RadialTangential::undistort`]
/// uses a fixed-point iteration seeded with the distorted coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RadialTangential {
    pub k1: Real,
    pub k2: Real,
    pub p1: Real,
    pub p2: Real,
    pub k3: Real,
}

/// Fixed-point iterations for the inverse mapping.
const UNDISTORT_ITERS: usize = 8;

impl RadialTangential {
    /// Distortion-free model.
    pub fn none() -> Self {
        Self::default()
    }

    fn apply(&self, x: Real, y: Real) -> (Real, Real) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r4 * r2;

        let xy = x * y;
        let x_tan = 2.0 * self.p1 * xy + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * xy;

        (x * radial + x_tan, y * radial + y_tan)
    }

    /// Apply distortion to an undistorted normalized point.
    pub fn distort(&self, n: &Vec2) -> Vec2 {
        let (x, y) = self.apply(n.x, n.y);
        Vec2::new(x, y)
    }

    /// Remove distortion from a distorted normalized point.
    pub fn undistort(&self, n: &Vec2) -> Vec2 {
        let mut x = n.x;
        let mut y = n.y;
        for _ in 0..UNDISTORT_ITERS {
            let (xd, yd) = self.apply(x, y);
            x -= xd - n.x;
            y -= yd - n.y;
        }
        Vec2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coefficients_are_identity() {
        let dist = RadialTangential::none();
        let n = Vec2::new(0.2, -0.1);
        assert_eq!(dist.distort(&n), n);
        assert_eq!(dist.undistort(&n), n);
    }

    #[test]
    fn distort_undistort_roundtrip() {
        let dist = RadialTangential {
            k1: -0.28,
            k2: 0.08,
            p1: 0.001,
            p2: -0.0005,
            k3: 0.0,
        };

        let n = Vec2::new(-0.15, 0.08);
        let back = dist.undistort(&dist.distort(&n));
        assert!((back - n).norm() < 1e-8, "roundtrip error: {}", (back - n).norm());
    }
}
