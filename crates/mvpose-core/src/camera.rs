//! Per-camera intrinsic calibration.
//!
//! The pose pipeline treats intrinsics as fixed: they are estimated by an
//! external calibration step and held read-only for the duration of a run.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    from_homogeneous, to_homogeneous, Iso3, Mat3, Pt2, Pt3, RadialTangential, Real, Vec2, Vec3,
};

/// Image extent in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Intrinsic calibration of one camera: camera matrix, lens distortion and
/// image extent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// 3x3 camera matrix K.
    pub k: Mat3,
    /// Brown-Conrady distortion coefficients.
    pub distortion: RadialTangential,
    /// Sensor extent in pixels.
    pub image_size: ImageSize,
}

/// Samples per image border edge when fitting the rectified camera matrix.
const BORDER_SAMPLES: usize = 16;

impl CameraIntrinsics {
    pub fn new(k: Mat3, distortion: RadialTangential, image_size: ImageSize) -> Self {
        Self {
            k,
            distortion,
            image_size,
        }
    }

    /// Undistort pixel points and re-project them with `target_k`.
    ///
    /// Output preserves the cardinality and ordering of the input. Passing
    /// `self.k` as `target_k` undistorts in place within the native pixel
    /// frame; passing [`CameraIntrinsics::optimal_k`] moves the points into
    /// the rectified frame.
    pub fn undistort_points(&self, points: &[Pt2], target_k: &Mat3) -> Result<Vec<Pt2>> {
        let k_inv = self
            .k
            .try_inverse()
            .ok_or_else(|| anyhow::anyhow!("camera matrix is not invertible"))?;

        let mut out = Vec::with_capacity(points.len());
        for p in points {
            let n = k_inv * to_homogeneous(p);
            let n = Vec2::new(n.x / n.z, n.y / n.z);
            let u = self.distortion.undistort(&n);
            out.push(from_homogeneous(&(target_k * Vec3::new(u.x, u.y, 1.0))));
        }
        Ok(out)
    }

    /// Camera matrix rectifying the full undistorted image extent.
    ///
    /// The image border is undistorted into normalized coordinates and a new
    /// matrix is fitted so the bounding box of the border maps onto the full
    /// image (all source pixels retained, the equivalent of an alpha = 1
    /// optimal matrix). For zero distortion the result equals `self.k`.
    pub fn optimal_k(&self) -> Result<Mat3> {
        let k_inv = self
            .k
            .try_inverse()
            .ok_or_else(|| anyhow::anyhow!("camera matrix is not invertible"))?;

        let w = self.image_size.width as Real;
        let h = self.image_size.height as Real;

        let mut x_min = Real::INFINITY;
        let mut x_max = Real::NEG_INFINITY;
        let mut y_min = Real::INFINITY;
        let mut y_max = Real::NEG_INFINITY;

        let mut visit = |px: Real, py: Real| {
            let n = k_inv * Vec3::new(px, py, 1.0);
            let n = Vec2::new(n.x / n.z, n.y / n.z);
            let u = self.distortion.undistort(&n);
            x_min = x_min.min(u.x);
            x_max = x_max.max(u.x);
            y_min = y_min.min(u.y);
            y_max = y_max.max(u.y);
        };

        for i in 0..=BORDER_SAMPLES {
            let s = i as Real / BORDER_SAMPLES as Real;
            visit(s * w, 0.0);
            visit(s * w, h);
            visit(0.0, s * h);
            visit(w, s * h);
        }

        let span_x = x_max - x_min;
        let span_y = y_max - y_min;
        if span_x <= Real::EPSILON || span_y <= Real::EPSILON {
            anyhow::bail!("degenerate image extent while fitting rectified camera matrix");
        }

        let fx = w / span_x;
        let fy = h / span_y;
        Ok(Mat3::new(
            fx,
            0.0,
            -fx * x_min,
            0.0,
            fy,
            -fy * y_min,
            0.0,
            0.0,
            1.0,
        ))
    }

    /// Project a world point through `world_to_cam`, distortion included.
    ///
    /// Returns `None` for points at or behind the camera plane.
    pub fn project(&self, world_to_cam: &Iso3, p: &Pt3) -> Option<Pt2> {
        let pc = world_to_cam.transform_point(p);
        if pc.z <= 0.0 {
            return None;
        }
        let n = Vec2::new(pc.x / pc.z, pc.y / pc.z);
        let d = self.distortion.distort(&n);
        Some(from_homogeneous(&(self.k * Vec3::new(d.x, d.y, 1.0))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Translation3;

    fn intrinsics(dist: RadialTangential) -> CameraIntrinsics {
        let k = Mat3::new(800.0, 0.0, 640.0, 0.0, 780.0, 360.0, 0.0, 0.0, 1.0);
        CameraIntrinsics::new(
            k,
            dist,
            ImageSize {
                width: 1280,
                height: 720,
            },
        )
    }

    #[test]
    fn undistort_is_identity_without_distortion() {
        let cam = intrinsics(RadialTangential::none());
        let points = vec![Pt2::new(700.0, 400.0), Pt2::new(10.0, 10.0)];

        let out = cam.undistort_points(&points, &cam.k).unwrap();

        assert_eq!(out.len(), points.len());
        for (o, p) in out.iter().zip(&points) {
            assert!((o - p).norm() < 1e-9);
        }
    }

    #[test]
    fn optimal_k_equals_k_without_distortion() {
        let cam = intrinsics(RadialTangential::none());
        let opt = cam.optimal_k().unwrap();
        assert!((opt - cam.k).norm() < 1e-6, "optimal K drifted: {opt}");
    }

    #[test]
    fn undistort_into_rectified_frame_removes_distortion() {
        let dist = RadialTangential {
            k1: -0.25,
            k2: 0.07,
            p1: 0.0,
            p2: 0.0,
            k3: 0.0,
        };
        let cam = intrinsics(dist);
        let rect = cam.optimal_k().unwrap();

        // A projected point, undistorted into the rectified frame, must land
        // where a distortion-free camera with the rectified matrix puts it.
        let pose = Iso3::from_parts(Translation3::new(0.0, 0.0, 2.0), Default::default());
        let world = Pt3::new(0.2, -0.1, 0.0);
        let observed = cam.project(&pose, &world).unwrap();

        let rectified = cam.undistort_points(&[observed], &rect).unwrap()[0];

        let ideal = CameraIntrinsics::new(rect, RadialTangential::none(), cam.image_size)
            .project(&pose, &world)
            .unwrap();
        assert!(
            (rectified - ideal).norm() < 1e-6,
            "rectified point off by {}",
            (rectified - ideal).norm()
        );
    }

    #[test]
    fn project_rejects_points_behind_camera() {
        let cam = intrinsics(RadialTangential::none());
        let pose = Iso3::identity();
        assert!(cam.project(&pose, &Pt3::new(0.0, 0.0, -1.0)).is_none());
    }
}
