//! Two-view extrinsic calibration with fixed intrinsics.
//!
//! Per view, board poses are recovered by PnP for both cameras; each view
//! contributes a relative-pose candidate `T_b * T_a^{-1}` and the candidates
//! are averaged on SE(3). Intrinsics are never re-estimated.

use anyhow::Result;
use mvpose_core::{from_homogeneous, Iso3, Mat3, Pt2, Pt3, Real, Vec3};
use nalgebra::{Quaternion, Translation3, UnitQuaternion, Vector4};

use crate::{projection_matrix, solve_pnp};

/// Matched correspondences of one view: board points plus both cameras'
/// undistorted pixel observations, in identical per-point order.
#[derive(Debug, Clone)]
pub struct StereoView {
    pub object_points: Vec<Pt3>,
    pub image_a: Vec<Pt2>,
    pub image_b: Vec<Pt2>,
}

/// Relative extrinsics of camera B with respect to camera A.
#[derive(Debug, Clone)]
pub struct StereoCalibration {
    /// Transform from camera A's frame into camera B's frame.
    pub a_to_b: Iso3,
    /// RMS reprojection error over both cameras, in pixels.
    pub reprojection_error: Real,
}

/// SE(3) averaging: arithmetic mean of translations, quaternion mean with
/// hemisphere correction for rotations. Initialization quality only; not a
/// substitute for refinement.
fn average_isometries(poses: &[Iso3]) -> Result<Iso3> {
    anyhow::ensure!(!poses.is_empty(), "cannot average an empty set of poses");
    let n = poses.len() as Real;

    let translation = poses.iter().map(|p| p.translation.vector).sum::<Vec3>() / n;

    let pivot = poses[0].rotation.coords;
    let mut acc = Vector4::<Real>::zeros();
    for pose in poses {
        let coords = pose.rotation.coords;
        acc += if pivot.dot(&coords) < 0.0 {
            -coords
        } else {
            coords
        };
    }

    let rotation = if acc.norm_squared() <= Real::EPSILON {
        UnitQuaternion::identity()
    } else {
        UnitQuaternion::from_quaternion(Quaternion::from_vector(acc / n))
    };

    Ok(Iso3::from_parts(Translation3::from(translation), rotation))
}

/// Calibrate the relative pose of camera B against camera A from shared
/// board observations, holding both camera matrices fixed.
///
/// Every view must carry at least [`crate::MIN_PNP_POINTS`] matched points;
/// the caller is responsible for filtering degenerate views beforehand.
pub fn calibrate_stereo_fixed_intrinsics(
    views: &[StereoView],
    k_a: &Mat3,
    k_b: &Mat3,
) -> Result<StereoCalibration> {
    anyhow::ensure!(!views.is_empty(), "stereo calibration needs at least one view");

    let mut board_poses_a = Vec::with_capacity(views.len());
    let mut candidates = Vec::with_capacity(views.len());

    for (idx, view) in views.iter().enumerate() {
        anyhow::ensure!(
            view.object_points.len() == view.image_a.len()
                && view.object_points.len() == view.image_b.len(),
            "view {idx}: mismatched correspondence counts"
        );

        let pose_a = solve_pnp(&view.object_points, &view.image_a, k_a)?;
        let pose_b = solve_pnp(&view.object_points, &view.image_b, k_b)?;

        candidates.push(pose_b * pose_a.inverse());
        board_poses_a.push(pose_a);
    }

    let a_to_b = average_isometries(&candidates)?;

    // Residual of the averaged relative pose: reproject the board through
    // camera A's per-view pose and through the composed pose for camera B.
    let mut sq_sum = 0.0;
    let mut count = 0usize;
    for (view, pose_a) in views.iter().zip(&board_poses_a) {
        let p_a = projection_matrix(k_a, pose_a);
        let p_b = projection_matrix(k_b, &(a_to_b * pose_a));

        for ((obj, img_a), img_b) in view
            .object_points
            .iter()
            .zip(&view.image_a)
            .zip(&view.image_b)
        {
            let h = Vector4::new(obj.x, obj.y, obj.z, 1.0);

            sq_sum += (from_homogeneous(&(p_a * h)) - img_a).norm_squared();
            sq_sum += (from_homogeneous(&(p_b * h)) - img_b).norm_squared();
            count += 2;
        }
    }

    let reprojection_error = (sq_sum / count as Real).sqrt();
    Ok(StereoCalibration {
        a_to_b,
        reprojection_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Translation3;

    fn project(k: &Mat3, pose: &Iso3, p: &Pt3) -> Pt2 {
        let pc = pose.transform_point(p);
        let v = k * Vec3::new(pc.x / pc.z, pc.y / pc.z, 1.0);
        Pt2::new(v.x / v.z, v.y / v.z)
    }

    fn board() -> Vec<Pt3> {
        let mut pts = Vec::new();
        for row in 0..3 {
            for col in 0..4 {
                pts.push(Pt3::new(col as Real * 0.05, row as Real * 0.05, 0.0));
            }
        }
        pts
    }

    #[test]
    fn recovers_relative_pose() {
        let k_a = Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 360.0, 0.0, 0.0, 1.0);
        let k_b = Mat3::new(750.0, 0.0, 620.0, 0.0, 760.0, 350.0, 0.0, 0.0, 1.0);

        let a_to_b_gt = Iso3::from_parts(
            Translation3::new(0.25, -0.02, 0.05),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.02, -0.15, 0.01)),
        );

        let board = board();
        let mut views = Vec::new();
        for i in 0..4 {
            let pose_a = Iso3::from_parts(
                Translation3::new(-0.08, -0.06, 0.8 + 0.1 * i as Real),
                UnitQuaternion::from_scaled_axis(Vec3::new(0.0, 0.05 * i as Real, 0.0)),
            );
            let pose_b = a_to_b_gt * pose_a;

            views.push(StereoView {
                image_a: board.iter().map(|p| project(&k_a, &pose_a, p)).collect(),
                image_b: board.iter().map(|p| project(&k_b, &pose_b, p)).collect(),
                object_points: board.clone(),
            });
        }

        let calib = calibrate_stereo_fixed_intrinsics(&views, &k_a, &k_b).unwrap();

        let dt = (calib.a_to_b.translation.vector - a_to_b_gt.translation.vector).norm();
        let dr = calib.a_to_b.rotation.angle_to(&a_to_b_gt.rotation);
        assert!(dt < 1e-4, "translation error too large: {dt}");
        assert!(dr < 1e-4, "rotation error too large: {dr}");
        assert!(
            calib.reprojection_error < 1e-3,
            "reprojection error too large: {}",
            calib.reprojection_error
        );
    }

    #[test]
    fn averaging_single_pose_is_identity_operation() {
        let pose = Iso3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.1, 0.2, 0.3)),
        );
        let avg = average_isometries(&[pose]).unwrap();
        assert!((avg.translation.vector - pose.translation.vector).norm() < 1e-12);
        assert!(avg.rotation.angle_to(&pose.rotation) < 1e-12);
    }

    #[test]
    fn rejects_empty_view_list() {
        assert!(calibrate_stereo_fixed_intrinsics(&[], &Mat3::identity(), &Mat3::identity()).is_err());
    }
}
