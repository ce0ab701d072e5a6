//! Two-view linear triangulation.
//!
//! DLT formulation on camera projection matrices and undistorted pixel
//! coordinates. Each point yields a 4x4 homogeneous system whose null space
//! (up to scale) is the homogeneous 3D point.

use anyhow::Result;
use mvpose_core::{Iso3, Mat3, Mat34, Mat4, Pt2, Pt3, Real};

/// Camera projection matrix `P = K [R | t]` for a world-to-camera pose.
pub fn projection_matrix(k: &Mat3, world_to_cam: &Iso3) -> Mat34 {
    let r = world_to_cam.rotation.to_rotation_matrix();
    let t = world_to_cam.translation.vector;

    let mut p = Mat34::zeros();
    p.fixed_view_mut::<3, 3>(0, 0).copy_from(&(k * r.matrix()));
    p.set_column(3, &(k * t));
    p
}

/// Triangulate matched undistorted points from two views into Euclidean 3D.
///
/// `pts_a[i]` and `pts_b[i]` must observe the same world point; the result
/// preserves that indexing. The homogeneous solution is normalized by its
/// fourth coordinate; a vanishing fourth coordinate (point at infinity,
/// typically from a degenerate baseline) is an error.
pub fn triangulate_pair(
    p_a: &Mat34,
    p_b: &Mat34,
    pts_a: &[Pt2],
    pts_b: &[Pt2],
) -> Result<Vec<Pt3>> {
    anyhow::ensure!(
        pts_a.len() == pts_b.len(),
        "mismatched point counts: {} vs {}",
        pts_a.len(),
        pts_b.len()
    );

    let mut points = Vec::with_capacity(pts_a.len());
    for (idx, (a, b)) in pts_a.iter().zip(pts_b.iter()).enumerate() {
        let mut sys = Mat4::zeros();
        sys.row_mut(0).copy_from(&(p_a.row(2) * a.x - p_a.row(0)));
        sys.row_mut(1).copy_from(&(p_a.row(2) * a.y - p_a.row(1)));
        sys.row_mut(2).copy_from(&(p_b.row(2) * b.x - p_b.row(0)));
        sys.row_mut(3).copy_from(&(p_b.row(2) * b.y - p_b.row(1)));

        let svd = sys.svd(true, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| anyhow::anyhow!("svd failed triangulating point {idx}"))?;
        let x = v_t.row(3);

        let w = x[3];
        anyhow::ensure!(
            w.abs() > Real::EPSILON,
            "triangulated point {idx} is at infinity"
        );
        points.push(Pt3::new(x[0] / w, x[1] / w, x[2] / w));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mvpose_core::Vec3;
    use nalgebra::{Translation3, UnitQuaternion, Vector4};

    fn project(p: &Mat34, x: &Pt3) -> Pt2 {
        let v = p * Vector4::new(x.x, x.y, x.z, 1.0);
        Pt2::new(v.x / v.z, v.y / v.z)
    }

    #[test]
    fn recovers_points_from_two_views() {
        let k = Mat3::new(700.0, 0.0, 320.0, 0.0, 700.0, 240.0, 0.0, 0.0, 1.0);
        let p_a = projection_matrix(&k, &Iso3::identity());
        let pose_b = Iso3::from_parts(
            Translation3::new(-0.3, 0.0, 0.02),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.0, 0.05, 0.0)),
        );
        let p_b = projection_matrix(&k, &pose_b);

        let cloud = [
            Pt3::new(0.1, -0.05, 2.0),
            Pt3::new(-0.2, 0.1, 1.5),
            Pt3::new(0.0, 0.0, 3.0),
        ];

        let pts_a: Vec<Pt2> = cloud.iter().map(|x| project(&p_a, x)).collect();
        let pts_b: Vec<Pt2> = cloud.iter().map(|x| project(&p_b, x)).collect();

        let est = triangulate_pair(&p_a, &p_b, &pts_a, &pts_b).unwrap();
        for (e, gt) in est.iter().zip(&cloud) {
            assert_relative_eq!(*e, *gt, epsilon = 1e-6);
        }
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let p = projection_matrix(&Mat3::identity(), &Iso3::identity());
        let a = vec![Pt2::new(0.0, 0.0)];
        assert!(triangulate_pair(&p, &p, &a, &[]).is_err());
    }

    #[test]
    fn identity_projection_matrix_layout() {
        let k = Mat3::new(2.0, 0.0, 1.0, 0.0, 3.0, 2.0, 0.0, 0.0, 1.0);
        let p = projection_matrix(&k, &Iso3::identity());
        assert_eq!(p.fixed_view::<3, 3>(0, 0).into_owned(), k);
        assert_eq!(p.column(3).into_owned(), Vec3::zeros());
    }
}
