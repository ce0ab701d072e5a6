//! Perspective-n-point pose recovery.
//!
//! Normalized DLT solve: 3D points are centered and scaled, pixels are
//! mapped through K^{-1}, the 2n x 12 homogeneous system is solved by SVD
//! and the rotation block is projected onto SO(3).

use anyhow::Result;
use mvpose_core::{from_homogeneous, to_homogeneous, Mat3, Mat34, Mat4, Pt2, Pt3, Real, Vec3};
use nalgebra::{DMatrix, Isometry3, Rotation3, Translation3, UnitQuaternion};

/// Minimum correspondences for the DLT solve.
pub const MIN_PNP_POINTS: usize = 6;

struct WorldNormalization {
    centroid: Vec3,
    scale: Real,
    denorm: Mat4,
}

fn normalize_world(world: &[Pt3]) -> Result<WorldNormalization> {
    let n = world.len() as Real;
    let centroid = world.iter().map(|p| p.coords).sum::<Vec3>() / n;

    let mean_dist = world
        .iter()
        .map(|p| (p.coords - centroid).norm())
        .sum::<Real>()
        / n;
    if mean_dist <= Real::EPSILON {
        anyhow::bail!("degenerate 3d point configuration for normalization");
    }
    let scale = (3.0_f64).sqrt() / mean_dist;

    #[rustfmt::skip]
    let denorm = Mat4::new(
        scale, 0.0, 0.0, -scale * centroid.x,
        0.0, scale, 0.0, -scale * centroid.y,
        0.0, 0.0, scale, -scale * centroid.z,
        0.0, 0.0, 0.0, 1.0,
    );

    Ok(WorldNormalization {
        centroid,
        scale,
        denorm,
    })
}

/// Solve PnP for a camera pose `T_C_W` from 3D world points and their
/// undistorted pixel projections.
///
/// Fails when fewer than [`MIN_PNP_POINTS`] correspondences are supplied or
/// when the point configuration is degenerate.
pub fn solve_pnp(world: &[Pt3], image: &[Pt2], k: &Mat3) -> Result<Isometry3<Real>> {
    let n = world.len();
    anyhow::ensure!(
        n >= MIN_PNP_POINTS && image.len() == n,
        "PnP needs at least {} matched correspondences, got {} / {}",
        MIN_PNP_POINTS,
        n,
        image.len()
    );

    let k_inv = k
        .try_inverse()
        .ok_or_else(|| anyhow::anyhow!("camera matrix is not invertible"))?;
    let norm = normalize_world(world)?;

    // 2n x 12 system for the camera matrix P, rows built from normalized
    // world and image coordinates.
    let mut a = DMatrix::<Real>::zeros(2 * n, 12);
    for (i, (pw, px)) in world.iter().zip(image.iter()).enumerate() {
        let w = (pw.coords - norm.centroid) * norm.scale;

        let ray = from_homogeneous(&(k_inv * to_homogeneous(px)));
        let u = ray.x;
        let v = ray.y;

        let rx = 2 * i;
        let ry = rx + 1;

        a[(rx, 0)] = w.x;
        a[(rx, 1)] = w.y;
        a[(rx, 2)] = w.z;
        a[(rx, 3)] = 1.0;
        a[(rx, 8)] = -u * w.x;
        a[(rx, 9)] = -u * w.y;
        a[(rx, 10)] = -u * w.z;
        a[(rx, 11)] = -u;

        a[(ry, 4)] = w.x;
        a[(ry, 5)] = w.y;
        a[(ry, 6)] = w.z;
        a[(ry, 7)] = 1.0;
        a[(ry, 8)] = -v * w.x;
        a[(ry, 9)] = -v * w.y;
        a[(ry, 10)] = -v * w.z;
        a[(ry, 11)] = -v;
    }

    let svd = a.svd(true, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| anyhow::anyhow!("svd failed in PnP"))?;
    let null_row: Vec<Real> = v_t.row(v_t.nrows() - 1).iter().copied().collect();
    let p_norm = Mat34::from_row_slice(&null_row);

    // Undo the 3D normalization: P = P_norm * T_world.
    let p = p_norm * norm.denorm;

    let m = p.fixed_view::<3, 3>(0, 0).into_owned();
    let mut sign_scale = (m.row(0).norm() + m.row(1).norm() + m.row(2).norm()) / 3.0;
    if m.determinant() < 0.0 {
        sign_scale = -sign_scale;
    }
    anyhow::ensure!(sign_scale.abs() > 0.0, "rank-deficient PnP solution");

    let rotation = orthogonalize(&(m / sign_scale))?;
    let translation = p.column(3).into_owned() / sign_scale;

    Ok(Isometry3::from_parts(
        Translation3::from(translation),
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation)),
    ))
}

/// Project an approximate rotation onto SO(3) via SVD.
fn orthogonalize(m: &Mat3) -> Result<Mat3> {
    let svd = m.svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| anyhow::anyhow!("svd failed while projecting onto SO(3)"))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| anyhow::anyhow!("svd failed while projecting onto SO(3)"))?;

    let r = u * v_t;
    if r.determinant() >= 0.0 {
        return Ok(r);
    }
    let mut u_flipped = u;
    u_flipped.column_mut(2).neg_mut();
    Ok(u_flipped * v_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvpose_core::Iso3;

    fn project(k: &Mat3, pose: &Iso3, p: &Pt3) -> Pt2 {
        let pc = pose.transform_point(p);
        let v = k * Vec3::new(pc.x / pc.z, pc.y / pc.z, 1.0);
        Pt2::new(v.x / v.z, v.y / v.z)
    }

    fn pose_error(a: &Iso3, b: &Iso3) -> (Real, Real) {
        let dt = (a.translation.vector - b.translation.vector).norm();
        let r_diff = a.rotation.to_rotation_matrix().transpose() * b.rotation.to_rotation_matrix();
        let cos_theta = ((r_diff.matrix().trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
        (dt, cos_theta.acos())
    }

    #[test]
    fn recovers_synthetic_pose() {
        let k = Mat3::new(800.0, 0.0, 640.0, 0.0, 780.0, 360.0, 0.0, 0.0, 1.0);
        let gt = Iso3::from_parts(
            Translation3::new(0.1, -0.05, 1.2),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.1, -0.05, 0.2)),
        );

        let mut world = Vec::new();
        let mut image = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    let pw = Pt3::new(x as Real * 0.1, y as Real * 0.1, 0.4 + z as Real * 0.1);
                    image.push(project(&k, &gt, &pw));
                    world.push(pw);
                }
            }
        }

        let est = solve_pnp(&world, &image, &k).unwrap();
        let (dt, dr) = pose_error(&est, &gt);
        assert!(dt < 1e-3, "translation error too large: {dt}");
        assert!(dr < 1e-3, "rotation error too large: {dr}");
    }

    #[test]
    fn rejects_too_few_points() {
        let k = Mat3::identity();
        let world: Vec<Pt3> = (0..5).map(|i| Pt3::new(i as Real, 0.0, 1.0)).collect();
        let image: Vec<Pt2> = (0..5).map(|i| Pt2::new(i as Real, 0.0)).collect();
        assert!(solve_pnp(&world, &image, &k).is_err());
    }

    #[test]
    fn rejects_degenerate_world_points() {
        let k = Mat3::identity();
        let world = vec![Pt3::new(0.5, 0.5, 1.0); 8];
        let image = vec![Pt2::new(0.5, 0.5); 8];
        assert!(solve_pnp(&world, &image, &k).is_err());
    }
}
