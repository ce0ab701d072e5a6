//! Joint multi-camera pose solve.
//!
//! The reference camera's frame is the world frame. A stereo calibration of
//! the reference pair anchors the metric scale; the shared points are then
//! triangulated through that pair and every camera's pose is recovered by
//! PnP against the triangulated cloud. All image measurements are moved into
//! each camera's rectified (undistorted, alpha = 1) pixel frame first, and
//! the same rectified matrices are used for every projection thereafter.

use log::{info, warn};

use mvpose_core::{Iso3, Mat3, Pt2, Real};
use mvpose_linear::{
    calibrate_stereo_fixed_intrinsics, projection_matrix, solve_pnp, triangulate_pair, StereoView,
    MIN_PNP_POINTS,
};

use crate::correspondence::{FilteredCorrespondences, MIN_SHARED_CORNERS};
use crate::error::{PoseError, Result};
use crate::session::RigCamera;

/// RMS stereo residual (pixels) above which the run is flagged low
/// confidence.
pub const MAX_STEREO_REPROJ_ERROR: Real = 1.0;

/// Raw output of a solve, camera order matching the input list.
#[derive(Debug, Clone)]
pub(crate) struct SolveOutput {
    /// World-to-camera transforms; the reference camera's solve lands near
    /// the identity.
    pub poses: Vec<Iso3>,
    pub reprojection_error: Real,
    pub low_confidence: bool,
}

fn rectified_matrices(cameras: &[RigCamera]) -> Result<Vec<Mat3>> {
    cameras
        .iter()
        .map(|c| c.intrinsics.optimal_k().map_err(PoseError::from))
        .collect()
}

/// Rectified pixels of one camera, concatenated capture-major to align with
/// [`FilteredCorrespondences::object_points_flat`].
fn rectified_points_flat(
    camera: &RigCamera,
    rect_k: &Mat3,
    filtered: &FilteredCorrespondences,
    index: usize,
) -> Result<Vec<Pt2>> {
    let flat = filtered.image_points_flat(index);
    camera
        .intrinsics
        .undistort_points(&flat, rect_k)
        .map_err(PoseError::from)
}

/// Solve every camera's pose from simultaneously shared points.
pub(crate) fn solve_common(
    cameras: &[RigCamera],
    reference: usize,
    filtered: &FilteredCorrespondences,
) -> Result<SolveOutput> {
    if filtered.is_empty() {
        return Err(PoseError::NoUsableCaptures {
            min: MIN_SHARED_CORNERS,
        });
    }

    let rect_k = rectified_matrices(cameras)?;

    let secondary = (0..cameras.len())
        .find(|&i| i != reference)
        .ok_or(PoseError::TooFewCameras {
            got: cameras.len(),
        })?;

    // Stereo anchor: reference paired with the first other camera.
    let mut views = Vec::with_capacity(filtered.len());
    for capture in &filtered.captures {
        let image_a = cameras[reference]
            .intrinsics
            .undistort_points(&capture.image_points[reference], &rect_k[reference])?;
        let image_b = cameras[secondary]
            .intrinsics
            .undistort_points(&capture.image_points[secondary], &rect_k[secondary])?;
        views.push(StereoView {
            object_points: capture.object_points.clone(),
            image_a,
            image_b,
        });
    }

    let stereo = calibrate_stereo_fixed_intrinsics(&views, &rect_k[reference], &rect_k[secondary])?;
    let low_confidence = stereo.reprojection_error > MAX_STEREO_REPROJ_ERROR;
    if low_confidence {
        warn!(
            "stereo anchor residual {:.3} px exceeds {MAX_STEREO_REPROJ_ERROR} px, result flagged low confidence",
            stereo.reprojection_error
        );
    } else {
        info!(
            "stereo anchor ({} <-> {}): residual {:.4} px over {} captures",
            cameras[reference].serial,
            cameras[secondary].serial,
            stereo.reprojection_error,
            filtered.len()
        );
    }

    // Triangulate the shared points in the reference camera's frame.
    let p_ref = projection_matrix(&rect_k[reference], &Iso3::identity());
    let p_sec = projection_matrix(&rect_k[secondary], &stereo.a_to_b);

    let ref_flat = rectified_points_flat(&cameras[reference], &rect_k[reference], filtered, reference)?;
    let sec_flat = rectified_points_flat(&cameras[secondary], &rect_k[secondary], filtered, secondary)?;
    let cloud = triangulate_pair(&p_ref, &p_sec, &ref_flat, &sec_flat)?;

    if cloud.len() < MIN_PNP_POINTS {
        return Err(PoseError::InsufficientPoints {
            camera: reference,
            got: cloud.len(),
            needed: MIN_PNP_POINTS,
        });
    }

    // Every camera is solved against the cloud, the reference included: its
    // solve, against points expressed in its own frame, must land on the
    // identity, which cross-checks the triangulation.
    let mut poses = Vec::with_capacity(cameras.len());
    for (index, camera) in cameras.iter().enumerate() {
        let pixels = rectified_points_flat(camera, &rect_k[index], filtered, index)?;
        if pixels.len() < MIN_PNP_POINTS {
            return Err(PoseError::InsufficientPoints {
                camera: index,
                got: pixels.len(),
                needed: MIN_PNP_POINTS,
            });
        }
        poses.push(solve_pnp(&cloud, &pixels, &rect_k[index])?);
    }

    Ok(SolveOutput {
        poses,
        reprojection_error: stereo.reprojection_error,
        low_confidence,
    })
}
