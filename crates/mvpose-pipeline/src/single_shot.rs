//! One-shot per-camera pose estimation.
//!
//! Each camera's pose is solved independently by PnP against the board
//! geometry from a single frame in which the board is visible to all
//! cameras. The board frame is the world frame; no relative-pose averaging
//! or triangulation is involved, so there is no cross-camera residual to
//! report. Intended as a quick fallback or sanity check, not a replacement
//! for the joint solve.

use log::info;

use mvpose_core::{Capture, Pt2, Pt3, TargetModel};
use mvpose_linear::{solve_pnp, MIN_PNP_POINTS};

use crate::error::{PoseError, Result};
use crate::result::{CameraPose, PoseEstimate, PoseEstimationResult};
use crate::session::RigCamera;
use crate::strategy::PoseStrategy;

/// Estimate every camera's board-relative pose from one capture.
pub fn estimate_single_shot(
    cameras: &[RigCamera],
    capture: &Capture,
    target: &TargetModel,
) -> Result<PoseEstimationResult> {
    if capture.num_cameras() != cameras.len() {
        return Err(PoseError::UnsyncedCaptures {
            capture: 0,
            expected: cameras.len(),
            got: capture.num_cameras(),
        });
    }

    let mut poses = Vec::with_capacity(cameras.len());
    for (index, (camera, detection)) in cameras.iter().zip(&capture.detections).enumerate() {
        let mut object_points: Vec<Pt3> = Vec::with_capacity(detection.len());
        let mut pixels: Vec<Pt2> = Vec::with_capacity(detection.len());
        for obs in &detection.corners {
            let point = obs_point(target, obs.corner, index)?;
            object_points.push(point);
            pixels.push(obs.pixel);
        }

        if object_points.len() < MIN_PNP_POINTS {
            return Err(PoseError::InsufficientPoints {
                camera: index,
                got: object_points.len(),
                needed: MIN_PNP_POINTS,
            });
        }

        let rect_k = camera.intrinsics.optimal_k()?;
        let rectified = camera.intrinsics.undistort_points(&pixels, &rect_k)?;
        let pose = solve_pnp(&object_points, &rectified, &rect_k)?;
        info!(
            "single shot, camera {}: {} corners",
            camera.serial,
            object_points.len()
        );
        poses.push(CameraPose {
            serial: camera.serial.clone(),
            pose: PoseEstimate::from_iso(&pose),
        });
    }

    Ok(PoseEstimationResult {
        cameras: poses,
        strategy: PoseStrategy::SingleShot,
        reprojection_error: None,
        low_confidence: false,
    })
}

fn obs_point(target: &TargetModel, corner: usize, camera: usize) -> Result<Pt3> {
    target.point(corner).ok_or(PoseError::UnknownCorner {
        capture: 0,
        camera,
        corner,
        num_corners: target.len(),
    })
}
