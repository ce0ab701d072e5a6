//! Synthetic multi-camera rig generators.
//!
//! These helpers project a [`TargetModel`] into a rig of cameras with known
//! poses, producing the [`Capture`] records the pipeline consumes. Used by
//! tests and the examples; not part of the estimation path.

use nalgebra::{Translation3, UnitQuaternion};

use crate::{Capture, CameraIntrinsics, CornerObservation, Detection, Iso3, Real, TargetModel, Vec3};

/// Project the target into one camera, keeping only projectable corners.
///
/// `cam_from_target` maps target-frame points into the camera frame. Corners
/// behind the camera are silently skipped, mimicking a detector that simply
/// does not report them.
pub fn project_target(
    intrinsics: &CameraIntrinsics,
    cam_from_target: &Iso3,
    target: &TargetModel,
) -> Detection {
    let mut detection = Detection::default();
    for (id, point) in target.points().iter().enumerate() {
        if let Some(pixel) = intrinsics.project(cam_from_target, point) {
            detection
                .corners
                .push(CornerObservation { corner: id, pixel });
        }
    }
    detection
}

/// Generate one capture per target placement for a static rig.
///
/// `cam_from_world[i]` is the fixed pose of camera `i`; `world_from_target`
/// holds one board placement per capture.
pub fn rig_captures(
    cameras: &[CameraIntrinsics],
    cam_from_world: &[Iso3],
    world_from_target: &[Iso3],
    target: &TargetModel,
) -> Vec<Capture> {
    world_from_target
        .iter()
        .map(|board| {
            let detections = cameras
                .iter()
                .zip(cam_from_world)
                .map(|(intr, cam)| project_target(intr, &(cam * board), target))
                .collect();
            Capture::new(detections)
        })
        .collect()
}

/// Board placements sweeping yaw around +Y with a Z ramp, keeping the target
/// in front of the rig.
pub fn board_sweep(n: usize, yaw_step_rad: Real, z_start: Real, z_step: Real) -> Vec<Iso3> {
    (0..n)
        .map(|i| {
            let yaw = yaw_step_rad * i as Real;
            let rotation = UnitQuaternion::from_scaled_axis(Vec3::new(0.0, yaw, 0.0));
            let translation = Translation3::new(0.0, 0.0, z_start + z_step * i as Real);
            Iso3::from_parts(translation, rotation)
        })
        .collect()
}
