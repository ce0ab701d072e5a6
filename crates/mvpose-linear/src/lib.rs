//! Linear (closed-form) solvers for multi-camera pose estimation.
//!
//! All solvers operate on undistorted pixel coordinates; lens distortion is
//! removed upstream by `mvpose_core::CameraIntrinsics`. Poses are returned
//! as `T_C_W` transforms (world coordinates into the camera frame).

mod pnp;
mod stereo;
mod triangulation;

pub use pnp::{solve_pnp, MIN_PNP_POINTS};
pub use stereo::{calibrate_stereo_fixed_intrinsics, StereoCalibration, StereoView};
pub use triangulation::{projection_matrix, triangulate_pair};
