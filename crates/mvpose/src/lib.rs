//! High-level entry crate for the `mvpose-rs` toolbox.
//!
//! Given fixed per-camera intrinsics and synchronized detections of a
//! calibration target, `mvpose` recovers each camera's extrinsic pose
//! relative to a chosen reference camera.
//!
//! ## Session API
//!
//! ```no_run
//! use mvpose::pipeline::{PoseSession, RigCamera};
//! use mvpose::core::{Capture, TargetModel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cameras: Vec<RigCamera> = /* load intrinsic calibrations */
//! # vec![];
//! let captures: Vec<Capture> = /* load synchronized detections */
//! # vec![];
//! let target = TargetModel::charuco(8, 6, 0.04);
//!
//! let mut session = PoseSession::new(cameras, target, 0)?;
//! session.load_captures(captures)?;
//!
//! let strategy = session.filter()?;
//! println!("strategy: {strategy}");
//!
//! let result = session.solve()?;
//! result.save_json("poses.json".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## One-call API
//!
//! [`pipeline::estimate_rig_poses`] runs filtering, strategy selection and
//! the solve in a single call; [`pipeline::estimate_single_shot`] solves
//! each camera independently against the board from one frame.
//!
//! ## Module Organization
//!
//! - **[`pipeline`]**: correspondence filtering, strategy selection, the
//!   rig solver and the session driving them
//! - **[`core`]**: math types, intrinsics, targets, capture records
//! - **[`linear`]**: closed-form PnP, triangulation and stereo solvers
//! - **[`prelude`]**: convenient re-exports for common use cases

/// Core math types, camera models, targets and capture records.
pub mod core {
    pub use mvpose_core::*;
}

/// Closed-form PnP, triangulation and fixed-intrinsics stereo solvers.
pub mod linear {
    pub use mvpose_linear::*;
}

/// The pose estimation pipeline and its session driver.
pub mod pipeline {
    pub use mvpose_pipeline::{
        estimate_rig_poses, estimate_single_shot, filter_captures, select_strategy, CameraPose,
        FilteredCapture, FilteredCorrespondences, PoseError, PoseEstimate, PoseEstimationResult,
        PoseSession, PoseStrategy, PoseVisualizer, RigCamera, COMMON_STRATEGY_MIN_POINTS,
        MAX_STEREO_REPROJ_ERROR, MIN_SHARED_CORNERS,
    };
}

/// Convenient re-exports for common use cases.
///
/// Import with `use mvpose::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        CameraIntrinsics, Capture, Detection, ImageSize, Iso3, Pt2, Pt3, RadialTangential, Real,
        TargetModel, TargetSpec, Vec2, Vec3,
    };
    pub use crate::pipeline::{
        estimate_rig_poses, estimate_single_shot, PoseEstimationResult, PoseSession, PoseStrategy,
        RigCamera,
    };
}
