//! Multi-camera extrinsic pose estimation pipeline.
//!
//! Given per-camera intrinsics and synchronized target detections, this
//! crate recovers each camera's pose relative to a chosen reference camera:
//!
//! 1. [`correspondence`] filters captures down to corners every camera saw
//!    simultaneously,
//! 2. [`strategy`] picks the estimation strategy from the amount of shared
//!    data,
//! 3. [`solver`] anchors the rig with a reference-pair stereo calibration,
//!    triangulates the shared points and solves each camera by PnP,
//! 4. [`single_shot`] offers an independent per-camera fallback from a
//!    single frame.
//!
//! [`session::PoseSession`] drives the stages; [`session::estimate_rig_poses`]
//! runs them end to end.

pub mod correspondence;
pub mod error;
pub mod result;
pub mod session;
pub mod single_shot;
pub mod solver;
pub mod strategy;

pub use correspondence::{
    filter_captures, FilteredCapture, FilteredCorrespondences, MIN_SHARED_CORNERS,
};
pub use error::{PoseError, Result};
pub use result::{CameraPose, PoseEstimate, PoseEstimationResult};
pub use session::{estimate_rig_poses, PoseSession, PoseVisualizer, RigCamera};
pub use single_shot::estimate_single_shot;
pub use solver::MAX_STEREO_REPROJ_ERROR;
pub use strategy::{select_strategy, PoseStrategy, COMMON_STRATEGY_MIN_POINTS};
