//! Error taxonomy of the pose estimation pipeline.
//!
//! Fatal conditions (input contract violations, strategy exhaustion,
//! numerical failures) surface as [`PoseError`]. Degenerate-data conditions
//! (captures with too few shared corners, a stereo solve above the quality
//! threshold) are not errors: they are logged and, where relevant, reflected
//! in the result's low-confidence flag.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseError {
    /// A capture does not carry exactly one detection slot per camera.
    #[error("capture {capture} has {got} detection slots, expected one per camera ({expected})")]
    UnsyncedCaptures {
        capture: usize,
        expected: usize,
        got: usize,
    },

    /// A detection references a corner id outside the target model.
    #[error("capture {capture}, camera {camera}: corner id {corner} is outside the target model ({num_corners} corners)")]
    UnknownCorner {
        capture: usize,
        camera: usize,
        corner: usize,
        num_corners: usize,
    },

    /// A corner confirmed visible in every camera is missing from one
    /// camera's detection list. Internal contract violation.
    #[error("capture {capture}, camera {camera}: shared corner {corner} missing from the detection list")]
    MissingSharedCorner {
        capture: usize,
        camera: usize,
        corner: usize,
    },

    /// Relative pose needs at least two cameras.
    #[error("pose estimation needs at least two cameras, got {got}")]
    TooFewCameras { got: usize },

    /// Reference camera index outside the camera list.
    #[error("reference camera index {reference} is out of range for {cameras} cameras")]
    ReferenceOutOfRange { reference: usize, cameras: usize },

    /// A per-camera solve received fewer correspondences than its minimum.
    #[error("camera {camera}: {got} correspondences, solver needs at least {needed}")]
    InsufficientPoints {
        camera: usize,
        got: usize,
        needed: usize,
    },

    /// No capture reached the minimum simultaneous-visibility floor.
    #[error("no capture reached the minimum of {min} simultaneously visible corners")]
    NoUsableCaptures { min: usize },

    /// Sequential-stereo was selected for a rig the chaining algorithm does
    /// not cover. The pairwise chain beyond one reference pair is an
    /// upstream-documented gap.
    #[error("sequential-stereo chaining across {cameras} cameras is not implemented; capture more simultaneously shared views")]
    SequentialChainingUnsupported { cameras: usize },

    /// A numerical primitive failed.
    #[error(transparent)]
    Numerical(#[from] anyhow::Error),
}

pub type Result<T, E = PoseError> = std::result::Result<T, E>;
