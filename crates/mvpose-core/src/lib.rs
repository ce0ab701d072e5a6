//! Core types for `mvpose-rs`, a multi-camera extrinsic pose estimation toolbox.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...) and Rodrigues
//!   rotation-vector helpers,
//! - per-camera intrinsic models (`CameraIntrinsics`, `RadialTangential`),
//! - calibration target geometry (`TargetModel`),
//! - detection/capture records shared by all solvers,
//! - synthetic rig generators for tests and examples.
//!
//! The numerical solvers live in `mvpose-linear`; the estimation pipeline in
//! `mvpose-pipeline`.

/// Linear algebra type aliases and Rodrigues helpers.
pub mod math;
/// Brown-Conrady distortion model.
pub mod distortion;
/// Per-camera intrinsic calibration.
pub mod camera;
/// Calibration target geometry.
pub mod target;
/// Detection and capture records.
pub mod capture;
/// Synthetic rig generators.
pub mod synthetic;

pub use camera::{CameraIntrinsics, ImageSize};
pub use capture::{Capture, CornerObservation, Detection};
pub use distortion::RadialTangential;
pub use math::*;
pub use target::{TargetModel, TargetSpec};
