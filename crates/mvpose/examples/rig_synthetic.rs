//! Estimate the poses of a synthetic three-camera rig and print the result
//! as JSON.
//!
//! Run with `cargo run --example rig_synthetic`.

use mvpose::core::synthetic::{board_sweep, rig_captures};
use mvpose::prelude::*;
use nalgebra::{Translation3, UnitQuaternion};

fn camera(serial: &str, fx: f64) -> RigCamera {
    let k = mvpose::core::Mat3::new(fx, 0.0, 640.0, 0.0, fx, 360.0, 0.0, 0.0, 1.0);
    RigCamera {
        serial: serial.into(),
        intrinsics: CameraIntrinsics::new(
            k,
            RadialTangential::none(),
            ImageSize {
                width: 1280,
                height: 720,
            },
        ),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cameras = vec![
        camera("cam-ref", 800.0),
        camera("cam-left", 780.0),
        camera("cam-right", 820.0),
    ];
    let rig = vec![
        Iso3::identity(),
        Iso3::from_parts(
            Translation3::new(0.3, 0.0, 0.05),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.0, -0.2, 0.0)),
        ),
        Iso3::from_parts(
            Translation3::new(-0.3, 0.02, 0.05),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.0, 0.2, 0.01)),
        ),
    ];

    let target = TargetModel::charuco(8, 6, 0.04);
    let intrinsics: Vec<_> = cameras.iter().map(|c| c.intrinsics.clone()).collect();
    let boards = board_sweep(12, 0.03, 0.9, 0.04);
    let captures = rig_captures(&intrinsics, &rig, &boards, &target);

    let result = estimate_rig_poses(cameras, target, captures, 0)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
