//! Pose estimation results and their JSON persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use mvpose_core::{iso_from_rodrigues, rodrigues_from_iso, Iso3, Pt3, Real, Vec3};

use crate::strategy::PoseStrategy;

/// One camera's extrinsic pose: the world-to-camera transform encoded as a
/// Rodrigues rotation vector and a translation vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl PoseEstimate {
    pub fn from_iso(iso: &Iso3) -> Self {
        let (rotation, translation) = rodrigues_from_iso(iso);
        Self {
            rotation,
            translation,
        }
    }

    pub fn to_iso(&self) -> Iso3 {
        iso_from_rodrigues(&self.rotation, &self.translation)
    }

    /// Camera center in world coordinates, `-R^T t`.
    pub fn camera_center(&self) -> Pt3 {
        let iso = self.to_iso();
        iso.inverse_transform_point(&Pt3::origin())
    }
}

/// Pose of one named camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraPose {
    pub serial: String,
    pub pose: PoseEstimate,
}

/// Output of one pose estimation run.
///
/// Camera order matches the input camera list. The reference camera is
/// solved like the others, so its pose lands near (not exactly on) the
/// identity. `reprojection_error` is the RMS pixel residual of the
/// anchoring stereo solve where one was performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEstimationResult {
    pub cameras: Vec<CameraPose>,
    pub strategy: PoseStrategy,
    pub reprojection_error: Option<Real>,
    pub low_confidence: bool,
}

impl PoseEstimationResult {
    pub fn pose_of(&self, serial: &str) -> Option<&PoseEstimate> {
        self.cameras
            .iter()
            .find(|c| c.serial == serial)
            .map(|c| &c.pose)
    }

    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion};

    fn sample_pose() -> Iso3 {
        Iso3::from_parts(
            Translation3::new(0.3, -0.1, 1.2),
            UnitQuaternion::from_scaled_axis(Vec3::new(0.05, -0.4, 0.1)),
        )
    }

    #[test]
    fn iso_roundtrip_preserves_pose() {
        let iso = sample_pose();
        let est = PoseEstimate::from_iso(&iso);
        let back = est.to_iso();

        assert!((back.translation.vector - iso.translation.vector).norm() < 1e-12);
        assert!(back.rotation.angle_to(&iso.rotation) < 1e-12);
    }

    #[test]
    fn camera_center_inverts_the_transform() {
        let iso = sample_pose();
        let est = PoseEstimate::from_iso(&iso);

        let center = est.camera_center();
        // Mapping the center through the world-to-camera transform must land
        // at the camera origin.
        let at_camera = iso.transform_point(&center);
        assert!(at_camera.coords.norm() < 1e-12);
    }

    #[test]
    fn json_roundtrip() {
        let result = PoseEstimationResult {
            cameras: vec![
                CameraPose {
                    serial: "cam-a".into(),
                    pose: PoseEstimate::from_iso(&Iso3::identity()),
                },
                CameraPose {
                    serial: "cam-b".into(),
                    pose: PoseEstimate::from_iso(&sample_pose()),
                },
            ],
            strategy: PoseStrategy::Common,
            reprojection_error: Some(0.42),
            low_confidence: false,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poses.json");
        result.save_json(&path).unwrap();
        let loaded = PoseEstimationResult::load_json(&path).unwrap();

        assert_eq!(loaded.cameras.len(), 2);
        assert_eq!(loaded.strategy, PoseStrategy::Common);
        assert_eq!(loaded.reprojection_error, Some(0.42));
        assert_eq!(
            loaded.pose_of("cam-b").unwrap().translation,
            result.cameras[1].pose.translation
        );
        assert!(loaded.pose_of("cam-x").is_none());
    }
}
