//! Stepwise pose estimation session.
//!
//! A [`PoseSession`] owns the rig description and walks one run through its
//! stages: capture loading, correspondence filtering with strategy
//! selection, and the solve itself. Each stage can be driven separately, or
//! [`estimate_rig_poses`] runs the whole pipeline in one call.

use log::info;

use mvpose_core::{Capture, TargetModel};

use crate::correspondence::{filter_captures, FilteredCorrespondences};
use crate::error::{PoseError, Result};
use crate::result::{CameraPose, PoseEstimate, PoseEstimationResult};
use crate::solver::solve_common;
use crate::strategy::{select_strategy, total_shared_points, PoseStrategy};

/// One camera of the rig: stable identifier plus fixed intrinsics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RigCamera {
    pub serial: String,
    pub intrinsics: mvpose_core::CameraIntrinsics,
}

/// Observer hooks for the stages of a run. All methods default to no-ops.
pub trait PoseVisualizer {
    fn strategy_selected(&mut self, _strategy: PoseStrategy, _total_shared_points: usize) {}
    fn poses_solved(&mut self, _result: &PoseEstimationResult) {}
}

/// A no-op visualizer.
impl PoseVisualizer for () {}

#[derive(Debug)]
pub struct PoseSession {
    cameras: Vec<RigCamera>,
    target: TargetModel,
    reference: usize,
    captures: Vec<Capture>,
    strategy: Option<PoseStrategy>,
    filtered: Option<FilteredCorrespondences>,
    result: Option<PoseEstimationResult>,
}

impl PoseSession {
    /// Create a session for a rig. Needs at least two cameras and a valid
    /// reference index.
    pub fn new(cameras: Vec<RigCamera>, target: TargetModel, reference: usize) -> Result<Self> {
        if cameras.len() < 2 {
            return Err(PoseError::TooFewCameras {
                got: cameras.len(),
            });
        }
        if reference >= cameras.len() {
            return Err(PoseError::ReferenceOutOfRange {
                reference,
                cameras: cameras.len(),
            });
        }
        Ok(Self {
            cameras,
            target,
            reference,
            captures: Vec::new(),
            strategy: None,
            filtered: None,
            result: None,
        })
    }

    pub fn cameras(&self) -> &[RigCamera] {
        &self.cameras
    }

    pub fn reference(&self) -> usize {
        self.reference
    }

    /// Load the run's captures, validating one detection slot per camera.
    /// Resets any previously computed stage.
    pub fn load_captures(&mut self, captures: Vec<Capture>) -> Result<()> {
        for (idx, capture) in captures.iter().enumerate() {
            if capture.num_cameras() != self.cameras.len() {
                return Err(PoseError::UnsyncedCaptures {
                    capture: idx,
                    expected: self.cameras.len(),
                    got: capture.num_cameras(),
                });
            }
        }
        info!("loaded {} captures for {} cameras", captures.len(), self.cameras.len());
        self.captures = captures;
        self.strategy = None;
        self.filtered = None;
        self.result = None;
        Ok(())
    }

    /// Filter correspondences and select the strategy for this run.
    pub fn filter(&mut self) -> Result<PoseStrategy> {
        let strategy = select_strategy(&self.target, &self.captures)?;
        self.filtered = Some(filter_captures(&self.target, &self.captures)?);
        self.strategy = Some(strategy);
        Ok(strategy)
    }

    /// Solve the rig poses, filtering first if [`PoseSession::filter`] was
    /// not called explicitly.
    pub fn solve(&mut self) -> Result<&PoseEstimationResult> {
        self.solve_with(&mut ())
    }

    /// [`PoseSession::solve`] with observer hooks.
    pub fn solve_with(&mut self, visualizer: &mut dyn PoseVisualizer) -> Result<&PoseEstimationResult> {
        if self.strategy.is_none() {
            self.filter()?;
        }
        let strategy = self.strategy.expect("strategy set by filter");
        visualizer.strategy_selected(strategy, total_shared_points(&self.target, &self.captures)?);

        // The sequential-stereo chain degenerates to the reference pair for
        // two cameras; longer chains are not implemented.
        if strategy == PoseStrategy::SequentialStereo && self.cameras.len() > 2 {
            return Err(PoseError::SequentialChainingUnsupported {
                cameras: self.cameras.len(),
            });
        }

        let filtered = self.filtered.as_ref().expect("correspondences set by filter");
        let output = solve_common(&self.cameras, self.reference, filtered)?;

        let result = PoseEstimationResult {
            cameras: self
                .cameras
                .iter()
                .zip(&output.poses)
                .map(|(camera, pose)| CameraPose {
                    serial: camera.serial.clone(),
                    pose: PoseEstimate::from_iso(pose),
                })
                .collect(),
            strategy,
            reprojection_error: Some(output.reprojection_error),
            low_confidence: output.low_confidence,
        };
        visualizer.poses_solved(&result);

        self.result = Some(result);
        Ok(self.result.as_ref().expect("just set"))
    }

    pub fn result(&self) -> Option<&PoseEstimationResult> {
        self.result.as_ref()
    }

    /// Consume the session, yielding the result if one was solved.
    pub fn into_result(self) -> Option<PoseEstimationResult> {
        self.result
    }
}

/// Run the whole pipeline in one call.
pub fn estimate_rig_poses(
    cameras: Vec<RigCamera>,
    target: TargetModel,
    captures: Vec<Capture>,
    reference: usize,
) -> Result<PoseEstimationResult> {
    let mut session = PoseSession::new(cameras, target, reference)?;
    session.load_captures(captures)?;
    session.solve()?;
    Ok(session.into_result().expect("solve succeeded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvpose_core::{
        CameraIntrinsics, Detection, ImageSize, Mat3, Pt2, RadialTangential,
    };

    fn camera(serial: &str) -> RigCamera {
        let k = Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 360.0, 0.0, 0.0, 1.0);
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

    fn target() -> TargetModel {
        TargetModel::charuco(5, 4, 0.05)
    }

    #[test]
    fn rejects_single_camera_rig() {
        let err = PoseSession::new(vec![camera("only")], target(), 0).unwrap_err();
        assert!(matches!(err, PoseError::TooFewCameras { got: 1 }));
    }

    #[test]
    fn rejects_out_of_range_reference() {
        let err = PoseSession::new(vec![camera("a"), camera("b")], target(), 2).unwrap_err();
        assert!(matches!(
            err,
            PoseError::ReferenceOutOfRange {
                reference: 2,
                cameras: 2
            }
        ));
    }

    #[test]
    fn rejects_unsynced_capture() {
        let mut session = PoseSession::new(vec![camera("a"), camera("b")], target(), 0).unwrap();
        let bad = Capture::new(vec![Detection::default()]);
        let err = session.load_captures(vec![Capture::new(vec![Detection::default(); 2]), bad]).unwrap_err();
        assert!(matches!(
            err,
            PoseError::UnsyncedCaptures {
                capture: 1,
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn sequential_with_three_cameras_is_unsupported() {
        let cameras = vec![camera("a"), camera("b"), camera("c")];
        let mut session = PoseSession::new(cameras, target(), 0).unwrap();

        // A handful of shared corners, far below the joint-solve threshold.
        let det = Detection::from_pairs((0..6).map(|i| (i, Pt2::new(i as f64, 1.0))));
        let captures = vec![Capture::new(vec![det.clone(), det.clone(), det]); 3];
        session.load_captures(captures).unwrap();

        assert_eq!(session.filter().unwrap(), PoseStrategy::SequentialStereo);
        let err = session.solve().unwrap_err();
        assert!(matches!(
            err,
            PoseError::SequentialChainingUnsupported { cameras: 3 }
        ));
        assert!(session.result().is_none());
    }
}
