//! Estimation strategy selection.
//!
//! One global decision per run, taken before any solving: if the captures
//! carry enough simultaneously visible points across all cameras, the joint
//! multi-camera ("common") solve is used; otherwise the rig falls back to a
//! reference-pair sequential-stereo approach.

use serde::{Deserialize, Serialize};

use mvpose_core::{Capture, TargetModel};

use crate::correspondence::shared_corner_ids;
use crate::error::Result;

/// Minimum total simultaneous points for the common strategy. Empirically
/// derived policy constant.
pub const COMMON_STRATEGY_MIN_POINTS: usize = 250;

/// How the rig's relative poses are solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoseStrategy {
    /// Joint multi-camera solve from simultaneously shared points.
    Common,
    /// Pairwise chain anchored at the reference camera.
    SequentialStereo,
    /// Independent per-camera PnP against the board from one frame each.
    SingleShot,
}

impl std::fmt::Display for PoseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoseStrategy::Common => write!(f, "common"),
            PoseStrategy::SequentialStereo => write!(f, "sequential-stereo"),
            PoseStrategy::SingleShot => write!(f, "single-shot"),
        }
    }
}

/// Total count of corners simultaneously visible in every camera, summed
/// over all captures. No per-capture floor is applied here.
pub fn total_shared_points(target: &TargetModel, captures: &[Capture]) -> Result<usize> {
    let mut total = 0;
    for (idx, capture) in captures.iter().enumerate() {
        total += shared_corner_ids(capture, target.len(), idx)?.len();
    }
    Ok(total)
}

/// Select the estimation strategy for one run.
pub fn select_strategy(target: &TargetModel, captures: &[Capture]) -> Result<PoseStrategy> {
    let total = total_shared_points(target, captures)?;
    let strategy = if total >= COMMON_STRATEGY_MIN_POINTS {
        PoseStrategy::Common
    } else {
        PoseStrategy::SequentialStereo
    };
    log::info!("{total} simultaneously shared points across {} captures: {strategy} strategy", captures.len());
    Ok(strategy)
}
