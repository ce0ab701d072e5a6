//! Correspondence filtering.
//!
//! For each capture, a boolean visibility matrix (corner x camera) decides
//! which target corners every camera observed simultaneously. Captures with
//! enough shared corners contribute matched 3D/2D point arrays in strict
//! positional alignment: index `i` of the 3D array and of every camera's 2D
//! array refers to the same corner id, ids ascending.

use log::debug;
use mvpose_core::{Capture, Pt2, Pt3, TargetModel};

use crate::error::{PoseError, Result};

/// Minimum simultaneously visible corners for a capture to be kept.
pub const MIN_SHARED_CORNERS: usize = 6;

/// Matched correspondences of one accepted capture.
#[derive(Debug, Clone)]
pub struct FilteredCapture {
    /// Shared corner ids, ascending.
    pub corner_ids: Vec<usize>,
    /// Target-space points of the shared corners, same order as `corner_ids`.
    pub object_points: Vec<Pt3>,
    /// Per camera, the pixel observations of the shared corners, same order.
    pub image_points: Vec<Vec<Pt2>>,
}

/// All accepted captures of one run, capture order preserved.
#[derive(Debug, Clone, Default)]
pub struct FilteredCorrespondences {
    pub captures: Vec<FilteredCapture>,
    num_cameras: usize,
}

impl FilteredCorrespondences {
    pub fn num_cameras(&self) -> usize {
        self.num_cameras
    }

    /// Number of accepted captures.
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Total matched points across all accepted captures.
    pub fn total_points(&self) -> usize {
        self.captures.iter().map(|c| c.object_points.len()).sum()
    }

    /// Capture-major concatenation of the 3D point arrays.
    pub fn object_points_flat(&self) -> Vec<Pt3> {
        self.captures
            .iter()
            .flat_map(|c| c.object_points.iter().copied())
            .collect()
    }

    /// Capture-major concatenation of one camera's 2D point arrays,
    /// positionally aligned with [`FilteredCorrespondences::object_points_flat`].
    pub fn image_points_flat(&self, camera: usize) -> Vec<Pt2> {
        self.captures
            .iter()
            .flat_map(|c| c.image_points[camera].iter().copied())
            .collect()
    }
}

/// Corner ids visible in every camera of `capture`, ascending.
///
/// Fails on corner ids outside the target model.
pub fn shared_corner_ids(
    capture: &Capture,
    num_corners: usize,
    capture_idx: usize,
) -> Result<Vec<usize>> {
    let num_cameras = capture.num_cameras();
    let mut visible = vec![0usize; num_corners];

    for (camera, detection) in capture.detections.iter().enumerate() {
        for corner in detection.ids() {
            if corner >= num_corners {
                return Err(PoseError::UnknownCorner {
                    capture: capture_idx,
                    camera,
                    corner,
                    num_corners,
                });
            }
            visible[corner] += 1;
        }
    }

    Ok((0..num_corners)
        .filter(|&corner| visible[corner] == num_cameras)
        .collect())
}

/// Filter captures down to those with at least [`MIN_SHARED_CORNERS`]
/// simultaneously visible corners and extract their matched point arrays.
///
/// Captures below the floor are dropped with a debug log entry; a shared
/// corner missing from a camera's detection list (despite confirmed
/// visibility) is a fatal contract violation.
pub fn filter_captures(
    target: &TargetModel,
    captures: &[Capture],
) -> Result<FilteredCorrespondences> {
    let num_cameras = captures.first().map_or(0, Capture::num_cameras);
    let mut filtered = FilteredCorrespondences {
        captures: Vec::new(),
        num_cameras,
    };

    for (capture_idx, capture) in captures.iter().enumerate() {
        let shared = shared_corner_ids(capture, target.len(), capture_idx)?;
        if shared.len() < MIN_SHARED_CORNERS {
            debug!(
                "capture {capture_idx}: {} shared corners (< {MIN_SHARED_CORNERS}), dropped",
                shared.len()
            );
            continue;
        }

        let mut object_points = Vec::with_capacity(shared.len());
        for &corner in &shared {
            let point = target.point(corner).ok_or(PoseError::UnknownCorner {
                capture: capture_idx,
                camera: 0,
                corner,
                num_corners: target.len(),
            })?;
            object_points.push(point);
        }

        let mut image_points = Vec::with_capacity(capture.num_cameras());
        for (camera, detection) in capture.detections.iter().enumerate() {
            let mut pixels = Vec::with_capacity(shared.len());
            for &corner in &shared {
                let pixel = detection
                    .find(corner)
                    .ok_or(PoseError::MissingSharedCorner {
                        capture: capture_idx,
                        camera,
                        corner,
                    })?;
                pixels.push(pixel);
            }
            image_points.push(pixels);
        }

        filtered.captures.push(FilteredCapture {
            corner_ids: shared,
            object_points,
            image_points,
        });
    }

    Ok(filtered)
}
