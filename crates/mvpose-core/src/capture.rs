//! Detection and capture records.
//!
//! A [`Detection`] holds the labeled corners one camera observed in one
//! image. A [`Capture`] groups the detections of all cameras for one
//! logically-simultaneous exposure, in the same order as the camera list.
//! Because every capture carries exactly one slot per camera, equal capture
//! counts across cameras are structural; per-capture slot counts are still
//! validated before a run.

use serde::{Deserialize, Serialize};

use crate::Pt2;

/// One detected target corner: label plus pixel position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CornerObservation {
    /// Corner id within the target model.
    pub corner: usize,
    /// Pixel position of the corner.
    pub pixel: Pt2,
}

/// All corners one camera detected in one capture. May be empty; the order
/// of entries is detector-defined and carries no meaning.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Detection {
    pub corners: Vec<CornerObservation>,
}

impl Detection {
    pub fn new(corners: Vec<CornerObservation>) -> Self {
        Self { corners }
    }

    /// Build a detection from `(corner id, pixel)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, Pt2)>) -> Self {
        Self {
            corners: pairs
                .into_iter()
                .map(|(corner, pixel)| CornerObservation { corner, pixel })
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Pixel position of corner `id`, if this camera detected it.
    pub fn find(&self, id: usize) -> Option<Pt2> {
        self.corners
            .iter()
            .find(|obs| obs.corner == id)
            .map(|obs| obs.pixel)
    }

    /// Iterate over detected corner ids.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.corners.iter().map(|obs| obs.corner)
    }
}

/// Per-camera detections for one synchronized exposure. `detections[i]`
/// belongs to camera `i` of the rig's camera list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Capture {
    pub detections: Vec<Detection>,
}

impl Capture {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    /// Number of camera slots in this capture.
    #[inline]
    pub fn num_cameras(&self) -> usize {
        self.detections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_looks_up_by_id_regardless_of_order() {
        let det = Detection::from_pairs([
            (7, Pt2::new(10.0, 20.0)),
            (2, Pt2::new(30.0, 40.0)),
            (5, Pt2::new(50.0, 60.0)),
        ]);

        assert_eq!(det.find(2), Some(Pt2::new(30.0, 40.0)));
        assert_eq!(det.find(7), Some(Pt2::new(10.0, 20.0)));
        assert_eq!(det.find(9), None);
    }

    #[test]
    fn capture_json_roundtrip() {
        let capture = Capture::new(vec![
            Detection::from_pairs([(0, Pt2::new(1.0, 2.0))]),
            Detection::default(),
        ]);

        let json = serde_json::to_string(&capture).unwrap();
        let restored: Capture = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.num_cameras(), 2);
        assert_eq!(restored.detections[0].find(0), Some(Pt2::new(1.0, 2.0)));
        assert!(restored.detections[1].is_empty());
    }
}
