//! Final ordering, truncation and id assignment.

use crate::slicer::merge::Detection;
use crate::slicer::rect::Rect;

/// One entry of the final per-image result: a deduplicated detection with
/// its zero-based rank id.
///
/// Ids are assigned by descending score and are meaningful only within one
/// image and one run; they are not persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDetection {
    /// Zero-based id, 0 for the highest-scoring detection
    pub id: usize,
    /// Bounding box in full-image coordinates
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
}

/// Sort merged detections by score descending and assign sequential ids.
///
/// The sort is stable, so exact score ties keep the deterministic order
/// the merge stage produced (pool order, which follows tile emission
/// order) rather than falling back to arbitrary iteration order.
///
/// When `max_detections` is set the list is truncated AFTER sorting, so
/// the limit always keeps the top-N by score and never drops an arbitrary
/// subset.
pub fn rank_detections(
    merged: Vec<Detection>,
    max_detections: Option<usize>,
) -> Vec<RankedDetection> {
    let mut detections = merged;
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(limit) = max_detections {
        detections.truncate(limit);
    }

    detections
        .into_iter()
        .enumerate()
        .map(|(id, det)| RankedDetection {
            id,
            bbox: det.bbox,
            score: det.score,
        })
        .collect()
}
