//! Duplicate merging for detections pooled from overlapping passes.

use crate::slicer::rect::{Rect, iou_batch};

/// A single detector candidate in full-image coordinates.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box as corner coordinates (xmin, ymin, xmax, ymax)
    pub bbox: Rect,
    /// Detection confidence score in [0, 1]
    pub score: f32,
    /// Model category id (0 is "person" for COCO-trained detectors)
    pub class_id: u32,
}

impl Detection {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32, score: f32, class_id: u32) -> Self {
        Self {
            bbox: Rect::new(xmin, ymin, xmax, ymax),
            score,
            class_id,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32, class_id: u32) -> Self {
        Self {
            bbox,
            score,
            class_id,
        }
    }
}

/// Contract violations the merge engine refuses to paper over.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A candidate carried a score outside [0, 1]; the engine fails fast
    /// instead of silently clamping.
    #[error("candidate {index} has score {score} outside [0, 1]")]
    ScoreOutOfRange { index: usize, score: f32 },
}

/// Collapse duplicate detections of the same object produced by
/// overlapping tiles (or by a whole-image pass pooled with tiled passes).
///
/// Greedy IoU suppression: candidates are visited by score descending,
/// ties broken by their position in `candidates` (which follows the
/// deterministic tile emission order), and a candidate is kept unless its
/// IoU with an already-kept candidate is at or above `match_threshold`.
/// The boundary counts as a duplicate. Kept boxes are the highest-scoring
/// representatives verbatim; no averaging or box fusion happens.
///
/// Lower thresholds suppress more aggressively (risking the collapse of
/// two genuinely adjacent people into one box); higher thresholds may
/// leave duplicate boxes for one person.
///
/// An empty candidate set merges to an empty result. Single-pass input
/// runs through the same path; with no cross-tile duplicates the pass
/// reduces to the deterministic sort.
///
/// Output order is (score descending, then pool order), which the ranking
/// stage's stable sort preserves.
pub fn merge_detections(
    candidates: &[Detection],
    match_threshold: f32,
) -> Result<Vec<Detection>, MergeError> {
    for (index, det) in candidates.iter().enumerate() {
        if !(0.0..=1.0).contains(&det.score) {
            return Err(MergeError::ScoreOutOfRange {
                index,
                score: det.score,
            });
        }
    }

    // Stable sort keeps pool order on exact score ties.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| candidates[b].score.total_cmp(&candidates[a].score));

    let boxes: Vec<Rect> = candidates.iter().map(|d| d.bbox).collect();
    let ious = iou_batch(&boxes, &boxes);

    let mut kept: Vec<usize> = Vec::new();
    for &i in &order {
        let duplicate = kept.iter().any(|&j| ious[[i, j]] >= match_threshold);
        if !duplicate {
            kept.push(i);
        }
    }

    Ok(kept.into_iter().map(|i| candidates[i].clone()).collect())
}
