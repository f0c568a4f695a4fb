//! Validated numeric parameters for the sliced-detection pipeline.

use serde::Deserialize;

/// COCO category id for "person", the target class of this pipeline.
pub const PERSON_CLASS_ID: u32 = 0;

/// How whole-image-pass detections are pooled relative to tiled-pass
/// detections before merging.
///
/// Pooling order matters only on exact score ties: the merge tie-break is
/// pool order, so the policy decides whether a whole-image box or a tile
/// box survives when both score the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPolicy {
    /// Whole-image detections are pooled before tile detections and win
    /// exact-score ties.
    #[default]
    FullImageFirst,
    /// Tile detections are pooled first and win exact-score ties.
    TilesFirst,
}

/// Pipeline parameters, already validated and unit-free of any config
/// file syntax.
///
/// `validate` must pass before any detection work starts; the orchestrator
/// checks it on entry.
#[derive(Debug, Clone)]
pub struct SliceParams {
    /// Tile width in pixels
    pub slice_width: u32,
    /// Tile height in pixels
    pub slice_height: u32,
    /// Horizontal overlap between adjacent tiles, in [0, 1)
    pub overlap_width_ratio: f32,
    /// Vertical overlap between adjacent tiles, in [0, 1)
    pub overlap_height_ratio: f32,
    /// Minimum detector score for a candidate to be considered at all;
    /// passed through to the detector
    pub confidence_floor: f32,
    /// IoU at or above which two detections merge into one, in [0, 1]
    pub match_threshold: f32,
    /// Keep only the top-N detections by score, applied after ranking
    pub max_detections: Option<usize>,
    /// Model category id retained by the pipeline; everything else is
    /// discarded before merging
    pub target_class: u32,
    /// When false, the image is processed as one full-size tile through
    /// the same code path
    pub slicing_enabled: bool,
    /// Run one whole-image pass in addition to the tiled passes, improving
    /// recall for medium-sized objects a tile would truncate at its edge
    pub full_image_pass: bool,
    /// Tie-break policy between whole-image and tiled detections
    pub pool_policy: PoolPolicy,
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            slice_width: 640,
            slice_height: 640,
            overlap_width_ratio: 0.2,
            overlap_height_ratio: 0.2,
            confidence_floor: 0.1,
            match_threshold: 0.5,
            max_detections: Some(300),
            target_class: PERSON_CLASS_ID,
            slicing_enabled: true,
            full_image_pass: false,
            pool_policy: PoolPolicy::default(),
        }
    }
}

/// Parameter contract violations, surfaced before any detection work.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("slice dimensions must be > 0, got {width}x{height}")]
    ZeroSliceSize { width: u32, height: u32 },
    #[error("overlap ratio {0} outside [0, 1)")]
    OverlapOutOfRange(f32),
    #[error("match threshold {0} outside [0, 1]")]
    MatchThresholdOutOfRange(f32),
    #[error("confidence floor {0} outside [0, 1]")]
    ConfidenceFloorOutOfRange(f32),
    #[error("max detections limit must be > 0 when set")]
    ZeroMaxDetections,
}

impl SliceParams {
    /// Check every parameter against its documented range.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.slice_width == 0 || self.slice_height == 0 {
            return Err(ParamError::ZeroSliceSize {
                width: self.slice_width,
                height: self.slice_height,
            });
        }
        for overlap in [self.overlap_width_ratio, self.overlap_height_ratio] {
            if !(0.0..1.0).contains(&overlap) {
                return Err(ParamError::OverlapOutOfRange(overlap));
            }
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ParamError::MatchThresholdOutOfRange(self.match_threshold));
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ParamError::ConfidenceFloorOutOfRange(self.confidence_floor));
        }
        if self.max_detections == Some(0) {
            return Err(ParamError::ZeroMaxDetections);
        }
        Ok(())
    }
}
