//! DetectionPipeline for bundling a detector with slice parameters.

use image::RgbImage;

use crate::slicer::{ImageMeta, ImageResult, PipelineError, SliceParams, process_image};

use super::DetectionSource;

/// A detector paired with validated slice parameters.
///
/// This struct provides a convenient way to run the full
/// tile-detect-merge-rank pipeline on decoded images with one call per
/// image.
pub struct DetectionPipeline<D: DetectionSource> {
    detector: D,
    params: SliceParams,
}

impl<D: DetectionSource> DetectionPipeline<D> {
    /// Create a new pipeline with the given detector and slice parameters.
    pub fn new(detector: D, params: SliceParams) -> Self {
        Self { detector, params }
    }

    /// Create a new pipeline with default slice parameters.
    pub fn with_default_params(detector: D) -> Self {
        Self::new(detector, SliceParams::default())
    }

    /// Run the sliced-detection pipeline on one decoded image.
    ///
    /// Zero detections is a success; a detector failure surfaces as a
    /// per-image error and leaves the pipeline usable for the next image.
    pub fn process_image(
        &mut self,
        image: &RgbImage,
        meta: ImageMeta,
    ) -> Result<ImageResult, PipelineError<D::Error>> {
        process_image(&mut self.detector, image, meta, &self.params)
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the slice parameters.
    pub fn params(&self) -> &SliceParams {
        &self.params
    }
}
