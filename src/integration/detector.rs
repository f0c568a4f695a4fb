//! Trait for object detection inference backends.

use image::RgbImage;

use crate::slicer::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to plug any detection model into the sliced
/// pipeline. The pipeline hands the implementor native-resolution crops;
/// any internal resizing for inference (and mapping the results back to
/// region coordinates) is the implementor's responsibility and invisible
/// to the caller.
///
/// `detect` takes `&mut self`: the pipeline serializes regions through one
/// adapter instance and never dispatches tiles to it concurrently. An
/// adapter that is internally safe for concurrent use may be shared across
/// per-image workers, but that contract belongs to the adapter's own
/// documentation.
///
/// # Example
///
/// ```ignore
/// use slicedet_rs::{DetectionSource, Detection};
/// use image::RgbImage;
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, region: &RgbImage, confidence_floor: f32)
///         -> Result<Vec<Detection>, Self::Error>
///     {
///         // Run inference and return region-local detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on one image region.
    ///
    /// # Arguments
    /// * `region` - The pixels to run inference on; either a tile crop or
    ///   the whole image
    /// * `confidence_floor` - Minimum score for a candidate to be reported
    ///
    /// # Returns
    /// Detections with boxes in the region's own coordinate system (origin
    /// at the region's top-left corner), all classes included; the
    /// pipeline filters for its target class and remaps offsets.
    fn detect(
        &mut self,
        region: &RgbImage,
        confidence_floor: f32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}
