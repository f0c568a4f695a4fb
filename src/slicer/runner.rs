//! Per-image pipeline orchestration.
//!
//! One image runs tiling -> detection -> remapping -> merging -> ranking
//! to completion; any unrecoverable error aborts that image only and names
//! the stage it died in. A zero-detection outcome is a success, always
//! distinguishable from a failure.

use std::fmt;

use image::RgbImage;
use image::imageops::crop_imm;
use tracing::debug;

use crate::integration::DetectionSource;
use crate::slicer::merge::{Detection, MergeError, merge_detections};
use crate::slicer::params::{ParamError, PoolPolicy, SliceParams};
use crate::slicer::rank::{RankedDetection, rank_detections};
use crate::slicer::tile::{Tile, tile_grid};

/// Pipeline stage, reported with per-image failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tiling,
    Detecting,
    Remapping,
    Merging,
    Ranking,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Tiling => "tiling",
            Stage::Detecting => "detecting",
            Stage::Remapping => "remapping",
            Stage::Merging => "merging",
            Stage::Ranking => "ranking",
        };
        f.write_str(name)
    }
}

/// Why one image's pipeline failed.
///
/// Failures are per-image: the caller decides whether one bad image aborts
/// a batch (the bundled batch driver does not).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("invalid slice parameters: {0}")]
    Params(#[from] ParamError),
    #[error("detector failed during {stage}")]
    Detector {
        stage: Stage,
        #[source]
        source: E,
    },
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Identity of one processed image, as the file-discovery collaborator
/// supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMeta {
    /// Bare file name, e.g. `beach_0042.jpg`
    pub file_name: String,
    /// Path relative to the input root, forward slashes
    pub relative_path: String,
    /// Source image width in pixels
    pub width: u32,
    /// Source image height in pixels
    pub height: u32,
}

/// The complete outcome for one image: metadata plus the ordered,
/// id-stamped detections. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub meta: ImageMeta,
    pub detections: Vec<RankedDetection>,
}

/// Run the full sliced-detection pipeline on one decoded image.
///
/// The detector is taken by `&mut` and invoked for one region at a time;
/// tiles are never dispatched concurrently through it. An adapter that is
/// safe for concurrent use may be shared across per-image workers by the
/// caller, but that contract belongs to the adapter, not to this function.
///
/// Tile processing order cannot affect the final output: merging and
/// ranking order by (score descending, deterministic pool order), never by
/// arrival order.
pub fn process_image<D: DetectionSource>(
    detector: &mut D,
    image: &RgbImage,
    meta: ImageMeta,
    params: &SliceParams,
) -> Result<ImageResult, PipelineError<D::Error>> {
    params.validate()?;

    let (width, height) = image.dimensions();

    let tiles = if params.slicing_enabled {
        tile_grid(
            width,
            height,
            params.slice_width,
            params.slice_height,
            params.overlap_width_ratio,
            params.overlap_height_ratio,
        )
    } else {
        vec![Tile::new(0, 0, width, height)]
    };
    debug!(image = %meta.relative_path, tiles = tiles.len(), stage = %Stage::Tiling, "tile grid built");

    let mut candidates: Vec<Detection> = Vec::new();

    // The whole-image pass is extra recall on top of slicing; with slicing
    // off the single full-size tile already covers it.
    let whole_image_pass = params.full_image_pass && params.slicing_enabled;

    if whole_image_pass && params.pool_policy == PoolPolicy::FullImageFirst {
        run_pass(detector, image, Tile::new(0, 0, width, height), params, &mut candidates)?;
    }

    for &tile in &tiles {
        // Cannot occur with a well-formed grid, but a zero-area tile is a
        // no-detections region, not an error.
        if tile.area() == 0 {
            continue;
        }
        let region = crop_imm(image, tile.x, tile.y, tile.width, tile.height).to_image();
        run_pass(detector, &region, tile, params, &mut candidates)?;
    }

    if whole_image_pass && params.pool_policy == PoolPolicy::TilesFirst {
        run_pass(detector, image, Tile::new(0, 0, width, height), params, &mut candidates)?;
    }

    debug!(image = %meta.relative_path, candidates = candidates.len(), stage = %Stage::Merging, "merging pooled candidates");
    let merged = merge_detections(&candidates, params.match_threshold)?;

    let detections = rank_detections(merged, params.max_detections);
    debug!(image = %meta.relative_path, detections = detections.len(), stage = %Stage::Ranking, "image done");

    Ok(ImageResult { meta, detections })
}

/// Detect on one region, keep the target class, remap into image space and
/// append to the candidate pool.
fn run_pass<D: DetectionSource>(
    detector: &mut D,
    region: &RgbImage,
    tile: Tile,
    params: &SliceParams,
    candidates: &mut Vec<Detection>,
) -> Result<(), PipelineError<D::Error>> {
    let local = detector
        .detect(region, params.confidence_floor)
        .map_err(|source| PipelineError::Detector {
            stage: Stage::Detecting,
            source,
        })?;

    for det in local {
        if det.class_id != params.target_class {
            continue;
        }
        candidates.push(Detection {
            bbox: tile.to_image_coords(det.bbox),
            ..det
        });
    }
    Ok(())
}
