//! The sliced-detection core: tile grid generation, coordinate remapping,
//! duplicate merging and deterministic ranking.

mod merge;
mod params;
mod rank;
mod rect;
mod runner;
mod tile;

pub use merge::{Detection, MergeError, merge_detections};
pub use params::{PERSON_CLASS_ID, ParamError, PoolPolicy, SliceParams};
pub use rank::{RankedDetection, rank_detections};
pub use rect::{Rect, iou_batch};
pub use runner::{ImageMeta, ImageResult, PipelineError, Stage, process_image};
pub use tile::{Tile, tile_grid};
