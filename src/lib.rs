//! SAHI-style sliced person detection.
//!
//! Small, far-field people are hard to detect with one whole-image
//! inference pass: at typical model input sizes they shrink to a handful
//! of pixels. This crate covers the image with overlapping fixed-size
//! tiles, runs an opaque detector on each tile (and optionally on the
//! whole image), remaps every tile-local box into full-image coordinates,
//! merges duplicate boxes that overlapping tiles produced for the same
//! person, and emits one deterministically ordered, id-stamped detection
//! list per image.
//!
//! The detector itself is pluggable through [`DetectionSource`]; the crate
//! carries no model weights or inference runtime. Around the core live
//! thin collaborators for TOML configuration, input discovery, per-image
//! JSON output and box-overlay visualization.
//!
//! ```ignore
//! use slicedet_rs::{DetectionPipeline, run_batch, load_config};
//!
//! let config = load_config(&config_path)?;
//! let mut pipeline = DetectionPipeline::new(my_detector, config.slice_params());
//! let summary = run_batch(&mut pipeline, &config, config_dir)?;
//! ```

pub mod config;
pub mod integration;
pub mod output;
pub mod paths;
pub mod slicer;
pub mod visualize;

pub use config::{AppConfig, ConfigError, load_config};
pub use integration::{
    BatchError, BatchSummary, DetectionBuilder, DetectionPipeline, DetectionSource,
    IntoDetections, run_batch,
};
pub use output::{FORMAT_VERSION, OutputError, write_per_image_json};
pub use slicer::{
    Detection, ImageMeta, ImageResult, MergeError, PERSON_CLASS_ID, ParamError, PipelineError,
    PoolPolicy, RankedDetection, Rect, SliceParams, Stage, Tile, merge_detections,
    process_image, rank_detections, tile_grid,
};
pub use visualize::{VisualizeError, save_visualization};
