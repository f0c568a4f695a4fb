//! Integration module for connecting object detection backends with the
//! sliced pipeline.
//!
//! This module provides traits and utilities for plugging inference
//! backends (ONNX Runtime, Burn, remote services, ...) into the
//! tile-detect-merge-rank core, plus the directory-driven batch runner.

mod batch;
mod builder;
mod detector;
mod pipeline;

pub use batch::{BatchError, BatchSummary, run_batch};
pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::DetectionPipeline;
