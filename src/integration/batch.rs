//! Directory-driven batch runs: discover images, detect, write JSON and
//! visualizations.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::output::write_per_image_json;
use crate::paths::{iter_image_files, map_output_path, relative_path_str, resolve_from};
use crate::slicer::ImageMeta;
use crate::visualize::save_visualization;

use super::{DetectionPipeline, DetectionSource};

/// Batch-level failures that prevent the run from starting.
///
/// Per-image failures never abort a batch; they are collected in
/// [`BatchSummary::failed`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("input.dir not found: {path}")]
    InputDirNotFound { path: PathBuf },
    #[error("failed to scan input dir {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to each image of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Images whose JSON output was written
    pub written: usize,
    /// Images skipped by the overwrite or write_empty policy
    pub skipped: usize,
    /// Images that failed, with a human-readable reason each
    pub failed: Vec<(PathBuf, String)>,
}

/// Process every image under the configured input directory.
///
/// Relative directories in `config` are resolved against `base_dir`
/// (conventionally the directory holding the config file). Existing
/// outputs are skipped unless `output.overwrite` is set; empty results are
/// written unless `output.write_empty` is cleared. A failure on one image
/// is logged and recorded, and the run continues with the next image.
pub fn run_batch<D: DetectionSource>(
    pipeline: &mut DetectionPipeline<D>,
    config: &AppConfig,
    base_dir: &Path,
) -> Result<BatchSummary, BatchError> {
    let input_dir = resolve_from(base_dir, &config.input.dir);
    let output_dir = resolve_from(base_dir, &config.output.dir);
    let vis_dir = resolve_from(base_dir, &config.visualization.dir);

    if !input_dir.exists() {
        return Err(BatchError::InputDirNotFound { path: input_dir });
    }

    let images = iter_image_files(&input_dir, config.input.recursive, &config.input.extensions)
        .map_err(|source| BatchError::Scan {
            path: input_dir.clone(),
            source,
        })?;
    info!(images = images.len(), dir = %input_dir.display(), "starting batch run");

    let mut summary = BatchSummary::default();

    for image_path in images {
        let out_json_path = map_output_path(&output_dir, &input_dir, &image_path, "json");
        if out_json_path.exists() && !config.output.overwrite {
            debug!(image = %image_path.display(), "output exists, skipping");
            summary.skipped += 1;
            continue;
        }

        match process_one(pipeline, config, &input_dir, &vis_dir, &image_path, &out_json_path) {
            Ok(true) => summary.written += 1,
            Ok(false) => summary.skipped += 1,
            Err(reason) => {
                error!(image = %image_path.display(), reason = %reason, "image failed");
                summary.failed.push((image_path, reason));
            }
        }
    }

    info!(
        written = summary.written,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        "batch run finished"
    );
    Ok(summary)
}

/// Returns Ok(true) when the JSON was written, Ok(false) when skipped by
/// the write_empty policy.
fn process_one<D: DetectionSource>(
    pipeline: &mut DetectionPipeline<D>,
    config: &AppConfig,
    input_dir: &Path,
    vis_dir: &Path,
    image_path: &Path,
    out_json_path: &Path,
) -> Result<bool, String> {
    let image = image::open(image_path)
        .map_err(|e| format!("decode failed: {e}"))?
        .to_rgb8();

    let meta = ImageMeta {
        file_name: image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        relative_path: relative_path_str(input_dir, image_path),
        width: image.width(),
        height: image.height(),
    };

    let result = pipeline
        .process_image(&image, meta)
        .map_err(|e| format!("detection failed: {e}"))?;

    if result.detections.is_empty() && !config.output.write_empty {
        return Ok(false);
    }

    write_per_image_json(out_json_path, &result).map_err(|e| e.to_string())?;

    // The JSON is already on disk at this point. A visualization failure
    // must not mark the image failed, or overwrite=false re-runs would
    // skip it forever without ever retrying the overlay.
    if config.visualization.enabled {
        let out_vis_path = map_output_path(vis_dir, input_dir, image_path, "png");
        if let Err(e) = save_visualization(
            &image,
            &result.detections,
            &out_vis_path,
            &config.visualization,
        ) {
            warn!(image = %image_path.display(), error = %e, "visualization failed, JSON output kept");
        }
    }

    Ok(true)
}
