//! Per-image JSON output.
//!
//! One JSON document per processed image:
//!
//! ```json
//! {
//!   "format_version": "1.0",
//!   "image": { "file_name": "x.png", "relative_path": "x.png",
//!              "width": 100, "height": 200 },
//!   "detections": [
//!     { "id": 0, "bbox": [1.0, 2.0, 3.0, 4.0], "score": 0.9 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::slicer::ImageResult;

/// Schema version written into every payload.
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
struct ImageSection<'a> {
    file_name: &'a str,
    relative_path: &'a str,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    id: usize,
    bbox: [f32; 4],
    score: f32,
}

/// The serialized form of one [`ImageResult`].
#[derive(Debug, Serialize)]
pub struct PerImagePayload<'a> {
    format_version: &'static str,
    image: ImageSection<'a>,
    detections: Vec<DetectionRecord>,
}

impl<'a> PerImagePayload<'a> {
    pub fn new(result: &'a ImageResult) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            image: ImageSection {
                file_name: &result.meta.file_name,
                relative_path: &result.meta.relative_path,
                width: result.meta.width,
                height: result.meta.height,
            },
            detections: result
                .detections
                .iter()
                .map(|det| DetectionRecord {
                    id: det.id,
                    bbox: det.bbox.to_array(),
                    score: det.score,
                })
                .collect(),
        }
    }
}

/// Output writing failures.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize detections for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write one image's detections as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_per_image_json(output_path: &Path, result: &ImageResult) -> Result<(), OutputError> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let payload = PerImagePayload::new(result);
    let mut text =
        serde_json::to_string_pretty(&payload).map_err(|source| OutputError::Serialize {
            path: output_path.to_path_buf(),
            source,
        })?;
    text.push('\n');

    fs::write(output_path, text).map_err(|source| OutputError::Write {
        path: output_path.to_path_buf(),
        source,
    })
}
