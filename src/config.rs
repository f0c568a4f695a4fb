//! TOML application configuration.
//!
//! The config file carries five tables: `[input]`, `[output]`,
//! `[visualization]`, `[model]` and `[sahi]`. Every key has a default, so
//! a minimal file only needs the directories it wants to override. The
//! core pipeline never sees this module; it receives an already-validated
//! [`SliceParams`] built by [`AppConfig::slice_params`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::slicer::{PERSON_CLASS_ID, PoolPolicy, SliceParams};

/// File extensions considered images when scanning the input directory.
pub const DEFAULT_INPUT_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Default visualization box color (green).
pub const DEFAULT_VIS_BOX_COLOR: [u8; 3] = [0, 255, 0];

/// `[input]` table: where images come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: PathBuf,
    pub recursive: bool,
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/dataset"),
            recursive: false,
            extensions: DEFAULT_INPUT_EXTENSIONS.map(String::from).to_vec(),
        }
    }
}

/// `[output]` table: where per-image JSON goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Re-run images whose output JSON already exists
    pub overwrite: bool,
    /// Write a JSON file even when an image has zero detections
    pub write_empty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/output"),
            overwrite: true,
            write_empty: true,
        }
    }
}

/// `[visualization]` table: box overlay rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// RGB box color
    pub box_color: [u8; 3],
    /// Box outline thickness in pixels
    pub line_width: u32,
    /// Draw an `id:score` label at each box's top-left corner
    pub write_label: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("data/visual_output"),
            box_color: DEFAULT_VIS_BOX_COLOR,
            line_width: 2,
            write_label: true,
        }
    }
}

/// `[model]` table.
///
/// `weights`, `device` and `imgsz` are opaque hints for the detector
/// backend; the pipeline passes none of them itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights: String,
    pub device: String,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub imgsz: u32,
    pub max_det: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights: String::from("data/weights/yolov8x.pt"),
            device: String::from("cpu"),
            confidence_threshold: 0.1,
            iou_threshold: 0.5,
            imgsz: 1280,
            max_det: 300,
        }
    }
}

/// `[sahi]` table: slicing geometry and duplicate-merge tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SahiConfig {
    pub enabled: bool,
    pub slice_height: u32,
    pub slice_width: u32,
    pub overlap_height_ratio: f32,
    pub overlap_width_ratio: f32,
    /// Duplicate suppression scheme; only "NMS" is supported
    pub postprocess_type: String,
    /// Overlap metric; only "IOU" is supported
    pub postprocess_match_metric: String,
    pub postprocess_match_threshold: f32,
    /// Pool one whole-image pass with the tiled passes
    pub full_image_pass: bool,
    /// Tie-break between whole-image and tiled detections
    pub pool_policy: PoolPolicy,
}

impl Default for SahiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slice_height: 640,
            slice_width: 640,
            overlap_height_ratio: 0.2,
            overlap_width_ratio: 0.2,
            postprocess_type: String::from("NMS"),
            postprocess_match_metric: String::from("IOU"),
            postprocess_match_threshold: 0.5,
            full_image_pass: false,
            pool_policy: PoolPolicy::default(),
        }
    }
}

/// The whole application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub visualization: VisualizationConfig,
    pub model: ModelConfig,
    pub sahi: SahiConfig,
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Check every value against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.model.imgsz == 0 {
            return invalid("model.imgsz must be > 0");
        }
        if self.model.max_det == 0 {
            return invalid("model.max_det must be > 0");
        }
        if !(0.0..=1.0).contains(&self.model.confidence_threshold) {
            return invalid("model.confidence_threshold must be in [0,1]");
        }
        if !(0.0..=1.0).contains(&self.model.iou_threshold) {
            return invalid("model.iou_threshold must be in [0,1]");
        }
        if self.sahi.slice_height == 0 || self.sahi.slice_width == 0 {
            return invalid("sahi.slice_height/slice_width must be > 0");
        }
        if !(0.0..1.0).contains(&self.sahi.overlap_height_ratio) {
            return invalid("sahi.overlap_height_ratio must be in [0,1)");
        }
        if !(0.0..1.0).contains(&self.sahi.overlap_width_ratio) {
            return invalid("sahi.overlap_width_ratio must be in [0,1)");
        }
        if !(0.0..=1.0).contains(&self.sahi.postprocess_match_threshold) {
            return invalid("sahi.postprocess_match_threshold must be in [0,1]");
        }
        if self.sahi.postprocess_type != "NMS" {
            return Err(ConfigError::Invalid(format!(
                "sahi.postprocess_type \"{}\" is not supported (only \"NMS\")",
                self.sahi.postprocess_type
            )));
        }
        if self.sahi.postprocess_match_metric != "IOU" {
            return Err(ConfigError::Invalid(format!(
                "sahi.postprocess_match_metric \"{}\" is not supported (only \"IOU\")",
                self.sahi.postprocess_match_metric
            )));
        }
        if self.visualization.line_width == 0 {
            return invalid("visualization.line_width must be > 0");
        }
        if self.input.extensions.is_empty() {
            return invalid("input.extensions must not be empty");
        }
        Ok(())
    }

    /// Build the validated numeric parameters the core pipeline consumes.
    pub fn slice_params(&self) -> SliceParams {
        SliceParams {
            slice_width: self.sahi.slice_width,
            slice_height: self.sahi.slice_height,
            overlap_width_ratio: self.sahi.overlap_width_ratio,
            overlap_height_ratio: self.sahi.overlap_height_ratio,
            confidence_floor: self.model.confidence_threshold,
            match_threshold: self.sahi.postprocess_match_threshold,
            max_detections: Some(self.model.max_det),
            target_class: PERSON_CLASS_ID,
            slicing_enabled: self.sahi.enabled,
            full_image_pass: self.sahi.full_image_pass,
            pool_policy: self.sahi.pool_policy,
        }
    }
}

/// Load and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}
