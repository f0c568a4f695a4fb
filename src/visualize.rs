//! Detection overlay rendering.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect as PixelRect;

use crate::config::VisualizationConfig;
use crate::slicer::RankedDetection;

/// Embedded label font (DejaVu Sans).
const FONT_DATA: &[u8] = include_bytes!("../assets/font.ttf");

const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_PADDING: i32 = 2;

/// Visualization failures.
#[derive(Debug, thiserror::Error)]
pub enum VisualizeError {
    #[error("failed to create visualization directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode visualization {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("embedded label font is invalid")]
    Font(#[source] ab_glyph::InvalidFont),
}

/// Draw detection boxes over a copy of the source image and save it.
///
/// Box coordinates are clamped to the canvas for drawing only; the
/// underlying result is untouched. Boxes degenerate after clamping are
/// skipped. `line_width` is rendered as concentric one-pixel outlines.
/// With `write_label` set, each box gets an `id:score` label just inside
/// its top-left corner.
pub fn save_visualization(
    image: &RgbImage,
    detections: &[RankedDetection],
    output_path: &Path,
    style: &VisualizationConfig,
) -> Result<(), VisualizeError> {
    let mut canvas = image.clone();
    let color = Rgb(style.box_color);

    let font = if style.write_label {
        Some(FontRef::try_from_slice(FONT_DATA).map_err(VisualizeError::Font)?)
    } else {
        None
    };

    for det in detections {
        draw_box(&mut canvas, det, color, style.line_width, font.as_ref());
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| VisualizeError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    canvas.save(output_path).map_err(|source| VisualizeError::Encode {
        path: output_path.to_path_buf(),
        source,
    })
}

fn draw_box(
    canvas: &mut RgbImage,
    det: &RankedDetection,
    color: Rgb<u8>,
    line_width: u32,
    font: Option<&FontRef<'_>>,
) {
    // Nothing to clamp against on a zero-area canvas.
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let (w, h) = (canvas.width() as f32, canvas.height() as f32);

    let xmin = det.bbox.xmin.clamp(0.0, w - 1.0).floor() as i32;
    let ymin = det.bbox.ymin.clamp(0.0, h - 1.0).floor() as i32;
    let xmax = det.bbox.xmax.clamp(0.0, w - 1.0).ceil() as i32;
    let ymax = det.bbox.ymax.clamp(0.0, h - 1.0).ceil() as i32;

    if xmin >= xmax || ymin >= ymax {
        return;
    }

    for inset in 0..line_width as i32 {
        let x = xmin + inset;
        let y = ymin + inset;
        let width = xmax - xmin - 2 * inset;
        let height = ymax - ymin - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            PixelRect::at(x, y).of_size(width as u32, height as u32),
            color,
        );
    }

    if let Some(font) = font {
        let label = format!("{}:{:.2}", det.id, det.score);
        draw_text_mut(
            canvas,
            color,
            xmin + LABEL_PADDING,
            ymin + LABEL_PADDING,
            PxScale::from(LABEL_FONT_SIZE),
            font,
            &label,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::Rect;

    fn detection(bbox: Rect) -> RankedDetection {
        RankedDetection {
            id: 0,
            bbox,
            score: 0.9,
        }
    }

    fn colored_pixels(path: &Path) -> usize {
        let rendered = image::open(path).unwrap().to_rgb8();
        rendered.pixels().filter(|p| *p != &Rgb([0, 0, 0])).count()
    }

    #[test]
    fn test_saves_png_with_box() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("vis/x.png");
        let image = RgbImage::new(50, 50);
        let style = VisualizationConfig {
            write_label: false,
            ..VisualizationConfig::default()
        };

        save_visualization(
            &image,
            &[detection(Rect::new(10.0, 10.0, 30.0, 30.0))],
            &out_path,
            &style,
        )
        .unwrap();

        let rendered = image::open(&out_path).unwrap().to_rgb8();
        assert_eq!(rendered.get_pixel(10, 10), &Rgb([0, 255, 0]));
        assert_eq!(rendered.get_pixel(20, 20), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_label_drawn_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::new(100, 100);
        let boxes = [detection(Rect::new(10.0, 10.0, 90.0, 90.0))];

        let unlabeled_path = dir.path().join("plain.png");
        let style = VisualizationConfig {
            write_label: false,
            ..VisualizationConfig::default()
        };
        save_visualization(&image, &boxes, &unlabeled_path, &style).unwrap();

        let labeled_path = dir.path().join("labeled.png");
        let style = VisualizationConfig::default();
        save_visualization(&image, &boxes, &labeled_path, &style).unwrap();

        // The "0:0.90" text inside the box adds pixels beyond the outline.
        assert!(colored_pixels(&labeled_path) > colored_pixels(&unlabeled_path));
    }

    #[test]
    fn test_out_of_bounds_box_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("x.png");
        let image = RgbImage::new(20, 20);
        let style = VisualizationConfig::default();

        // Box spills past the canvas on all sides; must not panic.
        save_visualization(
            &image,
            &[detection(Rect::new(-5.0, -5.0, 40.0, 40.0))],
            &out_path,
            &style,
        )
        .unwrap();
    }

    #[test]
    fn test_zero_area_canvas_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("x.png");
        let image = RgbImage::new(0, 0);
        let style = VisualizationConfig::default();

        // Drawing is skipped; the encoder may refuse the empty canvas but
        // the call must return instead of panicking.
        let _ = save_visualization(
            &image,
            &[detection(Rect::new(1.0, 1.0, 5.0, 5.0))],
            &out_path,
            &style,
        );
    }

    #[test]
    fn test_degenerate_box_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("x.png");
        let image = RgbImage::new(20, 20);
        let style = VisualizationConfig::default();

        save_visualization(
            &image,
            &[detection(Rect::new(5.0, 5.0, 5.0, 5.0))],
            &out_path,
            &style,
        )
        .unwrap();

        let rendered = image::open(&out_path).unwrap().to_rgb8();
        assert!(rendered.pixels().all(|p| p == &Rgb([0, 0, 0])));
    }
}
