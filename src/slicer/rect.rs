/// Axis-aligned bounding box in full-image pixel coordinates.
///
/// Coordinates follow image convention: origin at the top-left corner,
/// x growing right, y growing down. Boxes are stored as corner pairs
/// (`xmin`, `ymin`, `xmax`, `ymax`), the format the output schema and the
/// annotation tooling use.
///
/// Degenerate or slightly out-of-bounds boxes are carried through as the
/// detector produced them; clamping to the image canvas is the consumer's
/// decision (the visualizer clamps for drawing, the JSON writer does not).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge x coordinate
    pub xmin: f32,
    /// Top edge y coordinate
    pub ymin: f32,
    /// Right edge x coordinate
    pub xmax: f32,
    /// Bottom edge y coordinate
    pub ymax: f32,
}

impl Rect {
    /// Create a new Rect from corner coordinates (TLBR format).
    #[inline]
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Create a Rect from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            xmin: x,
            ymin: y,
            xmax: x + width,
            ymax: y + height,
        }
    }

    /// Width of the box.
    #[inline]
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    /// Height of the box.
    #[inline]
    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Area of the box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Translate the box by an offset on both axes.
    ///
    /// This is the tile-to-image coordinate remap: tile-local boxes become
    /// full-image boxes by adding the tile's top-left offset.
    #[inline]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            xmin: self.xmin + dx,
            ymin: self.ymin + dy,
            xmax: self.xmax + dx,
            ymax: self.ymax + dy,
        }
    }

    /// Corner coordinates as `[xmin, ymin, xmax, ymax]`.
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    /// Calculate Intersection over Union (IoU) with another box.
    ///
    /// Returns 0 when the union is empty (both boxes degenerate).
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.xmin.max(other.xmin);
        let y1 = self.ymin.max(other.ymin);
        let x2 = self.xmax.min(other.xmax);
        let y2 = self.ymax.min(other.ymax);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

use ndarray::Array2;

/// Calculate the IoU matrix between two sets of boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
