//! Tile grid generation for sliced inference.

use crate::slicer::rect::Rect;

/// An axis-aligned rectangular sub-region of the source image, in
/// full-image pixel coordinates.
///
/// Tiles are generated, consumed and discarded within one image's
/// processing; they carry no state beyond their geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Left edge offset in the source image
    pub x: u32,
    /// Top edge offset in the source image
    pub y: u32,
    /// Tile width in pixels
    pub width: u32,
    /// Tile height in pixels
    pub height: u32,
}

impl Tile {
    /// Create a new tile from its offset and dimensions.
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tile area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Remap a tile-local box into full-image coordinates.
    ///
    /// Tiles are cropped at native resolution, so the remap is a pure
    /// additive offset; no scaling is involved.
    #[inline]
    pub fn to_image_coords(&self, local: Rect) -> Rect {
        local.translate(self.x as f32, self.y as f32)
    }
}

/// Compute the overlapping tile covering of a `width` x `height` image.
///
/// The stride along each axis is `tile * (1 - overlap)` rounded to an
/// integer, at least 1. The last tile along each axis is shifted inward
/// (never enlarged) so its far edge meets the image boundary exactly, so
/// the union of tiles covers every pixel even when the image extent is not
/// a multiple of the stride. A tile dimension that meets or exceeds the
/// image extent degenerates to a single full-extent span on that axis.
///
/// Tiles come out in row-major order (top-to-bottom, left-to-right) and
/// the function is pure: identical inputs always produce the identical,
/// identically-ordered sequence, which the merge stage relies on for its
/// deterministic tie-break.
pub fn tile_grid(
    image_width: u32,
    image_height: u32,
    tile_width: u32,
    tile_height: u32,
    overlap_width_ratio: f32,
    overlap_height_ratio: f32,
) -> Vec<Tile> {
    let tile_w = tile_width.min(image_width);
    let tile_h = tile_height.min(image_height);

    let xs = axis_starts(image_width, tile_w, overlap_width_ratio);
    let ys = axis_starts(image_height, tile_h, overlap_height_ratio);

    let mut tiles = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            tiles.push(Tile::new(x, y, tile_w, tile_h));
        }
    }
    tiles
}

/// Tile start offsets along one axis.
///
/// Invariant: consecutive spans overlap or touch (stride <= tile), and the
/// final span ends exactly at `extent`.
fn axis_starts(extent: u32, tile: u32, overlap: f32) -> Vec<u32> {
    if tile >= extent {
        return vec![0];
    }

    let stride = ((tile as f32 * (1.0 - overlap)).round() as u32).max(1);

    let mut starts = Vec::new();
    let mut pos = 0u32;
    loop {
        if pos + tile >= extent {
            // Shift the last tile inward to meet the boundary.
            starts.push(extent - tile);
            break;
        }
        starts.push(pos);
        pos += stride;
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pixel of the image must fall inside at least one tile.
    fn assert_covers(tiles: &[Tile], width: u32, height: u32) {
        let mut covered = vec![false; (width * height) as usize];
        for t in tiles {
            for y in t.y..t.y + t.height {
                for x in t.x..t.x + t.width {
                    assert!(x < width && y < height, "tile exceeds image bounds");
                    covered[(y * width + x) as usize] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c), "coverage gap");
    }

    #[test]
    fn test_exact_multiple() {
        let tiles = tile_grid(100, 100, 50, 50, 0.0, 0.0);
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0], Tile::new(0, 0, 50, 50));
        assert_eq!(tiles[1], Tile::new(50, 0, 50, 50));
        assert_eq!(tiles[2], Tile::new(0, 50, 50, 50));
        assert_eq!(tiles[3], Tile::new(50, 50, 50, 50));
        assert_covers(&tiles, 100, 100);
    }

    #[test]
    fn test_last_tile_shifted_inward() {
        // 110 wide with 50-px tiles and no overlap: starts 0, 50, then the
        // last tile is pulled back to 60 so it ends at 110.
        let tiles = tile_grid(110, 50, 50, 50, 0.0, 0.0);
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![0, 50, 60]);
        assert!(tiles.iter().all(|t| t.width == 50));
        assert_covers(&tiles, 110, 50);
    }

    #[test]
    fn test_overlap_stride() {
        // 20% overlap on 640 tiles: stride = 512.
        let tiles = tile_grid(1280, 640, 640, 640, 0.2, 0.2);
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![0, 512, 640]);
        assert_covers(&tiles, 1280, 640);
    }

    #[test]
    fn test_tile_larger_than_image() {
        let tiles = tile_grid(320, 200, 640, 640, 0.2, 0.2);
        assert_eq!(tiles, vec![Tile::new(0, 0, 320, 200)]);
    }

    #[test]
    fn test_row_major_order() {
        let tiles = tile_grid(100, 100, 60, 60, 0.0, 0.0);
        // Rows before columns; within a row, left-to-right.
        assert_eq!(
            tiles,
            vec![
                Tile::new(0, 0, 60, 60),
                Tile::new(40, 0, 60, 60),
                Tile::new(0, 40, 60, 60),
                Tile::new(40, 40, 60, 60),
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let a = tile_grid(1920, 1080, 640, 640, 0.2, 0.2);
        let b = tile_grid(1920, 1080, 640, 640, 0.2, 0.2);
        assert_eq!(a, b);
        assert_covers(&a, 1920, 1080);
    }

    #[test]
    fn test_no_degenerate_tiles() {
        for (w, h) in [(1u32, 1u32), (7, 3), (641, 639), (1920, 1080)] {
            let tiles = tile_grid(w, h, 640, 640, 0.25, 0.25);
            assert!(tiles.iter().all(|t| t.area() > 0));
            assert_covers(&tiles, w, h);
        }
    }

    #[test]
    fn test_remap_round_trip() {
        let tile = Tile::new(100, 200, 640, 640);
        let remapped = tile.to_image_coords(Rect::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(remapped, Rect::new(105.0, 205.0, 115.0, 215.0));
    }
}
