use image::RgbImage;
use slicedet_rs::{
    Detection, DetectionPipeline, DetectionSource, ImageMeta, SliceParams,
};

/// Deterministic fake backend: reports a fixed set of full-image boxes,
/// translated into whatever region it is asked about and clipped to it.
/// This is what a real detector looks like from the pipeline's side when
/// the same people are visible from several overlapping tiles.
struct FakeYolo {
    people: Vec<Detection>,
}

#[derive(Debug, thiserror::Error)]
#[error("fake yolo failure")]
struct FakeYoloError;

impl FakeYolo {
    fn new(people: Vec<Detection>) -> Self {
        Self { people }
    }

    /// The pipeline crops tiles at native resolution; recover the region
    /// offset by matching sizes against the known 200x120 source image.
    /// Tiles are 100x100 with 0.25 overlap, so offsets are unambiguous
    /// from the scripted call order.
    fn visible_in(&self, x0: f32, y0: f32, w: f32, h: f32) -> Vec<Detection> {
        self.people
            .iter()
            .filter(|p| {
                p.bbox.xmin >= x0
                    && p.bbox.ymin >= y0
                    && p.bbox.xmax <= x0 + w
                    && p.bbox.ymax <= y0 + h
            })
            .map(|p| Detection::from_rect(p.bbox.translate(-x0, -y0), p.score, p.class_id))
            .collect()
    }
}

/// Region offsets for the fixed test geometry: 200x120 image, 100x100
/// tiles, 0.25 overlap -> stride 75 -> x starts [0, 75, 100], tile height
/// clipped to 100... height 120 -> y starts [0, 20].
const TILE_OFFSETS: [(f32, f32); 6] = [
    (0.0, 0.0),
    (75.0, 0.0),
    (100.0, 0.0),
    (0.0, 20.0),
    (75.0, 20.0),
    (100.0, 20.0),
];

struct TiledFake {
    inner: FakeYolo,
    call: usize,
}

impl DetectionSource for TiledFake {
    type Error = FakeYoloError;

    fn detect(
        &mut self,
        region: &RgbImage,
        _confidence_floor: f32,
    ) -> Result<Vec<Detection>, Self::Error> {
        let (x0, y0) = TILE_OFFSETS.get(self.call).copied().ok_or(FakeYoloError)?;
        self.call += 1;
        Ok(self
            .inner
            .visible_in(x0, y0, region.width() as f32, region.height() as f32))
    }
}

fn test_params() -> SliceParams {
    SliceParams {
        slice_width: 100,
        slice_height: 100,
        overlap_width_ratio: 0.25,
        overlap_height_ratio: 0.25,
        ..SliceParams::default()
    }
}

fn meta() -> ImageMeta {
    ImageMeta {
        file_name: "street.png".into(),
        relative_path: "street.png".into(),
        width: 200,
        height: 120,
    }
}

fn run(people: Vec<Detection>) -> Vec<(usize, [f32; 4], f32)> {
    let detector = TiledFake {
        inner: FakeYolo::new(people),
        call: 0,
    };
    let mut pipeline = DetectionPipeline::new(detector, test_params());
    let image = RgbImage::new(200, 120);
    let result = pipeline.process_image(&image, meta()).unwrap();
    result
        .detections
        .iter()
        .map(|d| (d.id, d.bbox.to_array(), d.score))
        .collect()
}

#[test]
fn test_end_to_end_dedup_and_ranking() {
    // Two people: one fully inside the overlap band of the first two tile
    // columns (seen twice), one only in the right-most column.
    let people = vec![
        Detection::new(80.0, 30.0, 95.0, 70.0, 0.85, 0),
        Detection::new(150.0, 40.0, 165.0, 80.0, 0.6, 0),
    ];

    let output = run(people);
    assert_eq!(output.len(), 2);

    // Ordered by score descending with sequential ids.
    assert_eq!(output[0].0, 0);
    assert_eq!(output[0].1, [80.0, 30.0, 95.0, 70.0]);
    assert_eq!(output[0].2, 0.85);
    assert_eq!(output[1].0, 1);
    assert_eq!(output[1].2, 0.6);
}

#[test]
fn test_determinism_across_runs() {
    let people = vec![
        Detection::new(10.0, 10.0, 25.0, 50.0, 0.9, 0),
        Detection::new(80.0, 30.0, 95.0, 70.0, 0.7, 0),
        Detection::new(150.0, 40.0, 165.0, 80.0, 0.7, 0),
        Detection::new(110.0, 5.0, 125.0, 45.0, 0.4, 0),
    ];

    let first = run(people.clone());
    let second = run(people);
    assert_eq!(first, second);
}

#[test]
fn test_truncation_keeps_top_scores() {
    let people = vec![
        Detection::new(10.0, 10.0, 25.0, 50.0, 0.9, 0),
        Detection::new(80.0, 30.0, 95.0, 70.0, 0.7, 0),
        Detection::new(150.0, 40.0, 165.0, 80.0, 0.5, 0),
        Detection::new(110.0, 5.0, 125.0, 45.0, 0.3, 0),
        Detection::new(30.0, 60.0, 45.0, 100.0, 0.2, 0),
    ];

    let detector = TiledFake {
        inner: FakeYolo::new(people),
        call: 0,
    };
    let params = SliceParams {
        max_detections: Some(3),
        ..test_params()
    };
    let mut pipeline = DetectionPipeline::new(detector, params);
    let image = RgbImage::new(200, 120);
    let result = pipeline.process_image(&image, meta()).unwrap();

    let scores: Vec<f32> = result.detections.iter().map(|d| d.score).collect();
    assert_eq!(scores, vec![0.9, 0.7, 0.5]);
    let ids: Vec<usize> = result.detections.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_zero_detections_is_success() {
    let output = run(vec![]);
    assert!(output.is_empty());
}

#[test]
fn test_non_person_classes_dropped() {
    let people = vec![
        Detection::new(10.0, 10.0, 25.0, 50.0, 0.9, 2),
        Detection::new(80.0, 30.0, 95.0, 70.0, 0.4, 0),
    ];
    let output = run(people);
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].2, 0.4);
}
