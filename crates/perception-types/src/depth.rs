//! Dense depth fields and region masks

use ndarray::{s, Array2};
use crate::detection::BoundingBox;
use crate::PerceptionError;

/// A depth sample is usable when it is a number and strictly positive
#[inline]
pub fn is_valid_depth(depth: f32) -> bool {
    !depth.is_nan() && depth > 0.0
}

/// Per-pixel depth in metres, indexed `[row, col]`.
///
/// Pixels without a stereo correspondence hold NaN or a non-positive value.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthField {
    data: Array2<f32>,
}

impl DepthField {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Field with the same depth everywhere
    pub fn constant(height: usize, width: usize, depth: f32) -> Self {
        Self::new(Array2::from_elem((height, width), depth))
    }

    /// Field with no valid sample
    pub fn invalid(height: usize, width: usize) -> Self {
        Self::constant(height, width, f32::NAN)
    }

    /// Build from row-major samples
    pub fn from_vec(height: usize, width: usize, values: Vec<f32>) -> Result<Self, PerceptionError> {
        let actual = values.len();
        Array2::from_shape_vec((height, width), values)
            .map(Self::new)
            .map_err(|_| PerceptionError::FrameSize {
                expected: height * width,
                actual,
            })
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Raw sample, valid or not
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data.get((row, col)).copied()
    }

    /// Sample at a possibly out-of-frame pixel, only if it is a valid depth
    pub fn valid_at(&self, row: i64, col: i64) -> Option<f32> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.get(row, col).filter(|&d| is_valid_depth(d))
    }

    /// Overwrite every pixel inside `bbox` (clamped to the field)
    pub fn fill_region(&mut self, bbox: &BoundingBox, depth: f32) {
        let (rows, cols) = clamped_region(bbox, self.height(), self.width());
        self.data.slice_mut(s![rows.0..rows.1, cols.0..cols.1]).fill(depth);
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }
}

/// Binary object mask, `true` inside the object, indexed `[row, col]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Array2<bool>,
}

impl Mask {
    pub fn new(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// Mask with nothing selected
    pub fn empty(height: usize, width: usize) -> Self {
        Self::new(Array2::from_elem((height, width), false))
    }

    /// Threshold an 8-bit segmenter mask (foreground is > 128)
    pub fn from_gray(gray: &Array2<u8>) -> Self {
        Self::new(gray.mapv(|v| v > 128))
    }

    /// Fill the bounding box, clamped to a `height` x `width` frame.
    ///
    /// Used whenever a detection has no segmentation mask.
    pub fn from_bbox(bbox: &BoundingBox, height: usize, width: usize) -> Self {
        let mut mask = Self::empty(height, width);
        let (rows, cols) = clamped_region(bbox, height, width);
        mask.data.slice_mut(s![rows.0..rows.1, cols.0..cols.1]).fill(true);
        mask
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of selected pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.data.get((row, col)).copied().unwrap_or(false)
    }

    /// Selected pixel coordinates as (row, col)
    pub fn selected(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data
            .indexed_iter()
            .filter_map(|(idx, &inside)| inside.then_some(idx))
    }
}

/// Truncated bbox corners clamped to the frame, as ((row0, row1), (col0, col1))
fn clamped_region(bbox: &BoundingBox, height: usize, width: usize) -> ((usize, usize), (usize, usize)) {
    let (x1, y1, x2, y2) = bbox.pixel_corners();
    let clamp = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
    let (r0, r1) = (clamp(y1, height), clamp(y2, height));
    let (c0, c1) = (clamp(x1, width), clamp(x2, width));
    ((r0, r1.max(r0)), (c0, c1.max(c0)))
}
