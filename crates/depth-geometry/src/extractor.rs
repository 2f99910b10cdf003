//! Region depth extraction

use perception_types::{is_valid_depth, DepthField, Mask};

/// Reduces a depth field region to one distance.
///
/// The median is taken over valid samples only, so a handful of stereo
/// mismatches along the object silhouette do not drag the estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthExtractor;

impl DepthExtractor {
    /// Median of the valid depth samples selected by `mask`.
    ///
    /// Returns `None` when the mask selects no valid sample. Mask pixels
    /// falling outside the depth field are ignored.
    pub fn extract(&self, depth: &DepthField, mask: &Mask) -> Option<f32> {
        let mut samples: Vec<f32> = mask
            .selected()
            .filter_map(|(row, col)| depth.get(row, col))
            .filter(|&d| is_valid_depth(d))
            .collect();
        median(&mut samples)
    }

    /// Depth of a single pixel; the one-pixel-mask case of [`extract`](Self::extract)
    pub fn extract_pixel(&self, depth: &DepthField, row: i64, col: i64) -> Option<f32> {
        depth.valid_at(row, col)
    }
}

/// Median of `values`, averaging the two middle values for even lengths.
///
/// Reorders `values` in place.
pub fn median(values: &mut [f32]) -> Option<f32> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return Some(upper);
    }
    let lower = lower.iter().copied().max_by(f32::total_cmp)?;
    Some((lower + upper) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use perception_types::BoundingBox;
    use proptest::prelude::*;

    fn reference_median(values: &[f32]) -> Option<f32> {
        let mut sorted: Vec<f32> = values.to_vec();
        sorted.sort_by(f32::total_cmp);
        let n = sorted.len();
        match n {
            0 => None,
            _ if n % 2 == 1 => Some(sorted[n / 2]),
            _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
        }
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_constant_region() {
        let depth = DepthField::constant(480, 640, 3.0);
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 300.0).unwrap();
        let mask = Mask::from_bbox(&bbox, 480, 640);
        assert_eq!(DepthExtractor.extract(&depth, &mask), Some(3.0));
    }

    #[test]
    fn test_invalid_samples_ignored() {
        let depth = DepthField::from_vec(1, 6, vec![f32::NAN, 0.0, -2.0, 4.0, 6.0, 100.0]).unwrap();
        let mut bits = Array2::from_elem((1, 6), true);
        bits[[0, 5]] = false;
        let mask = Mask::new(bits);
        // valid in-mask samples: 4, 6
        assert_eq!(DepthExtractor.extract(&depth, &mask), Some(5.0));
    }

    #[test]
    fn test_all_invalid_region() {
        let depth = DepthField::invalid(10, 10);
        let mask = Mask::from_bbox(&BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap(), 10, 10);
        assert_eq!(DepthExtractor.extract(&depth, &mask), None);
    }

    #[test]
    fn test_outlier_at_edge_does_not_move_median() {
        let depth = DepthField::from_vec(1, 5, vec![3.0, 3.1, 2.9, 3.0, 45.0]).unwrap();
        let mask = Mask::new(Array2::from_elem((1, 5), true));
        assert_eq!(DepthExtractor.extract(&depth, &mask), Some(3.0));
    }

    proptest! {
        #[test]
        fn prop_extract_is_median_of_valid_in_mask(
            cells in proptest::collection::vec(
                (prop_oneof![Just(f32::NAN), -5.0f32..0.0, 0.01f32..80.0], any::<bool>()),
                1..120,
            )
        ) {
            let width = cells.len();
            let depth = DepthField::from_vec(1, width, cells.iter().map(|c| c.0).collect()).unwrap();
            let mask = Mask::new(Array2::from_shape_vec((1, width), cells.iter().map(|c| c.1).collect()).unwrap());

            let valid: Vec<f32> = cells
                .iter()
                .filter(|(d, inside)| *inside && is_valid_depth(*d))
                .map(|(d, _)| *d)
                .collect();

            prop_assert_eq!(DepthExtractor.extract(&depth, &mask), reference_median(&valid));
        }
    }
}
