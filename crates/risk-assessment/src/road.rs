//! Ambient road-condition risk
//!
//! Long-term flags (low visibility, wet road) come from grayscale image
//! statistics. Short-term flags (curve, narrow road) come from lane-segment
//! angles in the segmentation map and from detection-box density.

use image::{imageops, GrayImage};
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use serde::{Deserialize, Serialize};
use tracing::debug;
use perception_types::Detection;

use crate::config::RoadRiskConfig;
use crate::lines::{detect_segments, SegmentDetectionOptions};
use crate::statistics::Moments;

/// Long-horizon conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermRisk {
    pub low_visibility: bool,
    pub wet_road: bool,
}

/// Near-horizon geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermRisk {
    pub curve: bool,
    pub narrow_road: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadRiskFlags {
    pub long_term: LongTermRisk,
    pub short_term: ShortTermRisk,
}

impl RoadRiskFlags {
    pub fn any(&self) -> bool {
        self.long_term.low_visibility
            || self.long_term.wet_road
            || self.short_term.curve
            || self.short_term.narrow_road
    }
}

/// Measurements behind the flags, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientMetrics {
    pub mean_brightness: f64,
    /// Intensity standard deviation
    pub contrast: f64,
    /// Gradient-magnitude variance over mean, lower half of the frame
    pub texture: f64,
    /// Variance of lane-segment angles (deg^2); `None` without segments
    pub angle_variance: Option<f64>,
    pub segment_count: usize,
    /// Summed box area over the reference area
    pub box_density: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadRiskReport {
    pub flags: RoadRiskFlags,
    pub metrics: AmbientMetrics,
}

/// Stateless road-condition assessor
#[derive(Debug, Clone, Default)]
pub struct RoadRiskAssessor {
    config: RoadRiskConfig,
}

impl RoadRiskAssessor {
    pub fn new(config: RoadRiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoadRiskConfig {
        &self.config
    }

    pub fn assess_long_term(&self, frame: &GrayImage) -> LongTermRisk {
        let mut metrics = AmbientMetrics::default();
        self.measure_long_term(frame, &mut metrics)
    }

    pub fn assess_short_term(&self, segmentation: Option<&GrayImage>, detections: &[Detection]) -> ShortTermRisk {
        let mut metrics = AmbientMetrics::default();
        self.measure_short_term(segmentation, detections, &mut metrics)
    }

    pub fn assess_all(
        &self,
        frame: &GrayImage,
        segmentation: Option<&GrayImage>,
        detections: &[Detection],
    ) -> RoadRiskReport {
        let mut metrics = AmbientMetrics::default();
        let long_term = self.measure_long_term(frame, &mut metrics);
        let short_term = self.measure_short_term(segmentation, detections, &mut metrics);
        let flags = RoadRiskFlags { long_term, short_term };

        debug!(
            brightness = metrics.mean_brightness,
            contrast = metrics.contrast,
            texture = metrics.texture,
            density = metrics.box_density,
            segments = metrics.segment_count,
            ?flags,
            "Road risk assessed"
        );

        RoadRiskReport { flags, metrics }
    }

    fn measure_long_term(&self, frame: &GrayImage, metrics: &mut AmbientMetrics) -> LongTermRisk {
        let intensities: Vec<f64> = frame.pixels().map(|p| p[0] as f64).collect();
        let intensity = Moments::compute(&intensities);
        metrics.mean_brightness = intensity.mean;
        metrics.contrast = intensity.std_dev();

        let gradient = lower_half_gradient(frame);
        metrics.texture = gradient.variance / (gradient.mean + 1e-6);

        LongTermRisk {
            low_visibility: metrics.mean_brightness < self.config.brightness_threshold
                || metrics.contrast < self.config.contrast_threshold,
            wet_road: metrics.texture < self.config.texture_threshold,
        }
    }

    fn measure_short_term(
        &self,
        segmentation: Option<&GrayImage>,
        detections: &[Detection],
        metrics: &mut AmbientMetrics,
    ) -> ShortTermRisk {
        let curve = match segmentation {
            Some(seg) => {
                let angles = self.lane_angles(seg);
                metrics.segment_count = angles.len();
                if angles.is_empty() {
                    false
                } else {
                    let variance = Moments::compute(&angles).variance;
                    metrics.angle_variance = Some(variance);
                    variance > self.config.curvature_threshold * 100.0
                }
            }
            None => false,
        };

        let total_area: f64 = detections.iter().map(|d| d.bbox.area() as f64).sum();
        metrics.box_density = total_area / self.config.reference_area();

        ShortTermRisk {
            curve,
            narrow_road: metrics.box_density > self.config.narrow_road_threshold,
        }
    }

    /// Angles (degrees) of lane segments in the lower half of a segmentation map
    fn lane_angles(&self, segmentation: &GrayImage) -> Vec<f64> {
        let (width, height) = segmentation.dimensions();
        let top = height / 2;
        let road = imageops::crop_imm(segmentation, 0, top, width, height - top).to_image();
        if road.width() == 0 || road.height() == 0 {
            return Vec::new();
        }

        let edges = canny(&road, self.config.canny_low, self.config.canny_high);
        let options = SegmentDetectionOptions {
            vote_threshold: self.config.hough_vote_threshold,
            min_length: self.config.min_line_length,
            max_gap: self.config.max_line_gap,
            ..Default::default()
        };

        detect_segments(&edges, &options)
            .iter()
            .map(|s| s.angle_deg() as f64)
            .collect()
    }
}

/// Sobel gradient-magnitude moments over rows `h/2..h`
fn lower_half_gradient(frame: &GrayImage) -> Moments {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Moments::default();
    }

    let gx = horizontal_sobel(frame);
    let gy = vertical_sobel(frame);

    let mut magnitudes = Vec::with_capacity((width * (height - height / 2)) as usize);
    for y in height / 2..height {
        for x in 0..width {
            let dx = gx.get_pixel(x, y)[0] as f64;
            let dy = gy.get_pixel(x, y)[0] as f64;
            magnitudes.push(dx.hypot(dy));
        }
    }
    Moments::compute(&magnitudes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use perception_types::BoundingBox;

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(BoundingBox::new(x1, y1, x2, y2).unwrap(), 0.8, 0, "car")
    }

    /// Bright checkerboard: high brightness, contrast and texture
    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Luma([230])
            } else {
                Luma([60])
            }
        })
    }

    #[test]
    fn test_dark_frame_low_visibility() {
        let frame = GrayImage::from_pixel(64, 48, Luma([20]));
        let risk = RoadRiskAssessor::default().assess_long_term(&frame);
        assert!(risk.low_visibility);
        // flat image: no gradient texture at all
        assert!(risk.wet_road);
    }

    #[test]
    fn test_bright_flat_frame_low_contrast() {
        let frame = GrayImage::from_pixel(64, 48, Luma([200]));
        let risk = RoadRiskAssessor::default().assess_long_term(&frame);
        assert!(risk.low_visibility);
    }

    #[test]
    fn test_textured_frame_clear() {
        let risk = RoadRiskAssessor::default().assess_long_term(&textured(64, 48));
        assert!(!risk.low_visibility);
        assert!(!risk.wet_road);
    }

    #[test]
    fn test_narrow_road_density() {
        let assessor = RoadRiskAssessor::default();
        // 400x400 = 160000 / 307200 = 0.52
        let risk = assessor.assess_short_term(None, &[detection(0.0, 0.0, 400.0, 400.0)]);
        assert!(risk.narrow_road);
        assert!(!risk.curve);

        // 0.26
        let risk = assessor.assess_short_term(None, &[detection(0.0, 0.0, 400.0, 200.0)]);
        assert!(!risk.narrow_road);

        let risk = assessor.assess_short_term(None, &[]);
        assert!(!risk.narrow_road);
    }

    #[test]
    fn test_density_uses_reference_area() {
        let report = RoadRiskAssessor::default().assess_all(
            &GrayImage::new(32, 32),
            None,
            &[detection(0.0, 0.0, 64.0, 48.0)],
        );
        assert!((report.metrics.box_density - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_straight_lanes_not_curve() {
        // two parallel vertical lane stripes in the lower half
        let seg = GrayImage::from_fn(200, 300, |x, _| {
            if (60..66).contains(&x) || (140..146).contains(&x) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let mut metrics = AmbientMetrics::default();
        let risk = RoadRiskAssessor::default().measure_short_term(Some(&seg), &[], &mut metrics);
        assert!(metrics.segment_count > 0);
        assert!(!risk.curve);
    }

    #[test]
    fn test_diverging_lanes_are_curve() {
        // one vertical and one diagonal stripe: angle spread far above 10 deg^2
        let seg = GrayImage::from_fn(300, 400, |x, y| {
            let diagonal = y as i64 - 200;
            let on_diagonal = y >= 200 && (x as i64 - (150 + diagonal)).abs() < 4;
            if (40..46).contains(&x) || on_diagonal {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let mut metrics = AmbientMetrics::default();
        let risk = RoadRiskAssessor::default().measure_short_term(Some(&seg), &[], &mut metrics);
        assert!(metrics.segment_count >= 2);
        assert!(risk.curve);
    }

    #[test]
    fn test_no_segmentation_never_curve() {
        let risk = RoadRiskAssessor::default().assess_short_term(None, &[]);
        assert_eq!(risk, ShortTermRisk::default());
    }

    #[test]
    fn test_flags_any() {
        let mut flags = RoadRiskFlags::default();
        assert!(!flags.any());
        flags.short_term.curve = true;
        assert!(flags.any());
    }
}
