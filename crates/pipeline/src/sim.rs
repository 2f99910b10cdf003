//! Simulated collaborators
//!
//! A single obstacle approaches the ego vehicle at constant speed along a
//! straight, textured road. Each backend derives the ground truth from the
//! frame timestamp, so detector, stereo engine and radar stay consistent
//! without sharing state.

use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;
use depth_geometry::{CameraIntrinsics, StereoGeometry};
use perception_types::{BoundingBox, DepthField, Detection, Mask, RadarReturn, VideoFrame};

use crate::collaborators::{
    AlertSink, BrakeActuator, CollaboratorError, Collaborators, Detector, RadarSource, Segmenter, StereoEngine,
};
use crate::config::{PipelineConfig, SimulationConfig};

/// Closest the simulated obstacle gets (meters)
const MIN_DISTANCE_M: f64 = 0.3;

/// Ground truth for the approach scene
#[derive(Debug, Clone)]
pub struct ApproachScenario {
    config: SimulationConfig,
    camera: CameraIntrinsics,
}

impl ApproachScenario {
    pub fn new(config: SimulationConfig, camera: CameraIntrinsics) -> Self {
        Self { config, camera }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Timestamp of frame `index` (seconds)
    pub fn time_of(&self, index: u32) -> f64 {
        index as f64 / self.config.fps
    }

    /// Obstacle range at `t_s`
    pub fn distance_at(&self, t_s: f64) -> f64 {
        (self.config.start_distance_m - self.config.closing_speed_mps * t_s).max(MIN_DISTANCE_M)
    }

    /// Projected obstacle box at `t_s`, clamped to the image
    pub fn bbox_at(&self, t_s: f64) -> Option<BoundingBox> {
        let d = self.distance_at(t_s);
        let (fx, fy) = (self.camera.fx as f64, self.camera.fy as f64);
        let u = self.camera.cx as f64 + fx * self.config.lateral_offset_m / d;
        let v = self.camera.cy as f64;
        let half_w = fx * self.config.object_width_m / d / 2.0;
        let half_h = fy * self.config.object_height_m / d / 2.0;

        let (w, h) = (self.config.width as f64, self.config.height as f64);
        let x1 = (u - half_w).clamp(0.0, w);
        let x2 = (u + half_w).clamp(0.0, w);
        let y1 = (v - half_h).clamp(0.0, h);
        let y2 = (v + half_h).clamp(0.0, h);
        BoundingBox::new(x1 as f32, y1 as f32, x2 as f32, y2 as f32).ok()
    }

    /// Bearing of the obstacle from the sensor axis (degrees, right positive)
    pub fn bearing_deg(&self, t_s: f64) -> f64 {
        self.config.lateral_offset_m.atan2(self.distance_at(t_s)).to_degrees()
    }

    /// Rendered left/right frames for frame `index`
    pub fn frame_pair(&self, index: u32) -> (VideoFrame, VideoFrame) {
        let t = self.time_of(index);
        let image = self.render(t);
        let timestamp_ns = (t * 1e9).round() as u64;
        let left = VideoFrame::from_rgb_image(image.clone(), timestamp_ns, index);
        let right = VideoFrame::from_rgb_image(image, timestamp_ns, index);
        (left, right)
    }

    /// Sky, textured asphalt and a dark obstacle box
    fn render(&self, t_s: f64) -> RgbImage {
        let (width, height) = (self.config.width, self.config.height);
        let bbox = self.bbox_at(t_s);
        RgbImage::from_fn(width, height, |x, y| {
            let inside = bbox.is_some_and(|b| {
                (x as f32) >= b.x1 && (x as f32) < b.x2 && (y as f32) >= b.y1 && (y as f32) < b.y2
            });
            if inside {
                image::Rgb([40, 40, 45])
            } else if y < height / 2 {
                image::Rgb([170, 190, 210])
            } else if (x / 6 + y / 6) % 2 == 0 {
                image::Rgb([150, 150, 150])
            } else {
                image::Rgb([70, 70, 70])
            }
        })
    }

    /// Lane stripes in the lower half: a straight road
    fn lane_map(&self) -> GrayImage {
        let (width, height) = (self.config.width, self.config.height);
        let left_lane = width / 4;
        let right_lane = 3 * width / 4;
        GrayImage::from_fn(width, height, |x, y| {
            let on_lane = x.abs_diff(left_lane) < 4 || x.abs_diff(right_lane) < 4;
            if y >= height / 2 && on_lane {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

/// Simulated backends for the scene described by `config`
pub fn collaborators(
    config: &PipelineConfig,
    brake: Box<dyn BrakeActuator>,
    alerts: Box<dyn AlertSink>,
) -> (ApproachScenario, Collaborators) {
    let scenario = ApproachScenario::new(config.simulation.clone(), config.left_camera);
    let collaborators = Collaborators {
        detector: Box::new(SimDetector::new(scenario.clone())),
        segmenter: Box::new(SimSegmenter::new(scenario.clone())),
        stereo: Some(Box::new(SimStereo::new(scenario.clone(), config.stereo))),
        radar: Some(Box::new(SimRadar::new(scenario.clone()))),
        brake,
        alerts,
    };
    (scenario, collaborators)
}

/// Detector reporting the obstacle box as a person
pub struct SimDetector {
    scenario: ApproachScenario,
}

impl SimDetector {
    pub fn new(scenario: ApproachScenario) -> Self {
        Self { scenario }
    }
}

impl Detector for SimDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, CollaboratorError> {
        Ok(self
            .scenario
            .bbox_at(frame.timestamp_s())
            .map(|bbox| Detection::new(bbox, 0.9, 0, "person"))
            .into_iter()
            .collect())
    }
}

/// Box-shaped masks and a straight lane map
pub struct SimSegmenter {
    scenario: ApproachScenario,
}

impl SimSegmenter {
    pub fn new(scenario: ApproachScenario) -> Self {
        Self { scenario }
    }
}

impl Segmenter for SimSegmenter {
    fn segment(&mut self, frame: &VideoFrame, bbox: &BoundingBox) -> Result<Mask, CollaboratorError> {
        Ok(Mask::from_bbox(bbox, frame.height as usize, frame.width as usize))
    }

    fn segment_full_image(&mut self, _frame: &VideoFrame) -> Result<Option<GrayImage>, CollaboratorError> {
        Ok(Some(self.scenario.lane_map()))
    }
}

/// Stereo engine returning exact depth on the obstacle and none elsewhere
pub struct SimStereo {
    scenario: ApproachScenario,
    geometry: StereoGeometry,
}

impl SimStereo {
    pub fn new(scenario: ApproachScenario, geometry: StereoGeometry) -> Self {
        Self { scenario, geometry }
    }
}

impl StereoEngine for SimStereo {
    fn compute_disparity_and_depth(
        &mut self,
        left: &VideoFrame,
        right: &VideoFrame,
    ) -> Result<(Array2<u16>, DepthField), CollaboratorError> {
        if left.width != right.width || left.height != right.height {
            return Err(CollaboratorError::new("stereo", "left/right frame sizes differ"));
        }

        let t = left.timestamp_s();
        let mut depth = DepthField::invalid(left.height as usize, left.width as usize);
        if let Some(bbox) = self.scenario.bbox_at(t) {
            depth.fill_region(&bbox, self.scenario.distance_at(t) as f32);
        }
        Ok((self.geometry.disparity_map(&depth), depth))
    }
}

/// Radar with a single return on the obstacle
pub struct SimRadar {
    scenario: ApproachScenario,
}

impl SimRadar {
    pub fn new(scenario: ApproachScenario) -> Self {
        Self { scenario }
    }
}

impl RadarSource for SimRadar {
    fn returns(&mut self, now_s: f64) -> Vec<RadarReturn> {
        let distance = self.scenario.distance_at(now_s);
        let closing = if distance > MIN_DISTANCE_M {
            self.scenario.config.closing_speed_mps
        } else {
            0.0
        };
        vec![
            RadarReturn::new(distance as f32, self.scenario.bearing_deg(now_s) as f32)
                .with_velocity(-closing as f32),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ApproachScenario {
        ApproachScenario::new(SimulationConfig::default(), CameraIntrinsics::default())
    }

    #[test]
    fn test_distance_decreases_and_clamps() {
        let s = scenario();
        assert!((s.distance_at(0.0) - 9.0).abs() < 1e-9);
        assert!((s.distance_at(1.0) - 7.0).abs() < 1e-9);
        assert_eq!(s.distance_at(100.0), MIN_DISTANCE_M);
    }

    #[test]
    fn test_bbox_centred_and_growing() {
        let s = scenario();
        let far = s.bbox_at(0.0).unwrap();
        let near = s.bbox_at(2.0).unwrap();
        assert!(near.area() > far.area());
        let (u, v) = far.center();
        assert!((u - 320.0).abs() < 1e-3 && (v - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_stereo_depth_on_obstacle_only() {
        let s = scenario();
        let (left, right) = s.frame_pair(5);
        let mut stereo = SimStereo::new(s.clone(), StereoGeometry::default());
        let (disparity, depth) = stereo.compute_disparity_and_depth(&left, &right).unwrap();

        assert_eq!(depth.dim(), (480, 640));
        assert_eq!(disparity.dim(), (480, 640));
        assert!((depth.get(240, 320).unwrap() - 8.0).abs() < 1e-5);
        assert!(depth.valid_at(5, 5).is_none());
    }

    #[test]
    fn test_radar_matches_truth() {
        let s = scenario();
        let mut radar = SimRadar::new(s);
        let returns = radar.returns(1.0);
        assert_eq!(returns.len(), 1);
        assert!((returns[0].distance_m - 7.0).abs() < 1e-5);
        assert_eq!(returns[0].radial_velocity_mps, Some(-2.0));
    }
}
