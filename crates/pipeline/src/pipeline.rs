//! Frame-synchronous obstacle pipeline

use std::time::Instant;

use tracing::{debug, info, warn};
use alerting::AlertCoordinator;
use depth_geometry::MonoDepthEstimator;
use perception_types::{DepthField, Detection, Mask, VideoFrame};
use risk_assessment::{RiskAssessor, RoadRiskAssessor};
use sensor_fusion::{filter_by_depth, DepthRange, FusionEngine, RadarAssociator};
use ttc_estimator::TtcEstimator;

use crate::brake::BrakeCommand;
use crate::collaborators::{AlertSink, BrakeActuator, Collaborators, Detector, RadarSource, Segmenter, StereoEngine};
use crate::config::{DepthMode, PipelineConfig};
use crate::report::FrameReport;
use crate::PipelineError;

/// Per-frame depth backend
pub enum DepthSource {
    /// Stereo engine over the left/right pair
    Stereo(Box<dyn StereoEngine>),
    /// Bounding-box height estimate from the left frame alone
    Mono(MonoDepthEstimator),
}

impl DepthSource {
    fn depth(&mut self, left: &VideoFrame, right: Option<&VideoFrame>, detections: &[Detection]) -> DepthField {
        let (height, width) = (left.height as usize, left.width as usize);
        match self {
            DepthSource::Stereo(engine) => {
                let Some(right) = right else {
                    warn!(sequence = left.sequence, "Stereo mode without a right frame, no depth");
                    return DepthField::invalid(height, width);
                };
                match engine.compute_disparity_and_depth(left, right) {
                    Ok((_, depth)) if depth.dim() == (height, width) => depth,
                    Ok((_, depth)) => {
                        warn!(
                            expected = ?(height, width),
                            actual = ?depth.dim(),
                            "Depth field does not match the frame, no depth"
                        );
                        DepthField::invalid(height, width)
                    }
                    Err(e) => {
                        warn!(error = %e, "Stereo matching failed, no depth");
                        DepthField::invalid(height, width)
                    }
                }
            }
            DepthSource::Mono(estimator) => estimator.depth_field(height, width, detections),
        }
    }
}

/// One obstacle-avoidance pipeline run.
///
/// Owns the only cross-frame state (TTC histories and alert timestamps);
/// both are mutated through `&mut self` on the frame loop.
pub struct ObstaclePipeline {
    detector: Box<dyn Detector>,
    segmenter: Box<dyn Segmenter>,
    depth_source: DepthSource,
    radar: Option<Box<dyn RadarSource>>,
    brake: Box<dyn BrakeActuator>,
    alert_sink: Box<dyn AlertSink>,

    fusion: FusionEngine,
    depth_range: DepthRange,
    associator: RadarAssociator,
    ttc: TtcEstimator,
    risk: RiskAssessor,
    road: RoadRiskAssessor,
    alerts: AlertCoordinator,

    last_brake: Option<BrakeCommand>,
    frames_processed: u64,
}

impl ObstaclePipeline {
    /// Validate `config` and assemble the stages around `collaborators`
    pub fn new(config: &PipelineConfig, collaborators: Collaborators) -> Result<Self, PipelineError> {
        config.validate()?;

        let depth_source = match config.depth_mode {
            DepthMode::Stereo => DepthSource::Stereo(
                collaborators
                    .stereo
                    .ok_or(PipelineError::MissingCollaborator("stereo engine"))?,
            ),
            DepthMode::Mono => DepthSource::Mono(MonoDepthEstimator::new(config.mono.clone())),
        };
        let radar = if config.radar_enabled { collaborators.radar } else { None };

        info!(
            mode = ?config.depth_mode,
            radar = radar.is_some(),
            "Creating obstacle pipeline"
        );

        Ok(Self {
            detector: collaborators.detector,
            segmenter: collaborators.segmenter,
            depth_source,
            radar,
            brake: collaborators.brake,
            alert_sink: collaborators.alerts,
            fusion: FusionEngine::new(config.left_camera),
            depth_range: config.depth_range,
            associator: RadarAssociator::new(config.radar),
            ttc: TtcEstimator::new(config.ttc.clone()),
            risk: RiskAssessor::new(config.risk.clone()),
            road: RoadRiskAssessor::new(config.road.clone()),
            alerts: AlertCoordinator::new(config.alerts.clone()),
            last_brake: None,
            frames_processed: 0,
        })
    }

    /// Record a measured ego speed (m/s)
    pub fn update_ego_speed(&mut self, speed_mps: f32) {
        self.ttc.update_ego_speed(speed_mps);
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Process one frame end to end.
    ///
    /// Never fails: a collaborator error degrades this frame (no
    /// detections, no depth, no segmentation) and is logged.
    pub fn process_frame(&mut self, left: &VideoFrame, right: Option<&VideoFrame>) -> FrameReport {
        let started = Instant::now();
        let now_s = left.timestamp_s();

        let detections = self.detector.detect(left).unwrap_or_else(|e| {
            warn!(error = %e, sequence = left.sequence, "Detection failed");
            Vec::new()
        });
        let masks = self.masks(left, &detections);
        let depth = self.depth_source.depth(left, right, &detections);

        let fused = self.fusion.fuse(&detections, &masks, &depth);
        let fused_count = fused.len();
        let mut objects = filter_by_depth(fused, self.depth_range.min_depth_m, self.depth_range.max_depth_m);
        let in_range = objects.len();

        if let Some(radar) = self.radar.as_mut() {
            let returns = radar.returns(now_s);
            objects = self.associator.associate(objects, &returns);
        }
        let radar_fused = objects.iter().filter(|o| o.radar_fused).count();

        let objects = self.ttc.update(objects, now_s);
        let nearest_ttc_s = TtcEstimator::nearest_valid(&objects).and_then(|o| o.ttc_s);
        let ttc_alert = TtcEstimator::should_alert(nearest_ttc_s, self.ttc.config().emergency_threshold_s);

        let risk = self.risk.assess(&objects);
        let brake = BrakeCommand::from_risk(&risk);
        if self.last_brake != Some(brake) {
            self.brake.send(brake);
            self.last_brake = Some(brake);
        }

        let segmentation = self.segmenter.segment_full_image(left).unwrap_or_else(|e| {
            warn!(error = %e, "Scene segmentation failed");
            None
        });
        let road = self
            .road
            .assess_all(&left.to_gray_image(), segmentation.as_ref(), &detections);

        let alerts = self.alerts.evaluate(
            &road.flags,
            risk.level,
            if ttc_alert { nearest_ttc_s } else { None },
            now_s,
        );
        for alert in &alerts {
            self.alert_sink.announce(alert);
        }

        self.frames_processed += 1;
        metrics::counter!("pipeline_frames_processed_total").increment(1);
        metrics::gauge!("ttc_tracked_objects").set(self.ttc.tracked_count() as f64);

        let processing_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            sequence = left.sequence,
            detections = detections.len(),
            fused = fused_count,
            in_range,
            level = %risk.level,
            alerts = alerts.len(),
            processing_ms,
            "Frame processed"
        );

        FrameReport {
            sequence: left.sequence,
            timestamp_s: now_s,
            processing_ms,
            detections: detections.len(),
            fused: fused_count,
            in_range,
            radar_fused,
            objects,
            nearest_ttc_s,
            ttc_alert,
            ego_speed_mps: self.ttc.effective_ego_speed(),
            risk,
            road,
            brake,
            alerts,
        }
    }

    /// Per-detection masks; a failed segmentation falls back to the box
    fn masks(&mut self, frame: &VideoFrame, detections: &[Detection]) -> Vec<Mask> {
        let (height, width) = (frame.height as usize, frame.width as usize);
        detections
            .iter()
            .map(|det| match self.segmenter.segment(frame, &det.bbox) {
                Ok(mask) if mask.dim() == (height, width) => mask,
                Ok(_) | Err(_) => {
                    debug!(class = %det.class_name, "No usable mask, using bounding box");
                    Mask::from_bbox(&det.bbox, height, width)
                }
            })
            .collect()
    }

    /// Drop TTC histories and alert timestamps (full restart)
    pub fn reset(&mut self) {
        info!("Resetting pipeline state");
        self.ttc.reset();
        self.alerts.reset();
        self.last_brake = None;
    }
}
