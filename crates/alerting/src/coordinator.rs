//! Alert Coordinator Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use perception_types::{ensure_range, ConfigError};
use risk_assessment::{RiskLevel, RoadRiskFlags};

use crate::kind::AlertKind;

/// Minimum seconds between two firings of the same kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertCooldowns {
    pub low_visibility: f64,
    pub wet_road: f64,
    pub curve: f64,
    pub narrow_road: f64,
    pub ttc_warning: f64,
    pub obstacle_danger: f64,
    pub obstacle_warning: f64,
}

impl Default for AlertCooldowns {
    fn default() -> Self {
        Self {
            low_visibility: 3.0,
            wet_road: 3.0,
            curve: 3.0,
            narrow_road: 3.0,
            ttc_warning: 1.0,
            obstacle_danger: 1.0,
            obstacle_warning: 2.0,
        }
    }
}

impl AlertCooldowns {
    pub fn get(&self, kind: AlertKind) -> f64 {
        match kind {
            AlertKind::LowVisibility => self.low_visibility,
            AlertKind::WetRoad => self.wet_road,
            AlertKind::Curve => self.curve,
            AlertKind::NarrowRoad => self.narrow_road,
            AlertKind::TtcWarning => self.ttc_warning,
            AlertKind::ObstacleDanger => self.obstacle_danger,
            AlertKind::ObstacleWarning => self.obstacle_warning,
        }
    }
}

/// Alert configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub cooldowns: AlertCooldowns,
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.cooldowns;
        ensure_range("cooldowns.low_visibility", c.low_visibility, 0.0, f64::MAX)?;
        ensure_range("cooldowns.wet_road", c.wet_road, 0.0, f64::MAX)?;
        ensure_range("cooldowns.curve", c.curve, 0.0, f64::MAX)?;
        ensure_range("cooldowns.narrow_road", c.narrow_road, 0.0, f64::MAX)?;
        ensure_range("cooldowns.ttc_warning", c.ttc_warning, 0.0, f64::MAX)?;
        ensure_range("cooldowns.obstacle_danger", c.obstacle_danger, 0.0, f64::MAX)?;
        ensure_range("cooldowns.obstacle_warning", c.obstacle_warning, 0.0, f64::MAX)?;
        Ok(())
    }
}

/// State of an alert kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertState {
    /// Caller-supplied time of the last firing (seconds)
    pub last_fired_s: f64,
    /// Number of times fired
    pub fire_count: usize,
}

/// An alert that passed its cooldown this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredAlert {
    pub kind: AlertKind,
    pub message: String,
    pub ttc_s: Option<f32>,
}

/// Per-kind cooldown gate.
///
/// Lives for one pipeline run; time is always passed in by the caller.
pub struct AlertCoordinator {
    config: AlertConfig,
    states: HashMap<AlertKind, AlertState>,
}

impl AlertCoordinator {
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert coordinator with cooldowns: {:?}", config.cooldowns);
        Self {
            config,
            states: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Fire `kind` if its cooldown has elapsed, recording `now_s`.
    ///
    /// A kind that never fired always fires. Elapsed time must strictly
    /// exceed the cooldown.
    pub fn try_fire(&mut self, kind: AlertKind, now_s: f64) -> bool {
        let cooldown = self.config.cooldowns.get(kind);
        if let Some(state) = self.states.get(&kind) {
            let elapsed = now_s - state.last_fired_s;
            if elapsed <= cooldown {
                debug!(kind = %kind, elapsed, cooldown, "Alert suppressed: in cooldown period");
                return false;
            }
        }

        let state = self.states.entry(kind).or_insert(AlertState {
            last_fired_s: now_s,
            fire_count: 0,
        });
        state.last_fired_s = now_s;
        state.fire_count += 1;

        metrics::counter!("alerts_fired_total", "kind" => kind.as_str()).increment(1);
        info!(kind = %kind, count = state.fire_count, "Alert fired");
        true
    }

    /// Run every raised condition through its cooldown.
    ///
    /// `ttc_alert` carries the TTC when it is at or below the emergency
    /// threshold. Returned alerts follow [`AlertKind::ALL`] order.
    pub fn evaluate(
        &mut self,
        road: &RoadRiskFlags,
        risk_level: RiskLevel,
        ttc_alert: Option<f32>,
        now_s: f64,
    ) -> Vec<FiredAlert> {
        let raised = [
            (AlertKind::LowVisibility, road.long_term.low_visibility),
            (AlertKind::WetRoad, road.long_term.wet_road),
            (AlertKind::Curve, road.short_term.curve),
            (AlertKind::NarrowRoad, road.short_term.narrow_road),
            (AlertKind::TtcWarning, ttc_alert.is_some()),
            (AlertKind::ObstacleDanger, risk_level == RiskLevel::Danger),
            (AlertKind::ObstacleWarning, risk_level == RiskLevel::Warning),
        ];

        raised
            .into_iter()
            .filter(|&(_, raised)| raised)
            .filter_map(|(kind, _)| {
                self.try_fire(kind, now_s).then(|| {
                    let ttc_s = if kind == AlertKind::TtcWarning { ttc_alert } else { None };
                    FiredAlert {
                        kind,
                        message: kind.announcement(ttc_s),
                        ttc_s,
                    }
                })
            })
            .collect()
    }

    pub fn state(&self, kind: AlertKind) -> Option<&AlertState> {
        self.states.get(&kind)
    }

    /// Clear all alert states (pipeline restart)
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

impl Default for AlertCoordinator {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_fire_always_passes() {
        let mut coordinator = AlertCoordinator::default();
        for kind in AlertKind::ALL {
            assert!(coordinator.try_fire(kind, 0.0));
        }
    }

    #[test]
    fn test_deduplication() {
        let mut coordinator = AlertCoordinator::default();

        assert!(coordinator.try_fire(AlertKind::Curve, 10.0));
        // Immediate duplicate should not fire
        assert!(!coordinator.try_fire(AlertKind::Curve, 10.5));
        // Exactly at the cooldown is still suppressed
        assert!(!coordinator.try_fire(AlertKind::Curve, 13.0));
        assert!(coordinator.try_fire(AlertKind::Curve, 13.01));

        assert_eq!(coordinator.state(AlertKind::Curve).unwrap().fire_count, 2);
    }

    #[test]
    fn test_suppressed_fire_keeps_timestamp() {
        let mut coordinator = AlertCoordinator::default();
        coordinator.try_fire(AlertKind::ObstacleWarning, 0.0);
        coordinator.try_fire(AlertKind::ObstacleWarning, 1.5);
        assert_eq!(coordinator.state(AlertKind::ObstacleWarning).unwrap().last_fired_s, 0.0);
        assert!(coordinator.try_fire(AlertKind::ObstacleWarning, 2.1));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut coordinator = AlertCoordinator::default();
        assert!(coordinator.try_fire(AlertKind::ObstacleDanger, 0.0));
        assert!(coordinator.try_fire(AlertKind::TtcWarning, 0.1));
        assert!(!coordinator.try_fire(AlertKind::ObstacleDanger, 0.5));
    }

    #[test]
    fn test_evaluate_fires_raised_kinds_only() {
        let mut coordinator = AlertCoordinator::default();
        let mut road = RoadRiskFlags::default();
        road.long_term.wet_road = true;

        let fired = coordinator.evaluate(&road, RiskLevel::Danger, Some(1.2), 0.0);
        let kinds: Vec<_> = fired.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::WetRoad, AlertKind::TtcWarning, AlertKind::ObstacleDanger]);
        assert_eq!(fired[1].ttc_s, Some(1.2));
        assert!(fired[1].message.contains("1.2 seconds"));

        // false flags never touch timestamps
        assert!(coordinator.state(AlertKind::Curve).is_none());
        assert!(coordinator.state(AlertKind::ObstacleWarning).is_none());
    }

    #[test]
    fn test_evaluate_respects_cooldowns() {
        let mut coordinator = AlertCoordinator::default();
        let road = RoadRiskFlags::default();

        assert_eq!(coordinator.evaluate(&road, RiskLevel::Warning, None, 0.0).len(), 1);
        assert!(coordinator.evaluate(&road, RiskLevel::Warning, None, 1.0).is_empty());
        assert_eq!(coordinator.evaluate(&road, RiskLevel::Warning, None, 2.5).len(), 1);
        assert!(coordinator.evaluate(&road, RiskLevel::Safe, None, 10.0).is_empty());
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let config = AlertConfig {
            cooldowns: AlertCooldowns {
                curve: -1.0,
                ..Default::default()
            },
        };
        assert!(config.validate().is_err());
        assert!(AlertConfig::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn test_at_most_one_fire_per_window(times in proptest::collection::vec(0.0f64..30.0, 1..50)) {
            let mut times = times;
            times.sort_by(f64::total_cmp);

            let mut coordinator = AlertCoordinator::default();
            let fired: Vec<f64> = times
                .iter()
                .copied()
                .filter(|&t| coordinator.try_fire(AlertKind::NarrowRoad, t))
                .collect();

            prop_assert_eq!(fired[0], times[0]);
            for pair in fired.windows(2) {
                prop_assert!(pair[1] - pair[0] > 3.0);
            }
        }
    }
}
