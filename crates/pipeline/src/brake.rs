//! Brake commands and the actuator task
//!
//! The frame loop pushes commands into a bounded channel with `try_send`
//! and never waits; a separate task owns the brake state.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use risk_assessment::{RiskLevel, RiskResult};

use crate::collaborators::BrakeActuator;

/// Brake request derived from one frame's risk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BrakeCommand {
    /// Brake at `level` in [0, 1]
    Apply { level: f32, risk: RiskLevel },
    Release,
}

impl BrakeCommand {
    /// Danger brakes fully and warning at half strength, but only when the
    /// assessment asked to brake; everything else releases.
    pub fn from_risk(result: &RiskResult) -> Self {
        if !result.should_brake {
            return BrakeCommand::Release;
        }
        match result.level.brake_intensity() {
            Some(level) => BrakeCommand::Apply {
                level: level.clamp(0.0, 1.0),
                risk: result.level,
            },
            None => BrakeCommand::Release,
        }
    }
}

/// Current actuator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrakeState {
    pub engaged: bool,
    /// 0.0 when released
    pub level: f32,
    /// Commands applied so far
    pub commands: u64,
}

/// Non-blocking sender half used by the pipeline
#[derive(Debug, Clone)]
pub struct ChannelBrakeActuator {
    sender: mpsc::Sender<BrakeCommand>,
}

impl BrakeActuator for ChannelBrakeActuator {
    fn send(&mut self, command: BrakeCommand) {
        match self.sender.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(command)) => {
                warn!(?command, "Brake channel full, command dropped");
                metrics::counter!("brake_commands_dropped_total").increment(1);
            }
            Err(mpsc::error::TrySendError::Closed(command)) => {
                warn!(?command, "Brake controller stopped, command dropped");
                metrics::counter!("brake_commands_dropped_total").increment(1);
            }
        }
    }
}

/// Owns brake state and applies commands as they arrive
pub struct BrakeController {
    receiver: mpsc::Receiver<BrakeCommand>,
    state: BrakeState,
}

impl BrakeController {
    pub fn new(receiver: mpsc::Receiver<BrakeCommand>) -> Self {
        Self {
            receiver,
            state: BrakeState::default(),
        }
    }

    /// Create a channel pair for the controller
    pub fn channel(capacity: usize) -> (ChannelBrakeActuator, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (ChannelBrakeActuator { sender }, Self::new(receiver))
    }

    pub fn state(&self) -> BrakeState {
        self.state
    }

    /// Apply one command
    pub fn apply(&mut self, command: BrakeCommand) {
        match command {
            BrakeCommand::Apply { level, risk } => {
                self.state.engaged = true;
                self.state.level = level.clamp(0.0, 1.0);
                info!(level = self.state.level, risk = %risk, "Brake applied");
            }
            BrakeCommand::Release => {
                if self.state.engaged {
                    info!("Brake released");
                }
                self.state.engaged = false;
                self.state.level = 0.0;
            }
        }
        self.state.commands += 1;
        metrics::counter!("brake_commands_total").increment(1);
        metrics::gauge!("brake_level").set(self.state.level as f64);
    }

    /// Run until every sender is dropped, returning the final state
    pub async fn run(mut self) -> BrakeState {
        info!("Starting brake controller");
        while let Some(command) = self.receiver.recv().await {
            self.apply(command);
        }
        debug!("Brake channel closed");
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(level: RiskLevel, should_brake: bool) -> RiskResult {
        RiskResult {
            level,
            score: 0.9,
            nearest: None,
            should_brake,
        }
    }

    #[test]
    fn test_command_from_risk() {
        assert_eq!(
            BrakeCommand::from_risk(&risk(RiskLevel::Danger, true)),
            BrakeCommand::Apply {
                level: 1.0,
                risk: RiskLevel::Danger
            }
        );
        assert_eq!(
            BrakeCommand::from_risk(&risk(RiskLevel::Warning, true)),
            BrakeCommand::Apply {
                level: 0.5,
                risk: RiskLevel::Warning
            }
        );
        assert_eq!(BrakeCommand::from_risk(&risk(RiskLevel::Danger, false)), BrakeCommand::Release);
        assert_eq!(BrakeCommand::from_risk(&risk(RiskLevel::Safe, true)), BrakeCommand::Release);
    }

    #[test]
    fn test_apply_and_release() {
        let (_actuator, mut controller) = BrakeController::channel(4);
        controller.apply(BrakeCommand::Apply {
            level: 1.5,
            risk: RiskLevel::Danger,
        });
        assert!(controller.state().engaged);
        assert_eq!(controller.state().level, 1.0);

        controller.apply(BrakeCommand::Release);
        assert_eq!(
            controller.state(),
            BrakeState {
                engaged: false,
                level: 0.0,
                commands: 2
            }
        );
    }

    #[tokio::test]
    async fn test_controller_drains_channel() {
        let (mut actuator, controller) = BrakeController::channel(4);
        let task = tokio::spawn(controller.run());

        actuator.send(BrakeCommand::Apply {
            level: 0.5,
            risk: RiskLevel::Warning,
        });
        actuator.send(BrakeCommand::Apply {
            level: 1.0,
            risk: RiskLevel::Danger,
        });
        drop(actuator);

        let state = task.await.unwrap();
        assert!(state.engaged);
        assert_eq!(state.level, 1.0);
        assert_eq!(state.commands, 2);
    }

    #[tokio::test]
    async fn test_full_channel_never_blocks() {
        let (mut actuator, controller) = BrakeController::channel(1);
        actuator.send(BrakeCommand::Release);
        // dropped, not awaited
        actuator.send(BrakeCommand::Release);
        drop(actuator);

        let state = controller.run().await;
        assert_eq!(state.commands, 1);
    }
}
