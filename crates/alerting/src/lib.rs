//! Alerting System
//!
//! Gates obstacle and road-condition alerts behind per-kind cooldowns and
//! maps each kind to its spoken message.

mod coordinator;
mod kind;

pub use coordinator::{AlertConfig, AlertCoordinator, AlertCooldowns, AlertState, FiredAlert};
pub use kind::AlertKind;
