//! Time-To-Collision Estimation
//!
//! Keeps a short distance history per object and derives TTC from the
//! closing rate. Object identity across frames comes from a coarse
//! fingerprint (class + bucketed box centre), not a tracker: an object that
//! jumps more than one bucket between frames starts a fresh history.

mod config;
mod estimator;
mod history;
mod track;

pub use config::TtcConfig;
pub use estimator::TtcEstimator;
pub use history::{ObjectHistory, TtcSample};
pub use track::TrackId;
