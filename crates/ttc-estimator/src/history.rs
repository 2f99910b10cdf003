//! Bounded per-object sample history

use std::collections::VecDeque;
use perception_types::Point3;

/// One observation of a tracked object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtcSample {
    /// Observation time (seconds)
    pub timestamp_s: f64,
    /// Observed distance (meters)
    pub distance_m: f32,
    /// Observed camera-frame position
    pub position: Point3,
}

/// Fixed-capacity sample window; pushing onto a full window evicts the oldest
#[derive(Debug, Clone)]
pub struct ObjectHistory {
    samples: VecDeque<TtcSample>,
    capacity: usize,
}

impl ObjectHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: TtcSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<&TtcSample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&TtcSample> {
        self.samples.back()
    }

    /// The last `count` samples, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &TtcSample> {
        self.samples.iter().skip(self.samples.len().saturating_sub(count))
    }

    /// Drop samples older than `max_age_s`, always keeping the newest one
    pub fn purge_stale(&mut self, now_s: f64, max_age_s: f64) {
        while self.samples.len() > 1 {
            match self.samples.front() {
                Some(oldest) if now_s - oldest.timestamp_s > max_age_s => {
                    self.samples.pop_front();
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(t: f64, d: f32) -> TtcSample {
        TtcSample {
            timestamp_s: t,
            distance_m: d,
            position: Point3::new(0.0, 0.0, d),
        }
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut history = ObjectHistory::new(3);
        for i in 0..5 {
            history.push(sample(i as f64, 10.0 - i as f32));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.oldest().unwrap().timestamp_s, 2.0);
        assert_eq!(history.newest().unwrap().timestamp_s, 4.0);
    }

    #[test]
    fn test_recent_window() {
        let mut history = ObjectHistory::new(10);
        for i in 0..4 {
            history.push(sample(i as f64, 10.0));
        }
        let times: Vec<f64> = history.recent(2).map(|s| s.timestamp_s).collect();
        assert_eq!(times, vec![2.0, 3.0]);
        assert_eq!(history.recent(20).count(), 4);
    }

    #[test]
    fn test_purge_keeps_newest() {
        let mut history = ObjectHistory::new(10);
        history.push(sample(0.0, 10.0));
        history.push(sample(1.0, 9.0));
        history.push(sample(2.5, 8.0));

        history.purge_stale(2.5, 2.0);
        assert_eq!(history.len(), 2);

        history.purge_stale(10.0, 2.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.newest().unwrap().timestamp_s, 2.5);
    }

    proptest! {
        #[test]
        fn prop_capacity_bound_holds(capacity in 1usize..16, pushes in 0usize..64) {
            let mut history = ObjectHistory::new(capacity);
            for i in 0..pushes {
                history.push(sample(i as f64, 5.0));
                prop_assert!(history.len() <= capacity);
            }
            prop_assert_eq!(history.len(), pushes.min(capacity));
        }
    }
}
