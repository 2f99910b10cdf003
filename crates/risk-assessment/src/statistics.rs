//! Sample moments

/// Population mean and variance of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
}

impl Moments {
    /// Compute moments; an empty slice yields all zeros
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            count: values.len(),
            mean,
            variance,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let stats = Moments::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_std_dev_computation() {
        let stats = Moments::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.std_dev() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(Moments::compute(&[]), Moments::default());
    }
}
