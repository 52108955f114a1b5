//! Population statistics over prepared windows.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the last `n` values (all of them if fewer).
pub fn tail_mean(values: &[f64], n: usize) -> Option<f64> {
    mean(&values[values.len().saturating_sub(n)..])
}

/// Mean and population standard deviation (denominator `N`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl PopulationStats {
    /// Computes the statistics, or `None` for an empty slice.
    ///
    /// Values are shifted by the first one before summing, so a window of
    /// identical values has a mean equal to that value and a deviation of
    /// exactly zero.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let n = values.len() as f64;
        let mean = first + values.iter().map(|v| v - first).sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Standard score of `value`. Undefined (non-finite) when `std_dev` is 0.
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }

    /// Returns true when the spread can be used to scale values.
    pub fn has_spread(&self) -> bool {
        self.std_dev.is_finite() && self.std_dev > 0.0
    }
}
