//! Segment cost functions for the change-point search.

/// Squared-error (L2) cost of a segment around its own mean.
///
/// Prefix sums make every `error` query O(1) after an O(n) fit.
#[derive(Debug, Clone)]
pub struct L2Cost {
    sums: Vec<f64>,
    squares: Vec<f64>,
}

impl L2Cost {
    /// Precomputes prefix sums over `signal`.
    pub fn fit(signal: &[f64]) -> Self {
        let mut sums = Vec::with_capacity(signal.len() + 1);
        let mut squares = Vec::with_capacity(signal.len() + 1);
        sums.push(0.0);
        squares.push(0.0);
        for (i, v) in signal.iter().enumerate() {
            sums.push(sums[i] + v);
            squares.push(squares[i] + v * v);
        }
        Self { sums, squares }
    }

    /// Number of samples the cost was fitted on.
    pub fn len(&self) -> usize {
        self.sums.len() - 1
    }

    /// Returns true if fitted on an empty signal.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cost of the half-open segment `[start, end)`.
    ///
    /// Empty segments cost nothing. Rounding can push the difference of
    /// prefix sums slightly below zero, so the result is clamped.
    pub fn error(&self, start: usize, end: usize) -> f64 {
        debug_assert!(start <= end && end <= self.len());
        if end <= start {
            return 0.0;
        }
        let count = (end - start) as f64;
        let sum = self.sums[end] - self.sums[start];
        let squares = self.squares[end] - self.squares[start];
        (squares - sum * sum / count).max(0.0)
    }
}
