//! Pruned Exact Linear Time (PELT) segmentation.
//!
//! Finds the breakpoints minimizing the sum of segment L2 costs plus a
//! penalty per segment. Candidate start points whose best cost can no longer
//! beat the current optimum by more than the penalty are pruned, which keeps
//! the search close to linear on signals with few changes.
//!
//! Breakpoints are returned as right-exclusive segment ends; the last one
//! is always the signal length.

use std::collections::VecDeque;
use std::iter;

use super::cost::L2Cost;

/// PELT search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pelt {
    /// Minimum number of samples per segment.
    pub min_size: usize,
    /// Candidate breakpoints are restricted to multiples of `jump`.
    pub jump: usize,
}

impl Default for Pelt {
    fn default() -> Self {
        Self {
            min_size: 2,
            jump: 1,
        }
    }
}

impl Pelt {
    /// Creates a search with the given segment size floor and grid spacing.
    /// Zero values are raised to 1.
    pub fn new(min_size: usize, jump: usize) -> Self {
        Self {
            min_size: min_size.max(1),
            jump: jump.max(1),
        }
    }

    /// Segments `signal`, charging `penalty` per segment.
    ///
    /// Returns the sorted segment ends, the last equal to `signal.len()`.
    /// An empty signal yields no breakpoints; a signal shorter than
    /// `min_size` is a single segment. Negative or NaN penalties are
    /// treated as zero.
    pub fn segment(&self, signal: &[f64], penalty: f64) -> Vec<usize> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }
        let min_size = self.min_size.max(1);
        let jump = self.jump.max(1);
        if n < min_size {
            return vec![n];
        }
        let penalty = penalty.max(0.0);

        let cost = L2Cost::fit(signal);

        // best[t] = (optimal cost of [0, t), start of its last segment)
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n + 1];
        best[0] = Some((0.0, 0));
        let mut admissible: Vec<usize> = Vec::new();
        // A start dominated at `s` can only be discarded once `s` itself is
        // a feasible start, i.e. from `s + min_size` on.
        let mut pending: VecDeque<(usize, Vec<usize>)> = VecDeque::new();

        let ends = (0..n)
            .step_by(jump)
            .filter(|&k| k >= min_size)
            .chain(iter::once(n));

        for end in ends {
            while pending.front().map_or(false, |(from, _)| *from <= end) {
                if let Some((_, dominated)) = pending.pop_front() {
                    admissible.retain(|start| !dominated.contains(start));
                }
            }

            let newest = (end - min_size) / jump * jump;
            if admissible.last() != Some(&newest) {
                admissible.push(newest);
            }
            admissible.retain(|&start| best[start].is_some());

            let scored: Vec<(usize, f64)> = admissible
                .iter()
                .filter_map(|&start| {
                    best[start].map(|(prefix, _)| (start, prefix + cost.error(start, end) + penalty))
                })
                .collect();

            let Some(&(argmin, min_cost)) = scored.iter().min_by(|a, b| a.1.total_cmp(&b.1))
            else {
                continue;
            };
            best[end] = Some((min_cost, argmin));

            let dominated: Vec<usize> = scored
                .iter()
                .filter(|&&(_, total)| total > min_cost + penalty)
                .map(|&(start, _)| start)
                .collect();
            if !dominated.is_empty() {
                pending.push_back((end + min_size, dominated));
            }
        }

        let mut breakpoints = Vec::new();
        let mut end = n;
        while end > 0 {
            breakpoints.push(end);
            match best[end] {
                Some((_, start)) => end = start,
                None => break,
            }
        }
        breakpoints.reverse();
        breakpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(a: f64, first: usize, b: f64, second: usize) -> Vec<f64> {
        let mut signal = vec![a; first];
        signal.extend(vec![b; second]);
        signal
    }

    #[test]
    fn test_empty_and_short_signals() {
        let pelt = Pelt::default();
        assert!(pelt.segment(&[], 1.0).is_empty());
        assert_eq!(pelt.segment(&[5.0], 1.0), vec![1]);
        assert_eq!(pelt.segment(&[5.0, 6.0], 1.0), vec![2]);
    }

    #[test]
    fn test_single_step() {
        let signal = step(0.0, 23, 10.0, 7);
        assert_eq!(Pelt::default().segment(&signal, 5.0), vec![23, 30]);
    }

    #[test]
    fn test_two_steps() {
        let mut signal = step(0.0, 10, 5.0, 10);
        signal.extend(vec![-5.0; 10]);
        assert_eq!(Pelt::default().segment(&signal, 3.0), vec![10, 20, 30]);
    }

    #[test]
    fn test_constant_signal_is_one_segment() {
        assert_eq!(Pelt::default().segment(&[0.0; 30], 0.5), vec![30]);
    }

    #[test]
    fn test_large_penalty_suppresses_breaks() {
        let signal = step(0.0, 15, 1.0, 15);
        // Splitting saves 7.5; a penalty above that keeps one segment.
        assert_eq!(Pelt::default().segment(&signal, 8.0), vec![30]);
        assert_eq!(Pelt::default().segment(&signal, 7.0), vec![15, 30]);
    }

    #[test]
    fn test_min_size_respected() {
        // A single-sample spike cannot form its own segment with min_size 2.
        let mut signal = vec![0.0; 20];
        signal[10] = 50.0;
        let breakpoints = Pelt::new(2, 1).segment(&signal, 1.0);

        let mut start = 0;
        for &end in &breakpoints {
            assert!(end - start >= 2, "segment [{start}, {end}) too short");
            start = end;
        }
        assert_eq!(*breakpoints.last().unwrap(), 20);
    }

    #[test]
    fn test_jump_restricts_candidates() {
        let signal = step(0.0, 23, 10.0, 7);
        let breakpoints = Pelt::new(2, 5).segment(&signal, 1.0);

        assert_eq!(*breakpoints.last().unwrap(), 30);
        for &b in &breakpoints[..breakpoints.len() - 1] {
            assert_eq!(b % 5, 0, "breakpoint {b} is off the grid");
        }
        assert!(breakpoints.contains(&25));
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let signal = [0.1, 0.3, 5.2, 5.0, 4.9, 5.1, -2.0, -2.2, -1.9, 0.0, 0.2, 0.1];
        let penalty = 1.5;
        let breakpoints = Pelt::default().segment(&signal, penalty);

        let cost = L2Cost::fit(&signal);
        let total = |bkps: &[usize]| {
            let mut start = 0;
            let mut sum = 0.0;
            for &end in bkps {
                sum += cost.error(start, end) + penalty;
                start = end;
            }
            sum
        };

        // Brute force over every partition with segments of at least 2.
        let n = signal.len();
        let mut best = f64::INFINITY;
        for mask in 0u32..(1 << (n - 1)) {
            let mut bkps: Vec<usize> = (1..n).filter(|i| mask & (1 << (i - 1)) != 0).collect();
            bkps.push(n);
            let mut start = 0;
            let valid = bkps.iter().all(|&end| {
                let ok = end - start >= 2;
                start = end;
                ok
            });
            if valid {
                best = best.min(total(&bkps));
            }
        }

        assert!((total(&breakpoints) - best).abs() < 1e-9);
    }
}
