//! Per-trial measurements and their running aggregate.

use serde::{Deserialize, Serialize};

use crate::result::Verdict;

/// Durations of one trial, in nanoseconds per unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialPair {
    /// Duration of the no-unwind variant.
    pub no_unwind_ns: f64,
    /// Duration of the may-unwind variant.
    pub may_unwind_ns: f64,
}

impl TrialPair {
    /// Create a pair from the no-unwind and may-unwind durations.
    pub fn new(no_unwind_ns: f64, may_unwind_ns: f64) -> Self {
        Self {
            no_unwind_ns,
            may_unwind_ns,
        }
    }
}

/// Which variant is measured first within a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    /// No-unwind first, then may-unwind.
    #[default]
    NoUnwindFirst,
    /// May-unwind first, then no-unwind.
    MayUnwindFirst,
}

/// `x / y`, with an effectively-zero `y` replaced by the smallest positive normal.
///
/// A duration that rounds to zero (or below, with a coarse counter) must not
/// turn a ratio into a division fault or an infinity. For `y` below
/// `f64::MIN_POSITIVE` (zero, negative or subnormal) the result is kept in
/// `[1 / f64::MIN_POSITIVE, f64::MAX]`: large, finite and positive for any
/// finite `x >= 0`.
pub fn divide_by_positive(x: f64, y: f64) -> f64 {
    if y >= f64::MIN_POSITIVE {
        return x / y;
    }
    let floor = 1.0 / f64::MIN_POSITIVE;
    (x / f64::MIN_POSITIVE).clamp(floor, f64::MAX)
}

/// Running aggregate over the trials of one test case.
///
/// Invariant: `no_unwind_faster + may_unwind_faster <= trials`. Ties count
/// toward neither side.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    trials: u32,
    no_unwind_faster: u32,
    may_unwind_faster: u32,
    sum_no_unwind_ns: f64,
    sum_may_unwind_ns: f64,
    shortest_no_unwind_ns: f64,
    shortest_may_unwind_ns: f64,
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl Tally {
    /// Empty tally.
    pub fn new() -> Self {
        Self {
            trials: 0,
            no_unwind_faster: 0,
            may_unwind_faster: 0,
            sum_no_unwind_ns: 0.0,
            sum_may_unwind_ns: 0.0,
            shortest_no_unwind_ns: f64::INFINITY,
            shortest_may_unwind_ns: f64::INFINITY,
        }
    }

    /// Fold one trial into the aggregate.
    pub fn record(&mut self, pair: TrialPair) {
        self.trials += 1;

        self.sum_no_unwind_ns += pair.no_unwind_ns;
        self.sum_may_unwind_ns += pair.may_unwind_ns;

        self.shortest_no_unwind_ns = self.shortest_no_unwind_ns.min(pair.no_unwind_ns);
        self.shortest_may_unwind_ns = self.shortest_may_unwind_ns.min(pair.may_unwind_ns);

        if pair.no_unwind_ns < pair.may_unwind_ns {
            self.no_unwind_faster += 1;
        }
        if pair.may_unwind_ns < pair.no_unwind_ns {
            self.may_unwind_faster += 1;
        }
    }

    /// Number of recorded trials.
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Trials where the no-unwind variant was strictly faster.
    pub fn no_unwind_faster(&self) -> u32 {
        self.no_unwind_faster
    }

    /// Trials where the may-unwind variant was strictly faster.
    pub fn may_unwind_faster(&self) -> u32 {
        self.may_unwind_faster
    }

    /// Summed no-unwind durations.
    pub fn sum_no_unwind_ns(&self) -> f64 {
        self.sum_no_unwind_ns
    }

    /// Summed may-unwind durations.
    pub fn sum_may_unwind_ns(&self) -> f64 {
        self.sum_may_unwind_ns
    }

    /// Shortest no-unwind duration, `None` before the first trial.
    pub fn shortest_no_unwind_ns(&self) -> Option<f64> {
        (self.trials > 0).then_some(self.shortest_no_unwind_ns)
    }

    /// Shortest may-unwind duration, `None` before the first trial.
    pub fn shortest_may_unwind_ns(&self) -> Option<f64> {
        (self.trials > 0).then_some(self.shortest_may_unwind_ns)
    }

    /// `sum(no_unwind) / sum(may_unwind)`.
    pub fn ratio_no_unwind_to_may_unwind(&self) -> f64 {
        divide_by_positive(self.sum_no_unwind_ns, self.sum_may_unwind_ns)
    }

    /// `sum(may_unwind) / sum(no_unwind)`.
    pub fn ratio_may_unwind_to_no_unwind(&self) -> f64 {
        divide_by_positive(self.sum_may_unwind_ns, self.sum_no_unwind_ns)
    }

    /// Decide which variant is faster.
    ///
    /// A variant is declared faster only if it won every trial and the sum it
    /// is divided by is at least `f64::MIN_POSITIVE`; anything else is inconclusive.
    pub fn verdict(&self) -> Verdict {
        if self.trials == 0 {
            return Verdict::Inconclusive;
        }
        if self.no_unwind_faster == self.trials && self.sum_no_unwind_ns >= f64::MIN_POSITIVE {
            return Verdict::NoUnwindFaster {
                ratio: self.ratio_may_unwind_to_no_unwind(),
            };
        }
        if self.may_unwind_faster == self.trials && self.sum_may_unwind_ns >= f64::MIN_POSITIVE {
            return Verdict::MayUnwindFaster {
                ratio: self.ratio_no_unwind_to_may_unwind(),
            };
        }
        Verdict::Inconclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(pairs: &[(f64, f64)]) -> Tally {
        let mut tally = Tally::new();
        for &(a, b) in pairs {
            tally.record(TrialPair::new(a, b));
        }
        tally
    }

    #[test]
    fn test_no_unwind_wins_every_trial() {
        let tally = tally_of(&[(5.0, 7.0), (4.0, 6.0), (3.0, 9.0)]);
        assert_eq!(tally.trials(), 3);
        assert_eq!(tally.no_unwind_faster(), 3);
        assert_eq!(tally.may_unwind_faster(), 0);
        match tally.verdict() {
            Verdict::NoUnwindFaster { ratio } => {
                assert!((ratio - 22.0 / 12.0).abs() < 1e-12, "ratio = {}", ratio);
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_may_unwind_wins_every_trial() {
        let tally = tally_of(&[(8.0, 2.0), (6.0, 2.0)]);
        assert_eq!(
            tally.verdict(),
            Verdict::MayUnwindFaster { ratio: 14.0 / 4.0 }
        );
    }

    #[test]
    fn test_split_wins_are_inconclusive() {
        let tally = tally_of(&[(5.0, 3.0), (2.0, 6.0)]);
        assert_eq!(tally.no_unwind_faster(), 1);
        assert_eq!(tally.may_unwind_faster(), 1);
        assert_eq!(tally.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_ties_count_for_neither() {
        let tally = tally_of(&[(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(tally.no_unwind_faster() + tally.may_unwind_faster(), 0);
        assert_eq!(tally.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_zero_duration_win_has_finite_ratio() {
        let tally = tally_of(&[(0.0, 4.0)]);
        assert_eq!(tally.no_unwind_faster(), 1);
        let ratio = tally.ratio_may_unwind_to_no_unwind();
        assert!(ratio.is_finite(), "ratio = {}", ratio);
        assert!(ratio > 1e300, "ratio = {}", ratio);
        // The denominator sum is zero, so the win is not trusted.
        assert_eq!(tally.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_subnormal_sum_counts_as_zero() {
        let tiny = 1e-320;
        assert!(tiny > 0.0 && tiny < f64::MIN_POSITIVE);

        let r = divide_by_positive(4.0, tiny);
        assert!(r.is_finite() && r >= 1.0 / f64::MIN_POSITIVE, "r = {}", r);

        let tally = tally_of(&[(tiny, 4.0)]);
        assert_eq!(tally.no_unwind_faster(), 1);
        assert!(tally.ratio_may_unwind_to_no_unwind().is_finite());
        assert_eq!(tally.verdict(), Verdict::Inconclusive);

        let tally = tally_of(&[(4.0, tiny)]);
        assert_eq!(tally.may_unwind_faster(), 1);
        assert_eq!(tally.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_empty_tally() {
        let tally = Tally::new();
        assert_eq!(tally.shortest_no_unwind_ns(), None);
        assert_eq!(tally.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_shortest_tracks_minimum() {
        let tally = tally_of(&[(5.0, 7.0), (3.0, 9.0), (4.0, 6.0)]);
        assert_eq!(tally.shortest_no_unwind_ns(), Some(3.0));
        assert_eq!(tally.shortest_may_unwind_ns(), Some(6.0));
        assert_eq!(tally.sum_no_unwind_ns(), 12.0);
        assert_eq!(tally.sum_may_unwind_ns(), 22.0);
    }

    #[test]
    fn test_divide_by_positive() {
        assert_eq!(divide_by_positive(6.0, 3.0), 2.0);
        for x in [0.0, 1e-300, 1.0, 4.0, 1e10, f64::MAX] {
            for y in [0.0, -0.0, -1.0, -1e300] {
                let r = divide_by_positive(x, y);
                assert!(r.is_finite() && r > 0.0, "x={} y={} r={}", x, y, r);
            }
        }
    }

    #[test]
    fn test_win_counts_never_exceed_trials() {
        let pairs: Vec<(f64, f64)> = (0..50)
            .map(|i| ((i % 7) as f64, (i % 5) as f64))
            .collect();
        let tally = tally_of(&pairs);
        assert_eq!(tally.trials(), 50);
        assert!(tally.no_unwind_faster() + tally.may_unwind_faster() <= tally.trials());
    }
}
