//! Scoped test cases.
//!
//! A [`TestCase`] moves through `begin → record* → finish`. The header is
//! reported on `begin`, each trial as it is recorded, and the summary exactly
//! once: by [`TestCase::finish`], or by `Drop` when the case is abandoned
//! early (an error propagated with `?`, or a panicking workload).

use crate::measurement::Stopwatch;
use crate::output::Report;
use crate::result::CaseSummary;
use crate::trial::{Order, Tally, TrialPair};

/// A labeled section of a run with its own aggregate.
pub struct TestCase<'a> {
    label: &'a str,
    n: u64,
    stopwatch: &'a Stopwatch,
    report: &'a dyn Report,
    tally: Tally,
    finalized: bool,
}

impl<'a> TestCase<'a> {
    /// Start a test case and report its header.
    pub fn begin(label: &'a str, n: u64, stopwatch: &'a Stopwatch, report: &'a dyn Report) -> Self {
        report.case_started(label, n);
        Self {
            label,
            n,
            stopwatch,
            report,
            tally: Tally::new(),
            finalized: false,
        }
    }

    /// Label of this case.
    pub fn label(&self) -> &str {
        self.label
    }

    /// Configured N of this case.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Aggregate so far.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Record an externally measured trial.
    pub fn record_trial(&mut self, pair: TrialPair) {
        self.report.trial_recorded(&pair);
        self.tally.record(pair);
    }

    /// Measure both variants with the shared stopwatch and record the pair.
    pub fn measure_trial<A, B, TA, TB>(
        &mut self,
        order: Order,
        no_unwind: A,
        may_unwind: B,
    ) -> TrialPair
    where
        A: FnMut() -> TA,
        B: FnMut() -> TB,
    {
        let pair = match order {
            Order::NoUnwindFirst => {
                let a = self.stopwatch.measure(no_unwind);
                let b = self.stopwatch.measure(may_unwind);
                TrialPair::new(a, b)
            }
            Order::MayUnwindFirst => {
                let b = self.stopwatch.measure(may_unwind);
                let a = self.stopwatch.measure(no_unwind);
                TrialPair::new(a, b)
            }
        };
        self.record_trial(pair);
        pair
    }

    /// Snapshot of the current aggregate.
    pub fn summary(&self) -> CaseSummary {
        CaseSummary::from_tally(self.label, self.n, &self.tally)
    }

    /// Finalize the case, report its summary and return it.
    pub fn finish(mut self) -> CaseSummary {
        let summary = self.summary();
        self.report.case_finished(&summary);
        self.finalized = true;
        summary
    }
}

impl Drop for TestCase<'_> {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let summary = self.summary();
        tracing::warn!(
            case = self.label,
            trials = summary.trials,
            "test case ended before finishing, reporting partial summary"
        );
        self.report.case_finished(&summary);
    }
}
