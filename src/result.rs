//! Verdicts and report types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trial::Tally;
use crate::workload::{MayUnwind, NoUnwind, Variant};

/// Aggregate conclusion of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    /// The no-unwind variant won every trial.
    NoUnwindFaster {
        /// `sum(may_unwind) / sum(no_unwind)`.
        ratio: f64,
    },
    /// The may-unwind variant won every trial.
    MayUnwindFaster {
        /// `sum(no_unwind) / sum(may_unwind)`.
        ratio: f64,
    },
    /// Neither variant won every trial.
    Inconclusive,
}

impl Verdict {
    /// Speed ratio of the winner, if there is one.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Verdict::NoUnwindFaster { ratio } | Verdict::MayUnwindFaster { ratio } => Some(*ratio),
            Verdict::Inconclusive => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NoUnwindFaster { ratio } => write!(
                f,
                "In this case, {} functions always appear faster (~{:.3}x).",
                NoUnwind::NAME,
                ratio
            ),
            Verdict::MayUnwindFaster { ratio } => write!(
                f,
                "In this case, {} functions always appear faster (~{:.3}x).",
                MayUnwind::NAME,
                ratio
            ),
            Verdict::Inconclusive => write!(
                f,
                "In this case, neither {} nor {} functions always appear faster.",
                NoUnwind::NAME,
                MayUnwind::NAME
            ),
        }
    }
}

/// Snapshot of a finalized test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// Test case label.
    pub label: String,
    /// Configured iteration/recursion/element count.
    pub n: u64,
    /// Number of recorded trials.
    pub trials: u32,
    /// Trials won by the no-unwind variant.
    pub no_unwind_faster: u32,
    /// Trials won by the may-unwind variant.
    pub may_unwind_faster: u32,
    /// Fastest no-unwind trial (ns), absent if no trial ran.
    pub shortest_no_unwind_ns: Option<f64>,
    /// Fastest may-unwind trial (ns), absent if no trial ran.
    pub shortest_may_unwind_ns: Option<f64>,
    /// Summed no-unwind durations (ns).
    pub sum_no_unwind_ns: f64,
    /// Summed may-unwind durations (ns).
    pub sum_may_unwind_ns: f64,
    /// `sum(no_unwind) / sum(may_unwind)`.
    pub ratio_no_unwind_to_may_unwind: f64,
    /// `sum(may_unwind) / sum(no_unwind)`.
    pub ratio_may_unwind_to_no_unwind: f64,
    /// Final verdict.
    pub verdict: Verdict,
}

impl CaseSummary {
    /// Summarize a tally under the given label.
    pub fn from_tally(label: &str, n: u64, tally: &Tally) -> Self {
        Self {
            label: label.to_string(),
            n,
            trials: tally.trials(),
            no_unwind_faster: tally.no_unwind_faster(),
            may_unwind_faster: tally.may_unwind_faster(),
            shortest_no_unwind_ns: tally.shortest_no_unwind_ns(),
            shortest_may_unwind_ns: tally.shortest_may_unwind_ns(),
            sum_no_unwind_ns: tally.sum_no_unwind_ns(),
            sum_may_unwind_ns: tally.sum_may_unwind_ns(),
            ratio_no_unwind_to_may_unwind: tally.ratio_no_unwind_to_may_unwind(),
            ratio_may_unwind_to_no_unwind: tally.ratio_may_unwind_to_no_unwind(),
            verdict: tally.verdict(),
        }
    }
}

/// Metadata describing how a run was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Counter source (`rdtsc`, `cntvct_el0`, `Instant`).
    pub timer: String,
    /// Counter ticks per nanosecond.
    pub cycles_per_ns: f64,
    /// Estimated counter resolution in nanoseconds.
    pub timer_resolution_ns: f64,
    /// Repetitions per sample.
    pub loop_size: usize,
    /// Samples per measurement.
    pub minimum_of: usize,
    /// Trials per test case.
    pub trials: u32,
    /// CPU the measuring thread was pinned to.
    pub cpu: Option<usize>,
    /// `"release"` or `"debug"`.
    pub profile: String,
    /// Target pointer width in bits.
    pub pointer_width: u32,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Measurement metadata.
    pub metadata: Metadata,
    /// One summary per test case, in run order.
    pub cases: Vec<CaseSummary>,
}
