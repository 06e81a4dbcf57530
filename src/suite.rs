//! Top-level driver: one stopwatch, a sequence of test cases.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::Config;
use crate::error::Result;
use crate::measurement::{pin_current_thread, Stopwatch};
use crate::output::json::SummaryCollector;
use crate::output::Report;
use crate::result::{CaseSummary, Metadata, RunReport};
use crate::test_case::TestCase;
use crate::trial::Order;
use crate::workload::{
    exported_calls, inline_calls, recursive_calls, unrolled_recursion, vector_reserve, Frames,
    MayUnwind, NoUnwind, UnrolledDepth, Variant, WorkloadKind,
};

/// Runs every configured workload pair and aggregates the trials.
#[derive(Debug)]
pub struct Suite {
    config: Config,
    stopwatch: Stopwatch,
}

impl Suite {
    /// Validate `config`, pin the thread and set up the stopwatch.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(cpu) = config.cpu {
            pin_current_thread(cpu)?;
        }

        let stopwatch = match config.cycles_per_ns {
            Some(cpn) => Stopwatch::with_cycles_per_ns(cpn)?,
            None => Stopwatch::calibrate()?,
        }
        .sampling(config.loop_size, config.minimum_of);

        tracing::info!(
            timer = stopwatch.timer_name(),
            cycles_per_ns = stopwatch.cycles_per_ns(),
            resolution_ns = stopwatch.resolution_ns(),
            loop_size = stopwatch.loop_size(),
            minimum_of = stopwatch.minimum_of(),
            trials = config.trials,
            "stopwatch ready"
        );

        Ok(Self { config, stopwatch })
    }

    /// Build a suite around an existing stopwatch, skipping pinning.
    pub fn with_stopwatch(config: Config, stopwatch: Stopwatch) -> Result<Self> {
        config.validate()?;
        let stopwatch = stopwatch.sampling(config.loop_size, config.minimum_of);
        Ok(Self { config, stopwatch })
    }

    /// The configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared stopwatch.
    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Run every configured case, reporting to `report`.
    pub fn run(&self, report: &dyn Report) -> RunReport {
        let start = Instant::now();
        let collector = SummaryCollector::new(report);
        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_os_rng(),
        };

        for &kind in &self.config.cases {
            self.run_kind(kind, &collector, &mut rng);
        }
        collector.run_finished();

        tracing::info!(
            cases = self.config.cases.len(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "run finished"
        );

        RunReport {
            metadata: self.metadata(),
            cases: collector.into_summaries(),
        }
    }

    /// Run a single workload pair as one test case.
    pub fn run_kind(
        &self,
        kind: WorkloadKind,
        report: &dyn Report,
        rng: &mut Xoshiro256PlusPlus,
    ) -> CaseSummary {
        let sizes = self.config.sizes;
        let fail = self.config.force_failure;

        match kind {
            WorkloadKind::InlineCalls => {
                let n = sizes.inline_calls;
                self.run_pair(
                    kind,
                    u64::from(n),
                    report,
                    rng,
                    || inline_calls::<NoUnwind>(n, fail),
                    || inline_calls::<MayUnwind>(n, fail),
                )
            }
            WorkloadKind::ExportedCalls => {
                let n = sizes.exported_calls;
                self.run_pair(
                    kind,
                    u64::from(n),
                    report,
                    rng,
                    || exported_calls::<NoUnwind>(n, fail),
                    || exported_calls::<MayUnwind>(n, fail),
                )
            }
            WorkloadKind::RecursiveCalls => {
                let n = sizes.recursion_depth;
                self.run_pair(
                    kind,
                    u64::from(n),
                    report,
                    rng,
                    || recursive_calls::<NoUnwind>(n, fail),
                    || recursive_calls::<MayUnwind>(n, fail),
                )
            }
            WorkloadKind::UnrolledRecursion => self.run_pair(
                kind,
                u64::from(UnrolledDepth::DEPTH),
                report,
                rng,
                || unrolled_recursion::<NoUnwind>(fail),
                || unrolled_recursion::<MayUnwind>(fail),
            ),
            WorkloadKind::VectorReserve => {
                let n = sizes.reserve_elements;
                self.run_pair(
                    kind,
                    n as u64,
                    report,
                    rng,
                    || vector_reserve::<NoUnwind>(n),
                    || vector_reserve::<MayUnwind>(n),
                )
            }
        }
    }

    fn run_pair<A, B, TA, TB>(
        &self,
        kind: WorkloadKind,
        n: u64,
        report: &dyn Report,
        rng: &mut Xoshiro256PlusPlus,
        mut no_unwind: A,
        mut may_unwind: B,
    ) -> CaseSummary
    where
        A: FnMut() -> TA,
        B: FnMut() -> TB,
    {
        tracing::debug!(
            case = kind.key(),
            n,
            trials = self.config.trials,
            variants = %format!("{} vs {}", NoUnwind::NAME, MayUnwind::NAME),
            shuffled = self.config.shuffle_order,
            "starting test case"
        );

        let mut case = TestCase::begin(kind.label(), n, &self.stopwatch, report);
        for _ in 0..self.config.trials {
            let order = self.pick_order(rng);
            case.measure_trial(order, &mut no_unwind, &mut may_unwind);
        }
        case.finish()
    }

    /// Which variant a trial measures first.
    fn pick_order(&self, rng: &mut Xoshiro256PlusPlus) -> Order {
        if self.config.shuffle_order && rng.random::<bool>() {
            Order::MayUnwindFirst
        } else {
            Order::NoUnwindFirst
        }
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            timer: self.stopwatch.timer_name().to_string(),
            cycles_per_ns: self.stopwatch.cycles_per_ns(),
            timer_resolution_ns: self.stopwatch.resolution_ns(),
            loop_size: self.stopwatch.loop_size(),
            minimum_of: self.stopwatch.minimum_of(),
            trials: self.config.trials,
            cpu: self.config.cpu,
            profile: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
            pointer_width: usize::BITS,
        }
    }
}
