//! Configuration for a benchmark run.

use std::env;
use std::path::PathBuf;

use crate::error::{BenchError, Result};
use crate::measurement::{DEFAULT_LOOP_SIZE, DEFAULT_MINIMUM_OF};
use crate::workload::WorkloadKind;

/// Per-workload N: how much work one unit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    /// Inlined calls per unit.
    pub inline_calls: u32,
    /// Boundary calls per unit.
    pub exported_calls: u32,
    /// Frames per runtime recursion.
    ///
    /// Deep recursion can exhaust the main thread's stack; that is not caught.
    pub recursion_depth: u32,
    /// Strings a vector holds before reserving room for as many again.
    pub reserve_elements: usize,
}

impl Sizes {
    /// Sizes for optimized builds.
    pub const RELEASE: Sizes = Sizes {
        inline_calls: 10_000,
        exported_calls: 10_000,
        recursion_depth: 1_000,
        reserve_elements: 100_000,
    };

    /// Sizes for debug builds, small enough to finish quickly unoptimized.
    pub const DEBUG: Sizes = Sizes {
        inline_calls: 42,
        exported_calls: 42,
        recursion_depth: 42,
        reserve_elements: 42,
    };
}

impl Default for Sizes {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Sizes::DEBUG
        } else {
            Sizes::RELEASE
        }
    }
}

/// Configuration options for a [`Suite`](crate::Suite) run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trials per test case (default: 10 in release, 4 in debug).
    pub trials: u32,

    /// Repetitions of the unit of work per timed sample (default: 1000).
    pub loop_size: usize,

    /// Samples per measurement; the fastest is kept (default: 3).
    pub minimum_of: usize,

    /// Per-workload sizes.
    pub sizes: Sizes,

    /// CPU to pin the measuring thread to (default: 0). `None` disables pinning.
    pub cpu: Option<usize>,

    /// Known counter frequency in ticks per nanosecond. Calibrated when `None`.
    pub cycles_per_ns: Option<f64>,

    /// Randomize which variant is measured first in each trial (default: true).
    pub shuffle_order: bool,

    /// Seed for the measurement order. Drawn from entropy when `None`.
    pub seed: Option<u64>,

    /// Workloads to run, in order (default: all).
    pub cases: Vec<WorkloadKind>,

    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,

    /// Take the failure path in every workload.
    ///
    /// The may-unwind variant panics and the no-unwind variant aborts the
    /// process. For validating the harness only; never set in a real run.
    pub force_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: if cfg!(debug_assertions) { 4 } else { 10 },
            loop_size: DEFAULT_LOOP_SIZE,
            minimum_of: DEFAULT_MINIMUM_OF,
            sizes: Sizes::default(),
            cpu: Some(0),
            cycles_per_ns: None,
            shuffle_order: true,
            seed: None,
            cases: WorkloadKind::ALL.to_vec(),
            report_path: None,
            force_failure: false,
        }
    }
}

impl Config {
    /// Overlay `UB_*` environment variables onto this configuration.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env(mut self) -> Self {
        if let Some(trials) = parse_env("UB_TRIALS") {
            self.trials = trials;
        }
        if let Some(loop_size) = parse_env("UB_LOOP_SIZE") {
            self.loop_size = loop_size;
        }
        if let Some(minimum_of) = parse_env("UB_MINIMUM_OF") {
            self.minimum_of = minimum_of;
        }
        if let Some(n) = parse_env("UB_INLINE_CALLS") {
            self.sizes.inline_calls = n;
        }
        if let Some(n) = parse_env("UB_EXPORTED_CALLS") {
            self.sizes.exported_calls = n;
        }
        if let Some(n) = parse_env("UB_RECURSION_DEPTH") {
            self.sizes.recursion_depth = n;
        }
        if let Some(n) = parse_env("UB_RESERVE_ELEMENTS") {
            self.sizes.reserve_elements = n;
        }
        if let Ok(raw) = env::var("UB_CPU") {
            if raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("off") {
                self.cpu = None;
            } else if let Some(cpu) = parse_value("UB_CPU", &raw) {
                self.cpu = Some(cpu);
            }
        }
        if let Some(cpn) = parse_env("UB_CYCLES_PER_NS") {
            self.cycles_per_ns = Some(cpn);
        }
        if let Some(seed) = parse_env("UB_SEED") {
            self.seed = Some(seed);
        }
        if let Ok(raw) = env::var("UB_SHUFFLE") {
            self.shuffle_order = !(raw == "0" || raw.eq_ignore_ascii_case("false"));
        }
        if let Ok(path) = env::var("UB_REPORT") {
            self.report_path = Some(PathBuf::from(path));
        }
        if let Ok(raw) = env::var("UB_CASES") {
            match parse_cases(&raw) {
                Ok(cases) => self.cases = cases,
                Err(reason) => tracing::warn!(%reason, "ignoring UB_CASES"),
            }
        }
        self
    }

    /// Reject values that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(BenchError::invalid("trials", "must be at least 1"));
        }
        if self.loop_size == 0 {
            return Err(BenchError::invalid("loop_size", "must be at least 1"));
        }
        if self.minimum_of == 0 {
            return Err(BenchError::invalid("minimum_of", "must be at least 1"));
        }
        if self.sizes.inline_calls == 0 {
            return Err(BenchError::invalid("inline_calls", "must be at least 1"));
        }
        if self.sizes.exported_calls == 0 {
            return Err(BenchError::invalid("exported_calls", "must be at least 1"));
        }
        if self.sizes.recursion_depth == 0 {
            return Err(BenchError::invalid("recursion_depth", "must be at least 1"));
        }
        if self.sizes.reserve_elements == 0 {
            return Err(BenchError::invalid("reserve_elements", "must be at least 1"));
        }
        if let Some(cpn) = self.cycles_per_ns {
            if !cpn.is_finite() || cpn <= 0.0 {
                return Err(BenchError::invalid(
                    "cycles_per_ns",
                    format!("{} is not a positive frequency", cpn),
                ));
            }
        }
        if self.cases.is_empty() {
            return Err(BenchError::invalid("cases", "no workloads selected"));
        }
        Ok(())
    }
}

/// Parse a comma-separated list of workload keys.
pub fn parse_cases(raw: &str) -> std::result::Result<Vec<WorkloadKind>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    parse_value(key, &raw)
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "ignoring unparseable environment variable");
            None
        }
    }
}
