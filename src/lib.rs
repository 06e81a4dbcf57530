//! # unwind-bench
//!
//! Measure what the ability to unwind costs.
//!
//! Every workload comes in two variants that do identical work:
//! - [`NoUnwind`]: calls go through `extern "C"` functions and failures
//!   abort, so the compiler may drop landing pads.
//! - [`MayUnwind`]: the same calls through `extern "C-unwind"` functions
//!   and failures panic, so live guards keep their cleanup paths.
//!
//! Each trial measures both variants with a cycle-counter [`Stopwatch`]
//! (fastest of several samples, averaged over a loop), and a [`Tally`]
//! decides which variant won every trial, if either did.
//!
//! ## Quick Start
//!
//! ```ignore
//! use unwind_bench::{Config, Suite, TerminalReport};
//!
//! let suite = Suite::new(Config::default().from_env())?;
//! let report = suite.run(&TerminalReport::new());
//! for case in &report.cases {
//!     println!("{}: {}", case.label, case.verdict);
//! }
//! ```
//!
//! ## Measuring your own pair
//!
//! ```ignore
//! use unwind_bench::{NullReport, Order, Stopwatch, TestCase};
//!
//! let stopwatch = Stopwatch::calibrate()?;
//! let mut case = TestCase::begin("my pair", 100, &stopwatch, &NullReport);
//! for _ in 0..10 {
//!     case.measure_trial(Order::NoUnwindFirst, || fast(), || slow());
//! }
//! let summary = case.finish();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod result;
mod suite;
mod test_case;
mod trial;

// Functional modules
pub mod measurement;
pub mod output;
pub mod workload;

// Re-exports for public API
pub use config::{parse_cases, Config, Sizes};
pub use error::{BenchError, Result};
pub use measurement::Stopwatch;
pub use output::{NullReport, Report, TerminalReport};
pub use result::{CaseSummary, Metadata, RunReport, Verdict};
pub use suite::Suite;
pub use test_case::TestCase;
pub use trial::{divide_by_positive, Order, Tally, TrialPair};
pub use workload::{MayUnwind, NoUnwind, Variant, WorkloadKind};
