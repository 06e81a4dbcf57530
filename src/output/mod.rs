//! Report sinks.
//!
//! A [`Report`] receives the events of a run: case headers, trial pairs and
//! case summaries. [`TerminalReport`] prints them; [`json`] serializes the
//! final [`RunReport`](crate::RunReport).

pub mod json;
mod terminal;

pub use terminal::{format_summary, format_trial, TerminalReport};

use crate::result::CaseSummary;
use crate::trial::TrialPair;

/// Receiver for run events.
pub trait Report {
    /// A test case started.
    fn case_started(&self, label: &str, n: u64);

    /// A trial finished.
    fn trial_recorded(&self, pair: &TrialPair);

    /// A test case was finalized. Called exactly once per case.
    fn case_finished(&self, summary: &CaseSummary);

    /// All test cases ran.
    fn run_finished(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReport;

impl Report for NullReport {
    fn case_started(&self, _label: &str, _n: u64) {}
    fn trial_recorded(&self, _pair: &TrialPair) {}
    fn case_finished(&self, _summary: &CaseSummary) {}
}
