//! Console report with colors.

use std::io::Write;

use colored::Colorize;

use super::Report;
use crate::result::{CaseSummary, Verdict};
use crate::trial::TrialPair;

/// Prints run events to stdout as they happen.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalReport;

impl TerminalReport {
    /// Create a terminal reporter.
    pub fn new() -> Self {
        Self
    }
}

impl Report for TerminalReport {
    fn case_started(&self, label: &str, n: u64) {
        println!();
        println!("{}", format!("[{} (N = {})]", label, n).bold());
        println!("  {:>16}   {:>16}", "no-unwind (ns)", "may-unwind (ns)");
        let _ = std::io::stdout().flush();
    }

    fn trial_recorded(&self, pair: &TrialPair) {
        println!("{}", format_trial(pair));
        let _ = std::io::stdout().flush();
    }

    fn case_finished(&self, summary: &CaseSummary) {
        print!("{}", format_summary(summary));
        let _ = std::io::stdout().flush();
    }

    fn run_finished(&self) {
        println!("{}", "=".repeat(80));
    }
}

/// One trial line.
pub fn format_trial(pair: &TrialPair) -> String {
    format!("  {:>16.4}   {:>16.4}", pair.no_unwind_ns, pair.may_unwind_ns)
}

/// Summary block for a finalized case.
pub fn format_summary(summary: &CaseSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Shortest duration: {} (no-unwind)\n",
        format_ns(summary.shortest_no_unwind_ns)
    ));
    output.push_str(&format!(
        "Shortest duration: {} (may-unwind)\n",
        format_ns(summary.shortest_may_unwind_ns)
    ));
    output.push_str(&format!(
        "Sum of durations:  {:.4} ns (no-unwind)\n",
        summary.sum_no_unwind_ns
    ));
    output.push_str(&format!(
        "Sum of durations:  {:.4} ns (may-unwind)\n",
        summary.sum_may_unwind_ns
    ));
    output.push_str(&format!(
        "Ratio sum of durations no-unwind/may-unwind: {}\n",
        format_ratio(summary.ratio_no_unwind_to_may_unwind)
    ));
    output.push_str(&format!(
        "Ratio sum of durations may-unwind/no-unwind: {}\n",
        format_ratio(summary.ratio_may_unwind_to_no_unwind)
    ));
    output.push_str(&format!(
        "Wins: {} no-unwind, {} may-unwind, {} trials\n",
        summary.no_unwind_faster, summary.may_unwind_faster, summary.trials
    ));
    output.push_str(&format!("{}\n", format_verdict(&summary.verdict)));

    output
}

fn format_ns(value: Option<f64>) -> String {
    match value {
        Some(ns) => format!("{:.4} ns", ns),
        None => "n/a".to_string(),
    }
}

/// Fixed notation for ordinary ratios, scientific once a zero sum blows one up.
fn format_ratio(ratio: f64) -> String {
    if ratio.abs() >= 1e6 {
        format!("{:.6e}", ratio)
    } else {
        format!("{:.6}", ratio)
    }
}

fn format_verdict(verdict: &Verdict) -> String {
    let sentence = verdict.to_string();
    match verdict {
        Verdict::NoUnwindFaster { .. } => sentence.green().bold().to_string(),
        Verdict::MayUnwindFaster { .. } => sentence.yellow().bold().to_string(),
        Verdict::Inconclusive => sentence.dimmed().to_string(),
    }
}
