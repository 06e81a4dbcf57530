//! JSON serialization for run reports.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use super::Report;
use crate::error::{BenchError, Result};
use crate::result::{CaseSummary, RunReport};
use crate::trial::TrialPair;

/// Serialize a report to a pretty-printed JSON string.
pub fn to_json_pretty(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write a report to `path`, creating parent directories.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BenchError::ReportIo {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let json = to_json_pretty(report)?;
    fs::write(path, json).map_err(|source| BenchError::ReportIo {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), cases = report.cases.len(), "report written");
    Ok(())
}

/// Collects case summaries as they are finalized.
///
/// Forwards every event to an inner reporter, so it can sit in front of the
/// terminal output.
pub struct SummaryCollector<'r> {
    inner: &'r dyn Report,
    summaries: RefCell<Vec<CaseSummary>>,
}

impl<'r> SummaryCollector<'r> {
    /// Wrap `inner`.
    pub fn new(inner: &'r dyn Report) -> Self {
        Self {
            inner,
            summaries: RefCell::new(Vec::new()),
        }
    }

    /// Summaries collected so far, in finalization order.
    pub fn into_summaries(self) -> Vec<CaseSummary> {
        self.summaries.into_inner()
    }
}

impl Report for SummaryCollector<'_> {
    fn case_started(&self, label: &str, n: u64) {
        self.inner.case_started(label, n);
    }

    fn trial_recorded(&self, pair: &TrialPair) {
        self.inner.trial_recorded(pair);
    }

    fn case_finished(&self, summary: &CaseSummary) {
        self.summaries.borrow_mut().push(summary.clone());
        self.inner.case_finished(summary);
    }

    fn run_finished(&self) {
        self.inner.run_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullReport;
    use crate::result::Metadata;
    use crate::trial::Tally;

    fn make_report() -> RunReport {
        let mut tally = Tally::new();
        tally.record(TrialPair::new(5.0, 7.0));
        RunReport {
            metadata: Metadata {
                timer: "rdtsc".to_string(),
                cycles_per_ns: 3.0,
                timer_resolution_ns: 0.5,
                loop_size: 1000,
                minimum_of: 3,
                trials: 1,
                cpu: Some(0),
                profile: "release".to_string(),
                pointer_width: 64,
            },
            cases: vec![CaseSummary::from_tally("inline function calls", 42, &tally)],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_report()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"inline function calls\""));
        assert!(json.contains("\"cycles_per_ns\": 3.0"));
    }

    #[test]
    fn test_collector_keeps_summaries_in_order() {
        let collector = SummaryCollector::new(&NullReport);
        let tally = Tally::new();
        collector.case_finished(&CaseSummary::from_tally("a", 1, &tally));
        collector.case_finished(&CaseSummary::from_tally("b", 2, &tally));
        let labels: Vec<_> = collector
            .into_summaries()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_write_report_creates_directories() {
        let dir = std::env::temp_dir().join(format!("unwind-bench-json-{}", std::process::id()));
        let path = dir.join("nested").join("report.json");
        write_report(&path, &make_report()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: RunReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.cases.len(), 1);
        assert_eq!(parsed.cases[0].label, "inline function calls");
        assert_eq!(parsed.metadata, make_report().metadata);

        let _ = fs::remove_dir_all(&dir);
    }
}
