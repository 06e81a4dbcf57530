//! unwind-bench CLI
//!
//! Runs every workload pair and prints a per-case report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use unwind_bench::output::json::write_report;
use unwind_bench::{Config, Suite, TerminalReport, WorkloadKind};

/// Measure the cost of unwind guarantees: no-unwind vs may-unwind calls
#[derive(Parser, Debug)]
#[command(name = "unwind-bench")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trials per test case
    #[arg(long)]
    trials: Option<u32>,

    /// Repetitions of the unit of work per timed sample
    #[arg(long)]
    loop_size: Option<usize>,

    /// Samples per measurement; the fastest is kept
    #[arg(long)]
    minimum_of: Option<usize>,

    /// CPU to pin the measuring thread to
    #[arg(long, conflicts_with = "no_pin")]
    cpu: Option<usize>,

    /// Do not pin the measuring thread
    #[arg(long)]
    no_pin: bool,

    /// Known counter frequency in ticks per nanosecond (skips calibration)
    #[arg(long)]
    cycles_per_ns: Option<f64>,

    /// Seed for the measurement order
    #[arg(long)]
    seed: Option<u64>,

    /// Always measure the no-unwind variant first
    #[arg(long)]
    no_shuffle: bool,

    /// Run only this workload (repeatable): inline, exported, recursive, unrolled, reserve
    #[arg(long = "case", value_name = "NAME")]
    cases: Vec<WorkloadKind>,

    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Take the failure path in every workload (aborts the process)
    #[arg(long, hide = true)]
    force_failure: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply flags on top of `config`.
    fn apply(self, mut config: Config) -> Config {
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(loop_size) = self.loop_size {
            config.loop_size = loop_size;
        }
        if let Some(minimum_of) = self.minimum_of {
            config.minimum_of = minimum_of;
        }
        if self.no_pin {
            config.cpu = None;
        } else if let Some(cpu) = self.cpu {
            config.cpu = Some(cpu);
        }
        if let Some(cpn) = self.cycles_per_ns {
            config.cycles_per_ns = Some(cpn);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_shuffle {
            config.shuffle_order = false;
        }
        if !self.cases.is_empty() {
            config.cases = self.cases;
        }
        if let Some(path) = self.report {
            config.report_path = Some(path);
        }
        if self.force_failure {
            config.force_failure = true;
        }
        config
    }
}

fn run(config: Config) -> unwind_bench::Result<()> {
    let report_path = config.report_path.clone();
    let suite = Suite::new(config)?;
    let report = suite.run(&TerminalReport::new());

    if let Some(path) = report_path {
        write_report(&path, &report)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report.
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.apply(Config::default().from_env());
    tracing::debug!(?config, "configuration");

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "benchmark failed");
            eprintln!("unwind-bench: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "unwind-bench",
            "--trials",
            "3",
            "--no-pin",
            "--case",
            "unrolled",
            "--case",
            "reserve",
            "--no-shuffle",
            "--seed",
            "9",
        ]);
        let config = args.apply(Config::default());
        assert_eq!(config.trials, 3);
        assert_eq!(config.cpu, None);
        assert!(!config.shuffle_order);
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.cases,
            vec![WorkloadKind::UnrolledRecursion, WorkloadKind::VectorReserve]
        );
    }

    #[test]
    fn test_cpu_conflicts_with_no_pin() {
        assert!(Args::try_parse_from(["unwind-bench", "--cpu", "2", "--no-pin"]).is_err());
    }

    #[test]
    fn test_unknown_case_rejected() {
        assert!(Args::try_parse_from(["unwind-bench", "--case", "loops"]).is_err());
    }
}
