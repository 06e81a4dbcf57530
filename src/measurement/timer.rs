//! Cycle counter and the minimum-of-N stopwatch.
//!
//! Counter sources:
//! - x86_64: `lfence; rdtsc`
//! - aarch64: `isb; mrs cntvct_el0`
//! - Fallback: nanoseconds since a process-wide `Instant`

use std::hint::black_box;
use std::sync::atomic::{compiler_fence, Ordering};
use std::time::{Duration, Instant};

use crate::error::{BenchError, Result};

/// Repetitions of the unit of work inside one timed sample.
pub const DEFAULT_LOOP_SIZE: usize = 1000;

/// Samples taken per measurement; all but the fastest are discarded.
pub const DEFAULT_MINIMUM_OF: usize = 3;

const CALIBRATION_ROUNDS: usize = 25;
const CALIBRATION_SLEEP: Duration = Duration::from_millis(1);

/// Read the cycle counter, serialized against surrounding instructions.
#[inline]
pub fn read_counter() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        counter_x86_64()
    }

    #[cfg(target_arch = "aarch64")]
    {
        counter_aarch64()
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        counter_fallback()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn counter_x86_64() -> u64 {
    compiler_fence(Ordering::SeqCst);

    let cycles: u64;
    unsafe {
        // lfence waits for prior instructions to retire before the read.
        std::arch::asm!(
            "lfence",
            "rdtsc",
            "shl rdx, 32",
            "or rax, rdx",
            out("rax") cycles,
            out("rdx") _,
            options(nostack, nomem),
        );
    }

    compiler_fence(Ordering::SeqCst);
    cycles
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn counter_aarch64() -> u64 {
    compiler_fence(Ordering::SeqCst);

    let cycles: u64;
    unsafe {
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            out(reg) cycles,
            options(nostack, nomem),
        );
    }

    compiler_fence(Ordering::SeqCst);
    cycles
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
fn counter_fallback() -> u64 {
    use std::sync::OnceLock;
    static START: OnceLock<Instant> = OnceLock::new();

    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

/// Name of the counter source compiled into this binary.
pub fn counter_name() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        "rdtsc"
    }
    #[cfg(target_arch = "aarch64")]
    {
        "cntvct_el0"
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        "Instant"
    }
}

/// Estimate counter ticks per nanosecond against the wall clock.
///
/// Takes the median ratio over a series of short sleeps. Returns
/// `TimerUnavailable` if the counter does not advance or no round produced a
/// usable ratio.
pub fn calibrate_cycles_per_ns() -> Result<f64> {
    let mut ratios = Vec::with_capacity(CALIBRATION_ROUNDS);

    for _ in 0..CALIBRATION_ROUNDS {
        let start_cycles = read_counter();
        let start_time = Instant::now();

        std::thread::sleep(CALIBRATION_SLEEP);

        let end_cycles = read_counter();
        let elapsed_nanos = start_time.elapsed().as_nanos() as u64;

        if elapsed_nanos == 0 {
            continue;
        }

        let cycles = end_cycles.saturating_sub(start_cycles);
        if cycles == 0 {
            continue;
        }
        ratios.push(cycles as f64 / elapsed_nanos as f64);
    }

    if ratios.is_empty() {
        return Err(BenchError::TimerUnavailable {
            reason: format!(
                "{} did not advance during {} calibration rounds",
                counter_name(),
                CALIBRATION_ROUNDS
            ),
        });
    }

    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = ratios.len() / 2;
    let median = if ratios.len() % 2 == 0 {
        (ratios[mid - 1] + ratios[mid]) / 2.0
    } else {
        ratios[mid]
    };

    if !median.is_finite() || median <= 0.0 {
        return Err(BenchError::TimerUnavailable {
            reason: format!("calibrated ratio {} is not usable", median),
        });
    }
    Ok(median)
}

/// Resolution of the counter in nanoseconds.
///
/// A TSC ticks once per cycle, and a slow ARM virtual timer (under 0.1
/// ticks/ns, e.g. 24 MHz) ticks once per `1 / cycles_per_ns`. Anything else
/// is measured.
fn estimate_resolution_ns(cycles_per_ns: f64) -> f64 {
    #[cfg(target_arch = "x86_64")]
    {
        1.0 / cycles_per_ns
    }

    #[cfg(target_arch = "aarch64")]
    {
        if cycles_per_ns < 0.1 {
            1.0 / cycles_per_ns
        } else {
            measure_resolution_ns(cycles_per_ns)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        measure_resolution_ns(cycles_per_ns)
    }
}

/// Smallest observable difference between two consecutive counter reads.
#[cfg_attr(target_arch = "x86_64", allow(dead_code))]
fn measure_resolution_ns(cycles_per_ns: f64) -> f64 {
    let mut min_diff = u64::MAX;

    for _ in 0..1000 {
        let t1 = read_counter();
        let t2 = read_counter();
        let diff = t2.saturating_sub(t1);
        if diff > 0 && diff < min_diff {
            min_diff = diff;
        }
    }

    if min_diff == u64::MAX {
        1.0 / cycles_per_ns
    } else {
        min_diff as f64 / cycles_per_ns
    }
}

/// The timing primitive: measures the per-invocation cost of a unit of work.
///
/// One `Stopwatch` is built per run and lent to every test case.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    cycles_per_ns: f64,
    resolution_ns: f64,
    loop_size: usize,
    minimum_of: usize,
}

impl Stopwatch {
    /// Calibrate the counter and build a stopwatch with default sampling.
    pub fn calibrate() -> Result<Self> {
        let cpn = calibrate_cycles_per_ns()?;
        tracing::debug!(cycles_per_ns = cpn, timer = counter_name(), "calibrated cycle counter");
        Self::with_cycles_per_ns(cpn)
    }

    /// Build a stopwatch for a known counter frequency.
    pub fn with_cycles_per_ns(cycles_per_ns: f64) -> Result<Self> {
        if !cycles_per_ns.is_finite() || cycles_per_ns <= 0.0 {
            return Err(BenchError::invalid(
                "cycles_per_ns",
                format!("{} is not a positive frequency", cycles_per_ns),
            ));
        }
        Ok(Self {
            cycles_per_ns,
            resolution_ns: estimate_resolution_ns(cycles_per_ns),
            loop_size: DEFAULT_LOOP_SIZE,
            minimum_of: DEFAULT_MINIMUM_OF,
        })
    }

    /// Override repetitions per sample and samples per measurement.
    ///
    /// Zero values are raised to 1.
    pub fn sampling(mut self, loop_size: usize, minimum_of: usize) -> Self {
        self.loop_size = loop_size.max(1);
        self.minimum_of = minimum_of.max(1);
        self
    }

    /// Calibrated counter ticks per nanosecond.
    pub fn cycles_per_ns(&self) -> f64 {
        self.cycles_per_ns
    }

    /// Estimated counter resolution in nanoseconds.
    pub fn resolution_ns(&self) -> f64 {
        self.resolution_ns
    }

    /// Repetitions per sample.
    pub fn loop_size(&self) -> usize {
        self.loop_size
    }

    /// Samples per measurement.
    pub fn minimum_of(&self) -> usize {
        self.minimum_of
    }

    /// Counter source name.
    pub fn timer_name(&self) -> &'static str {
        counter_name()
    }

    /// Convert counter ticks to nanoseconds.
    #[inline]
    pub fn cycles_to_ns(&self, cycles: u64) -> f64 {
        cycles as f64 / self.cycles_per_ns
    }

    /// Estimated nanoseconds for a single invocation of `work`.
    ///
    /// Runs `loop_size` invocations per sample, takes `minimum_of` samples and
    /// keeps the fastest. Each call goes through a `black_box`ed trait object
    /// between two compiler fences, so the optimizer cannot inline, hoist or
    /// reorder it across the counter reads.
    pub fn measure<F, T>(&self, mut work: F) -> f64
    where
        F: FnMut() -> T,
    {
        let work: &mut dyn FnMut() -> T = &mut work;
        let mut fastest = u64::MAX;

        for _ in 0..self.minimum_of {
            let start = read_counter();
            for _ in 0..self.loop_size {
                compiler_fence(Ordering::SeqCst);
                let f = black_box(&mut *work);
                black_box(f());
                compiler_fence(Ordering::SeqCst);
            }
            let end = read_counter();
            fastest = fastest.min(end.saturating_sub(start));
        }

        self.cycles_to_ns(fastest) / self.loop_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(rounds: u64) -> u64 {
        let mut acc = 0u64;
        for i in 0..black_box(rounds) {
            acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        acc
    }

    #[test]
    fn test_counter_monotonic() {
        let a = read_counter();
        let b = read_counter();
        assert!(b >= a || a.saturating_sub(b) < 1000);
    }

    #[test]
    fn test_calibration_reasonable() {
        let cpn = calibrate_cycles_per_ns().expect("counter should calibrate");
        // ARM virtual timers run at ~24 MHz (0.024 ticks/ns), x86 TSC at GHz.
        assert!(cpn > 0.01 && cpn < 10.0, "cycles_per_ns = {}", cpn);
    }

    #[test]
    fn test_rejects_bad_frequency() {
        assert!(Stopwatch::with_cycles_per_ns(0.0).is_err());
        assert!(Stopwatch::with_cycles_per_ns(-1.0).is_err());
        assert!(Stopwatch::with_cycles_per_ns(f64::NAN).is_err());
        assert!(Stopwatch::with_cycles_per_ns(f64::INFINITY).is_err());
    }

    #[test]
    fn test_sampling_floors_at_one() {
        let sw = Stopwatch::with_cycles_per_ns(1.0).unwrap().sampling(0, 0);
        assert_eq!(sw.loop_size(), 1);
        assert_eq!(sw.minimum_of(), 1);
    }

    #[test]
    fn test_measure_runs_work_loop_size_times_minimum_of() {
        let sw = Stopwatch::with_cycles_per_ns(1.0).unwrap().sampling(10, 3);
        let mut calls = 0usize;
        sw.measure(|| calls += 1);
        assert_eq!(calls, 30);
    }

    #[test]
    fn test_measure_non_negative_and_finite() {
        let sw = Stopwatch::calibrate().unwrap().sampling(100, 3);
        let ns = sw.measure(|| black_box(1u64 + 1));
        assert!(ns >= 0.0 && ns.is_finite(), "ns = {}", ns);
    }

    #[test]
    fn test_equal_work_measures_alike() {
        let sw = Stopwatch::calibrate().unwrap().sampling(100, 3);

        let mut first = f64::INFINITY;
        let mut second = f64::INFINITY;
        for _ in 0..10 {
            first = first.min(sw.measure(|| spin(200)));
            second = second.min(sw.measure(|| spin(200)));
        }

        assert!(first > 0.0 && second > 0.0, "first={} second={}", first, second);
        let ratio = first.max(second) / first.min(second);
        assert!(ratio < 2.0, "first={} second={} ratio={}", first, second, ratio);
    }

    #[test]
    fn test_resolution_estimate() {
        let measured = measure_resolution_ns(1.0);
        assert!(measured > 0.0 && measured.is_finite(), "measured = {}", measured);

        let sw = Stopwatch::with_cycles_per_ns(2.0).unwrap();
        #[cfg(target_arch = "x86_64")]
        assert_eq!(sw.resolution_ns(), 0.5);
        assert!(sw.resolution_ns() > 0.0 && sw.resolution_ns().is_finite());
    }

    #[test]
    fn test_measure_grows_with_cost() {
        let sw = Stopwatch::calibrate().unwrap().sampling(100, 3);
        let light = sw.measure(|| spin(1));
        let heavy = sw.measure(|| spin(5_000));
        assert!(heavy > light, "light={} heavy={}", light, heavy);
    }
}
