//! Measurement infrastructure.
//!
//! This module provides:
//! - A serialized cycle counter with platform-specific implementations
//! - [`Stopwatch`], the minimum-of-N timing primitive
//! - CPU pinning for the measuring thread
//!
//! # Counter Selection
//!
//! - **x86_64**: `rdtsc` (~1ns resolution)
//! - **aarch64**: `cntvct_el0` virtual timer (resolution varies by SoC)
//! - **other**: `std::time::Instant`
//!
//! Coarse counters are not a problem for the workloads here: every sample
//! spans `loop_size` invocations, so even a 40ns tick is amortized.

mod affinity;
mod timer;

pub use affinity::pin_current_thread;
pub use timer::{
    calibrate_cycles_per_ns, counter_name, read_counter, Stopwatch, DEFAULT_LOOP_SIZE,
    DEFAULT_MINIMUM_OF,
};
