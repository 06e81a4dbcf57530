//! Paired workloads: the same work with and without the ability to unwind.
//!
//! [`Variant`] is implemented by two uninhabited marker types:
//! - [`NoUnwind`]: every call goes through `extern "C"` functions or code that
//!   aborts on failure, so the optimizer knows nothing unwinds.
//! - [`MayUnwind`]: the same bodies behind `extern "C-unwind"` functions and
//!   panics, so live guards need cleanup paths.
//!
//! Both variants of a workload perform identical work; only the unwind
//! guarantee differs.

mod boundary;
mod fail_point;
mod unrolled;

use std::fmt;
use std::hint::black_box;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use boundary::{
    exported_may_unwind, exported_no_unwind, recurse_may_unwind, recurse_no_unwind, Sentinel,
};
pub use fail_point::{abort_if, panic_if};
pub use unrolled::{Base, Frame, Frames, Frames64, Frames8, UnrolledDepth};

/// One side of a workload pair.
pub trait Variant {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// A call that is always inlined into the caller.
    fn inline_call(fail: bool);

    /// A call across an optimization boundary.
    fn exported_call(fail: bool);

    /// Construct a guard object.
    fn guard(fail: bool) -> Sentinel;

    /// Runtime recursion producing `depth` frames.
    fn recurse(depth: u32, fail: bool);

    /// Reserve capacity for `additional` more elements.
    fn reserve<T>(v: &mut Vec<T>, additional: usize);
}

/// Work that is guaranteed not to unwind.
#[derive(Debug)]
pub enum NoUnwind {}

/// Logically identical work without that guarantee.
#[derive(Debug)]
pub enum MayUnwind {}

impl Variant for NoUnwind {
    const NAME: &'static str = "no-unwind";

    #[inline(always)]
    fn inline_call(fail: bool) {
        abort_if(fail);
    }

    #[inline(always)]
    fn exported_call(fail: bool) {
        exported_no_unwind(fail);
    }

    #[inline(always)]
    fn guard(fail: bool) -> Sentinel {
        Sentinel::quiet(fail)
    }

    #[inline(always)]
    fn recurse(depth: u32, fail: bool) {
        recurse_no_unwind(depth, fail);
    }

    #[inline(always)]
    fn reserve<T>(v: &mut Vec<T>, additional: usize) {
        if v.try_reserve(additional).is_err() {
            std::process::abort();
        }
    }
}

impl Variant for MayUnwind {
    const NAME: &'static str = "may-unwind";

    #[inline(always)]
    fn inline_call(fail: bool) {
        panic_if(fail);
    }

    #[inline(always)]
    fn exported_call(fail: bool) {
        exported_may_unwind(fail);
    }

    #[inline(always)]
    fn guard(fail: bool) -> Sentinel {
        Sentinel::armed(fail)
    }

    #[inline(always)]
    fn recurse(depth: u32, fail: bool) {
        recurse_may_unwind(depth, fail);
    }

    #[inline(always)]
    fn reserve<T>(v: &mut Vec<T>, additional: usize) {
        v.reserve(additional);
    }
}

/// `n` inlined calls.
pub fn inline_calls<V: Variant>(n: u32, fail: bool) {
    for _ in 0..n {
        V::inline_call(black_box(fail));
    }
}

/// `n` calls across the optimization boundary.
pub fn exported_calls<V: Variant>(n: u32, fail: bool) {
    for _ in 0..n {
        V::exported_call(black_box(fail));
    }
}

/// One recursion of `depth` frames.
pub fn recursive_calls<V: Variant>(depth: u32, fail: bool) {
    V::recurse(black_box(depth), black_box(fail));
}

/// One walk down the compile-time chain of [`UnrolledDepth`] frames.
pub fn unrolled_recursion<V: Variant>(fail: bool) {
    UnrolledDepth::run::<V>(black_box(fail));
}

/// Fill a vector with `n` strings, then reserve room for `n` more.
///
/// The vector starts full, so the reservation reallocates and relocates every
/// element. Returns the new capacity.
pub fn vector_reserve<V: Variant>(n: usize) -> usize {
    let mut v: Vec<String> = vec![String::new(); black_box(n)];
    V::reserve(&mut v, black_box(n));
    black_box(&v);
    v.capacity()
}

/// The call patterns that make up a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    /// Calls inlined into the measuring loop.
    InlineCalls,
    /// Calls to non-inlined entry points.
    ExportedCalls,
    /// Runtime recursion with a guard per frame.
    RecursiveCalls,
    /// Compile-time unrolled recursion with a guard per frame.
    UnrolledRecursion,
    /// Vector capacity reservation.
    VectorReserve,
}

impl WorkloadKind {
    /// Every workload, in run order.
    pub const ALL: [WorkloadKind; 5] = [
        WorkloadKind::InlineCalls,
        WorkloadKind::ExportedCalls,
        WorkloadKind::RecursiveCalls,
        WorkloadKind::UnrolledRecursion,
        WorkloadKind::VectorReserve,
    ];

    /// Label printed in reports.
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadKind::InlineCalls => "inline function calls",
            WorkloadKind::ExportedCalls => "exported function calls",
            WorkloadKind::RecursiveCalls => "recursive function calls",
            WorkloadKind::UnrolledRecursion => "unrolled recursion",
            WorkloadKind::VectorReserve => "vector reserve",
        }
    }

    /// Short key used on the command line and in `UB_CASES`.
    pub fn key(&self) -> &'static str {
        match self {
            WorkloadKind::InlineCalls => "inline",
            WorkloadKind::ExportedCalls => "exported",
            WorkloadKind::RecursiveCalls => "recursive",
            WorkloadKind::UnrolledRecursion => "unrolled",
            WorkloadKind::VectorReserve => "reserve",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        WorkloadKind::ALL
            .into_iter()
            .find(|kind| kind.key() == lower)
            .ok_or_else(|| {
                let keys: Vec<_> = WorkloadKind::ALL.iter().map(|k| k.key()).collect();
                format!("unknown workload `{}` (expected one of: {})", s, keys.join(", "))
            })
    }
}
