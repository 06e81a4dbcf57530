//! Failure hooks compiled into every workload.
//!
//! Workloads take a `fail` flag that is `false` in every measured run. The
//! optimizer cannot prove that, so each call site keeps its failure path and
//! the cost of being able to unwind is paid. Setting the flag forces the
//! path: may-unwind code panics, no-unwind code aborts the process.

/// Panic when `fail` is set.
#[inline]
pub fn panic_if(fail: bool) {
    if fail {
        fail_point_reached();
    }
}

/// Abort the process when `fail` is set.
#[inline]
pub fn abort_if(fail: bool) {
    if fail {
        std::process::abort();
    }
}

#[cold]
#[inline(never)]
fn fail_point_reached() -> ! {
    panic!("unwind-bench: fail point reached");
}
