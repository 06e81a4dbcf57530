//! Non-inlined entry points, one set per unwind ABI.
//!
//! `extern "C"` functions cannot unwind: a panic inside them aborts the
//! process, so callers need no landing pads. `extern "C-unwind"` functions
//! may unwind, and every caller holding a live `Drop` value needs a cleanup
//! path. The bodies are identical.

use std::hint::black_box;

use super::fail_point::panic_if;

/// Guard object held across a call.
///
/// Its `Drop` is opaque to the optimizer, so a frame holding one must run it
/// on every exit path, including unwinding.
#[repr(C)]
#[derive(Debug)]
pub struct Sentinel {
    token: u8,
}

impl Sentinel {
    /// Construct a guard through a call that cannot unwind.
    #[inline(never)]
    pub extern "C" fn quiet(fail: bool) -> Sentinel {
        panic_if(fail);
        Sentinel { token: black_box(1) }
    }

    /// Construct a guard through a call that may unwind.
    #[inline(never)]
    pub extern "C-unwind" fn armed(fail: bool) -> Sentinel {
        panic_if(fail);
        Sentinel { token: black_box(1) }
    }
}

impl Drop for Sentinel {
    #[inline(never)]
    fn drop(&mut self) {
        black_box(self.token);
        #[cfg(test)]
        counters::note_drop();
    }
}

/// Entry point that cannot unwind.
#[inline(never)]
pub extern "C" fn exported_no_unwind(fail: bool) {
    panic_if(fail);
}

/// Entry point that may unwind.
#[inline(never)]
pub extern "C-unwind" fn exported_may_unwind(fail: bool) {
    panic_if(fail);
}

/// Recurse until `depth` frames have run, each below the first holding a guard.
#[inline(never)]
pub extern "C" fn recurse_no_unwind(depth: u32, fail: bool) {
    let depth = depth.saturating_sub(1);
    if depth > 0 {
        let _guard = Sentinel::quiet(fail);
        recurse_no_unwind(depth, fail);
    }
}

/// Same recursion through calls that may unwind.
#[inline(never)]
pub extern "C-unwind" fn recurse_may_unwind(depth: u32, fail: bool) {
    let depth = depth.saturating_sub(1);
    if depth > 0 {
        let _guard = Sentinel::armed(fail);
        recurse_may_unwind(depth, fail);
    }
}
