//! Pin the measuring thread to a single CPU.
//!
//! Migration between cores resets caches and, on some machines, moves the
//! thread onto a counter that is not synchronized with the previous one.

use crate::error::Result;

/// Pin the calling thread to `cpu`.
///
/// On Linux a failure is fatal. Other platforms do not support pinning and
/// only log a warning.
pub fn pin_current_thread(cpu: usize) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        pin_linux(cpu)
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::warn!(cpu, "CPU pinning is not supported on this platform, continuing unpinned");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn pin_linux(cpu: usize) -> Result<()> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    use crate::error::BenchError;

    let mut cpu_set = CpuSet::new();
    cpu_set.set(cpu).map_err(|e| BenchError::Affinity {
        cpu,
        reason: e.to_string(),
    })?;

    // Pid 0 targets the calling thread.
    sched_setaffinity(Pid::from_raw(0), &cpu_set).map_err(|e| BenchError::Affinity {
        cpu,
        reason: e.to_string(),
    })?;

    tracing::debug!(cpu, "pinned measuring thread");
    Ok(())
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_cpu_is_rejected() {
        // CpuSet holds at most CpuSet::count() entries.
        let err = pin_current_thread(usize::MAX).unwrap_err();
        assert!(err.to_string().contains("CPU"), "{}", err);
    }
}
