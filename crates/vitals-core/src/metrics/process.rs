//! Process-default metrics, refreshed on every export.
//!
//! On Linux the `process_*` families are read through `procfs`. A family whose
//! source cannot be read is left out of that export; it never fails the
//! export as a whole. Elsewhere the families are skipped. Async runtime gauges
//! are written whenever export runs inside a tokio runtime.

use std::path::{Path, PathBuf};

use super::{write_single, Collector};
use crate::error::Result;

const CPU_USER: &str = "process_cpu_user_seconds_total";
const CPU_SYSTEM: &str = "process_cpu_system_seconds_total";
const CPU_TOTAL: &str = "process_cpu_seconds_total";
const START_TIME: &str = "process_start_time_seconds";
const RESIDENT: &str = "process_resident_memory_bytes";
const VIRTUAL: &str = "process_virtual_memory_bytes";
const OPEN_FDS: &str = "process_open_fds";
const MAX_FDS: &str = "process_max_fds";
const RT_WORKERS: &str = "vitals_runtime_workers";
const RT_ALIVE_TASKS: &str = "vitals_runtime_alive_tasks";

const DEFAULT_PROC_DIR: &str = "/proc/self";

#[derive(Debug)]
pub struct ProcessCollector {
    proc_dir: PathBuf,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    /// Collector for the current process.
    pub fn new() -> Self {
        Self::with_proc_dir(DEFAULT_PROC_DIR)
    }

    /// Read process entries (`stat`, `limits`, `fd/`) from `dir`, a
    /// `/proc/<pid>` style directory whose last component is the pid (or a
    /// symlink to it, like `/proc/self`).
    pub fn with_proc_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            proc_dir: dir.into(),
        }
    }

    pub fn proc_dir(&self) -> &Path {
        &self.proc_dir
    }
}

impl Collector for ProcessCollector {
    fn names(&self) -> Vec<String> {
        [
            CPU_USER, CPU_SYSTEM, CPU_TOTAL, START_TIME, RESIDENT, VIRTUAL, OPEN_FDS, MAX_FDS,
            RT_WORKERS, RT_ALIVE_TASKS,
        ]
        .iter()
        .map(|n| n.to_string())
        .collect()
    }

    fn encode(&self, out: &mut String) -> Result<()> {
        #[cfg(target_os = "linux")]
        linux::encode(&self.proc_dir, out)?;

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let m = handle.metrics();
            write_single(out, RT_WORKERS, "Number of async runtime worker threads.", "gauge", m.num_workers())?;
            write_single(out, RT_ALIVE_TASKS, "Number of alive tasks in the async runtime.", "gauge", m.num_alive_tasks())?;
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;

    use procfs::process::{LimitValue, Process};

    use super::*;

    pub(super) fn encode(proc_dir: &Path, out: &mut String) -> Result<()> {
        // Scoped so the process directory handle is closed before fds are counted.
        {
            let process = match Process::new_with_root(proc_dir.to_path_buf()) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(dir = %proc_dir.display(), error = %e, "process metrics unavailable");
                    return Ok(());
                }
            };
            encode_stat(&process, out)?;
            encode_max_fds(&process, out)?;
        }
        encode_open_fds(proc_dir, out)
    }

    fn encode_stat(process: &Process, out: &mut String) -> Result<()> {
        let stat = match process.stat() {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "skipping process stat metrics");
                return Ok(());
            }
        };

        let ticks = procfs::ticks_per_second() as f64;
        let user = stat.utime as f64 / ticks;
        let system = stat.stime as f64 / ticks;

        write_single(out, CPU_USER, "Total user CPU time spent in seconds.", "counter", user)?;
        write_single(out, CPU_SYSTEM, "Total system CPU time spent in seconds.", "counter", system)?;
        write_single(out, CPU_TOTAL, "Total user and system CPU time spent in seconds.", "counter", user + system)?;

        match procfs::boot_time_secs() {
            Ok(btime) => {
                let start = btime as f64 + stat.starttime as f64 / ticks;
                write_single(out, START_TIME, "Start time of the process since unix epoch in seconds.", "gauge", start)?;
            }
            Err(e) => tracing::debug!(error = %e, "skipping process start time"),
        }

        let resident = stat.rss.saturating_mul(procfs::page_size());
        write_single(out, RESIDENT, "Resident memory size in bytes.", "gauge", resident)?;
        write_single(out, VIRTUAL, "Virtual memory size in bytes.", "gauge", stat.vsize)?;
        Ok(())
    }

    fn encode_max_fds(process: &Process, out: &mut String) -> Result<()> {
        match process.limits() {
            Ok(limits) => {
                if let LimitValue::Value(max) = limits.max_open_files.soft_limit {
                    write_single(out, MAX_FDS, "Maximum number of open file descriptors.", "gauge", max)?;
                }
            }
            Err(e) => tracing::debug!(error = %e, "skipping process fd limit"),
        }
        Ok(())
    }

    fn encode_open_fds(proc_dir: &Path, out: &mut String) -> Result<()> {
        let fd_dir = proc_dir.join("fd");
        match fs::read_dir(&fd_dir) {
            // One entry is the handle of this scan.
            Ok(entries) => {
                let open = entries.count().saturating_sub(1);
                write_single(out, OPEN_FDS, "Number of open file descriptors.", "gauge", open)?;
            }
            Err(e) => tracing::debug!(dir = %fd_dir.display(), error = %e, "skipping open fd count"),
        }
        Ok(())
    }
}
