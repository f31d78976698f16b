use std::ffi::OsStr;
use std::process::Stdio;

use sysinfo::{ProcessesToUpdate, System};
use tokio::process::Command;
use tracing::info;

use crate::errors::BenchError;

/// The local model server as an OS process.
pub trait ServerProcess: Send + Sync {
    /// Whether a process with the server's binary name is in the process table.
    /// Scans the whole table, so callers on the runtime go through `spawn_blocking`.
    fn is_running(&self) -> bool;

    /// Start the server in the background without waiting on it.
    fn spawn_detached(&self) -> Result<(), BenchError>;
}

pub struct SystemProcess {
    binary: String,
}

impl SystemProcess {
    pub fn new(binary: &str) -> Self {
        Self { binary: binary.to_string() }
    }
}

impl ServerProcess for SystemProcess {
    fn is_running(&self) -> bool {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);
        let running = sys.processes_by_exact_name(OsStr::new(&self.binary)).next().is_some();
        running
    }

    fn spawn_detached(&self) -> Result<(), BenchError> {
        let child = Command::new(&self.binary)
            .arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| BenchError::LocalRuntime(format!("Failed to start '{} serve': {}", self.binary, e)))?;

        info!(binary = %self.binary, pid = child.id(), "Started local model server");
        Ok(())
    }
}
