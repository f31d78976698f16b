use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::LocalRuntimeConfig;
use crate::errors::BenchError;
use super::process::{ServerProcess, SystemProcess};
use super::server::{LocalServerApi, OllamaServer};

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeStatus {
    Running,
    Stopped,
}

/// Makes sure the local model server is up and has a model installed before
/// a local completion is attempted. Shared by all requests.
pub struct LocalRuntimeManager {
    process: Arc<dyn ServerProcess>,
    server: Arc<dyn LocalServerApi>,
    poll_interval: Duration,
    startup_timeout: Duration,
    // Held across startup and pulls so concurrent requests don't race them.
    lock: Mutex<()>,
}

impl LocalRuntimeManager {
    pub fn new(
        process: Arc<dyn ServerProcess>,
        server: Arc<dyn LocalServerApi>,
        poll_interval: Duration,
        startup_timeout: Duration,
    ) -> Self {
        Self {
            process,
            server,
            poll_interval,
            startup_timeout,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &LocalRuntimeConfig) -> Result<Self, BenchError> {
        let server = OllamaServer::new(&config.endpoint, Duration::from_secs(config.pull_timeout_secs))?;
        Ok(Self::new(
            Arc::new(SystemProcess::new(&config.binary)),
            Arc::new(server),
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_secs(config.startup_timeout_secs),
        ))
    }

    pub async fn status(&self) -> Result<RuntimeStatus, BenchError> {
        let process = self.process.clone();
        let running = tokio::task::spawn_blocking(move || process.is_running())
            .await
            .map_err(|e| BenchError::LocalRuntime(format!("Process probe failed: {}", e)))?;
        Ok(if running {
            RuntimeStatus::Running
        } else {
            RuntimeStatus::Stopped
        })
    }

    /// Run every lifecycle step for `model`: start the server if needed, wait
    /// for it to answer, pull the model if it is not installed.
    pub async fn ensure_ready(&self, model: &str) -> Result<(), BenchError> {
        let _guard = self.lock.lock().await;
        self.ensure_running().await?;
        self.ensure_model(model).await
    }

    async fn ensure_running(&self) -> Result<(), BenchError> {
        match self.status().await? {
            RuntimeStatus::Running => {
                debug!("Local model server already running");
            }
            RuntimeStatus::Stopped => {
                // Reachable but not in our process table: a server in a container
                // or under another user. Don't start a second one.
                if self.server.ping().await {
                    debug!("Local model server reachable outside the process table");
                    return Ok(());
                }
                info!("Local model server not running, starting it");
                self.process.spawn_detached()?;
            }
        }
        self.await_ready().await
    }

    async fn await_ready(&self) -> Result<(), BenchError> {
        let start = Instant::now();
        loop {
            if self.server.ping().await {
                debug!(waited_ms = start.elapsed().as_millis() as u64, "Local model server ready");
                return Ok(());
            }
            if start.elapsed() >= self.startup_timeout {
                warn!(timeout_secs = self.startup_timeout.as_secs_f64(), "Local model server did not come up");
                return Err(BenchError::LocalRuntime("server did not start in time".into()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn ensure_model(&self, model: &str) -> Result<(), BenchError> {
        let installed = self.server.list_models().await?;
        if installed.iter().any(|name| model_matches(name, model)) {
            debug!(model, "Model already installed");
            return Ok(());
        }

        info!(model, "Model not installed locally, pulling");
        let start = Instant::now();
        self.server
            .pull(model)
            .await
            .map_err(|e| BenchError::LocalRuntime(format!("Failed to pull model {}: {}", model, e)))?;
        info!(model, elapsed_secs = start.elapsed().as_secs_f64(), "Model pulled");
        Ok(())
    }
}

/// An untagged request matches the `:latest` tag the server reports.
fn model_matches(installed: &str, requested: &str) -> bool {
    installed == requested
        || (!requested.contains(':') && installed.strip_suffix(":latest") == Some(requested))
}
