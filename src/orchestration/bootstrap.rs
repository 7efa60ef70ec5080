//! # Service Bootstrap
//!
//! Wires configuration, the run pipeline, the HTTP trigger surface and the
//! daily scheduler into one running service, and hands back a handle that
//! owns their lifecycle.
//!
//! ## Startup Order
//!
//! 1. Load configuration (or accept a pre-built [`ConfigManager`])
//! 2. Build the coordinator: reqwest probe, PDF sink, mail sink
//! 3. Initialize the scheduler (an invalid schedule aborts here)
//! 4. Bind the HTTP listener and start serving
//! 5. Start the scheduler, which fires the startup run
//!
//! The scheduler starts last so the startup run only begins once the process
//! is fully initialized.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::coordinator::RunCoordinator;
use super::scheduler::{Clock, Scheduler, SystemClock};
use crate::config::{ConfigManager, SitewatchConfig};
use crate::error::{Result, SitewatchError};
use crate::logging;
use crate::notify;
use crate::probe::{ReqwestProbe, SiteProbeRunner, StatusClassifier};
use crate::report::PdfReportSink;
use crate::web::{create_app, AppState};

/// Service handle for lifecycle management
pub struct SitewatchSystemHandle {
    pub config_manager: Arc<ConfigManager>,
    pub coordinator: Arc<RunCoordinator>,
    pub scheduler: Arc<Scheduler>,
    /// Address the HTTP listener actually bound (resolves port 0)
    pub local_addr: SocketAddr,
    /// Shutdown signal sender (Some when running, None when stopped)
    shutdown_sender: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<std::io::Result<()>>>,
}

impl std::fmt::Debug for SitewatchSystemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitewatchSystemHandle")
            .field("environment", &self.config_manager.environment())
            .field("local_addr", &self.local_addr)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SitewatchSystemHandle {
    pub fn is_running(&self) -> bool {
        self.shutdown_sender.is_some()
    }

    /// Stop the scheduler, then drain the HTTP server. Safe to call twice.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(sender) = self.shutdown_sender.take() else {
            warn!("Sitewatch service already stopped");
            return Ok(());
        };

        info!("🛑 BOOTSTRAP: Shutdown requested");
        self.scheduler.stop().await;

        if sender.send(()).is_err() {
            warn!("HTTP server exited before shutdown signal");
        }

        if let Some(task) = self.server_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(SitewatchError::Web {
                        message: e.to_string(),
                    })
                }
                Err(e) => {
                    return Err(SitewatchError::Web {
                        message: format!("server task failed: {e}"),
                    })
                }
            }
        }

        info!("✅ BOOTSTRAP: Shutdown complete");
        Ok(())
    }

    /// Get system status information
    pub fn status(&self) -> SystemStatus {
        let config = self.config_manager.config();
        SystemStatus {
            running: self.is_running(),
            environment: self.config_manager.environment().to_string(),
            local_addr: self.local_addr,
            sites: config.sites.len(),
            mail_enabled: config.mail.enabled,
            scheduler_running: self.scheduler.is_running(),
            runs_fired: self.scheduler.runs_fired(),
        }
    }
}

/// System status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub running: bool,
    pub environment: String,
    pub local_addr: SocketAddr,
    pub sites: usize,
    pub mail_enabled: bool,
    pub scheduler_running: bool,
    pub runs_fired: usize,
}

/// Bootstrap options that sit outside the configuration files
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    /// Custom configuration directory (None = auto-detect)
    pub config_directory: Option<PathBuf>,
    /// Environment override (None = auto-detect)
    pub environment_override: Option<String>,
    /// Replaces `web.bind_address` when set
    pub bind_address_override: Option<String>,
}

/// Builds and starts the service
pub struct SitewatchBootstrap;

impl SitewatchBootstrap {
    /// Load configuration, then bootstrap with production components
    pub async fn bootstrap(options: BootstrapConfig) -> Result<SitewatchSystemHandle> {
        info!("🚀 BOOTSTRAP: Starting sitewatch service");

        let config_manager = match &options.environment_override {
            Some(env) => {
                ConfigManager::load_from_directory_with_env(options.config_directory.clone(), env)?
            }
            None => ConfigManager::load_from_directory(options.config_directory.clone())?,
        };

        let config_manager = match options.bind_address_override {
            Some(bind_address) => {
                let mut config = config_manager.config().clone();
                config.web.bind_address = bind_address;
                ConfigManager::from_config(config, config_manager.environment())?
            }
            None => config_manager,
        };

        info!(
            "✅ BOOTSTRAP: Configuration loaded for environment: {}",
            config_manager.environment()
        );

        let coordinator = Arc::new(Self::build_coordinator(config_manager.config())?);
        Self::bootstrap_with_components(config_manager, coordinator, Arc::new(SystemClock)).await
    }

    /// Production pipeline for a configuration
    pub fn build_coordinator(config: &SitewatchConfig) -> Result<RunCoordinator> {
        let probe = ReqwestProbe::new(&config.probe)?;
        let runner = SiteProbeRunner::new(StatusClassifier::new(Arc::new(probe)));
        let report_sink = Arc::new(PdfReportSink::new(config.report.title.clone()));
        let notifier = notify::from_config(&config.mail)?;

        Ok(RunCoordinator::new(
            runner,
            config.sites.clone(),
            report_sink,
            notifier,
            config.mail.recipients.clone(),
        ))
    }

    /// Bootstrap around an already built coordinator and clock
    pub async fn bootstrap_with_components(
        config_manager: Arc<ConfigManager>,
        coordinator: Arc<RunCoordinator>,
        clock: Arc<dyn Clock>,
    ) -> Result<SitewatchSystemHandle> {
        let config = config_manager.config();

        let scheduler = Arc::new(Scheduler::initialize(
            config,
            coordinator.clone(),
            clock.clone(),
        )?);

        let listener = TcpListener::bind(config.web.bind_address.as_str())
            .await
            .map_err(|e| SitewatchError::Web {
                message: format!("failed to bind {}: {e}", config.web.bind_address),
            })?;
        let local_addr = listener.local_addr()?;

        let app = create_app(AppState::new(
            coordinator.clone(),
            scheduler.report_paths().clone(),
            clock,
        ));

        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();
        let server_task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_receiver.await;
                })
                .await;
            if let Err(e) = &result {
                logging::log_error("web", "serve", &e.to_string(), None);
            }
            result
        });

        info!(address = %local_addr, "🌐 WEB: Listening");

        scheduler.start();

        info!("🎉 BOOTSTRAP: Sitewatch service started");
        Ok(SitewatchSystemHandle {
            config_manager,
            coordinator,
            scheduler,
            local_addr,
            shutdown_sender: Some(shutdown_sender),
            server_task: Some(server_task),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_config_default() {
        let config = BootstrapConfig::default();
        assert!(config.config_directory.is_none());
        assert!(config.environment_override.is_none());
        assert!(config.bind_address_override.is_none());
    }

    #[test]
    fn test_build_coordinator_uses_roster() {
        let mut config = SitewatchConfig::default();
        config.mail.enabled = false;
        let coordinator = SitewatchBootstrap::build_coordinator(&config).unwrap();
        assert_eq!(coordinator.roster().len(), 5);
        assert_eq!(coordinator.roster()[0].name, "SCPL");
    }
}
