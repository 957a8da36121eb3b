//! # Runtime Orchestration
//!
//! Owns the service container and the lifetime of every background task.

use crate::container::{ContainerError, RuntimeConfig, ServiceContainer};
use crate::handlers::{
    ActivityLogHandler, ApiQueryHandler, CalendarRefreshHandler, CalendarSink, LoggingCalendarSink,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long shutdown waits for tasks to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The running document service.
pub struct ValidityRuntime {
    /// Services, handler and bus.
    container: Arc<ServiceContainer>,
    /// Destination for regenerated calendars.
    calendar_sink: Arc<dyn CalendarSink>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Spawned background tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ValidityRuntime {
    /// Build the runtime from configuration, calendars go to the log.
    pub fn new(config: RuntimeConfig) -> Result<Self, ContainerError> {
        let container = Arc::new(ServiceContainer::new(config)?);
        Ok(Self::with_container(container, Arc::new(LoggingCalendarSink)))
    }

    /// Build the runtime around an existing container and calendar sink.
    pub fn with_container(
        container: Arc<ServiceContainer>,
        calendar_sink: Arc<dyn CalendarSink>,
    ) -> Self {
        info!("[vr-runtime] Creating validity runtime");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            container,
            calendar_sink,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the background tasks.
    ///
    /// Subscriptions are taken before this returns, so events published
    /// afterwards are seen by every task.
    pub fn start(&self) {
        info!("[vr-runtime] Starting background tasks");
        let container = &self.container;

        let api_handler = ApiQueryHandler::new(Arc::clone(container));
        self.spawn("api-query", api_handler.run());

        let calendar_handler = CalendarRefreshHandler::new(
            Arc::clone(&container.documents),
            Arc::clone(&container.notifications),
            Arc::clone(&self.calendar_sink),
            container.event_bus.subscribe(CalendarRefreshHandler::filter()),
        );
        self.spawn("calendar", calendar_handler.run());

        let activity_handler =
            ActivityLogHandler::new(container.event_bus.subscribe(ActivityLogHandler::filter()));
        self.spawn("activity", activity_handler.run());

        info!(
            subscribers = container.event_bus.subscriber_count(),
            "[vr-runtime] Background tasks started"
        );
    }

    fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task => {}
                _ = shutdown.changed() => {
                    info!("[vr-runtime] {} received shutdown signal", name);
                }
            }
        });
        self.tasks.lock().push(handle);
    }

    /// Signal every task to stop and wait for them (bounded).
    pub async fn shutdown(&self) {
        info!("[vr-runtime] Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[vr-runtime] Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for handle in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("[vr-runtime] Task ended abnormally: {}", e),
                Err(_) => warn!("[vr-runtime] Task did not stop within the grace period"),
            }
        }

        info!("[vr-runtime] Shutdown complete");
    }

    /// Number of tasks not yet reaped by `shutdown`.
    pub fn running_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Get a reference to the service container.
    pub fn container(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.container)
    }
}
