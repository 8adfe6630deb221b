//! Component wiring and background tasks

use crate::config::ServerConfig;
use anyhow::Context;
use eduscan_core::{GradingProvider, MockGradingProvider};
use eduscan_observability::Metrics;
use eduscan_session::{AuthState, SessionGate};
use eduscan_storage::{FileStateStore, StateStore};
use eduscan_ui::{AppState, UiServer};
use eduscan_upload::{UploadEvent, UploadManager};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A fully wired server, ready to serve
pub struct App {
    pub state: AppState,
    pub store: Arc<dyn StateStore>,
    config: ServerConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Open the state store at `config.state_file` and wire everything to it
    pub async fn build(config: ServerConfig) -> anyhow::Result<Self> {
        let path = config.state_path()?;
        let store = FileStateStore::open_or_reset(&path)
            .await
            .with_context(|| format!("Failed to open state file {}", path.display()))?;
        info!("Session state file: {}", path.display());

        Self::with_store(config, Arc::new(store)).await
    }

    /// Wire the components to an already opened store.
    ///
    /// Session restoration starts in the background; until it finishes the
    /// gate reports `Unknown` and protected views show the loading page.
    pub async fn with_store(config: ServerConfig, store: Arc<dyn StateStore>) -> anyhow::Result<Self> {
        let provider: Arc<dyn GradingProvider> = Arc::new(MockGradingProvider::new());
        let gate = Arc::new(SessionGate::new(config.auth.clone(), store.clone()));
        let uploads = UploadManager::new(config.uploads.clone(), provider.clone())
            .context("Invalid upload configuration")?;
        let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);

        let state = AppState::new(
            gate.clone(),
            uploads.clone(),
            provider,
            metrics.clone(),
            config.ui.clone(),
        )
        .await
        .context("Failed to seed grading data")?;

        let restore = tokio::spawn(async move {
            match gate.restore_session().await {
                AuthState::Authenticated(session) => {
                    info!("Signed in as {} ({})", session.display_name, session.role)
                }
                _ => info!("No saved session, login required"),
            }
        });
        let listener = tokio::spawn(record_upload_metrics(uploads.subscribe(), metrics));

        Ok(Self {
            state,
            store,
            config,
            tasks: vec![restore, listener],
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve the UI until `shutdown` resolves, then stop background work
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr()?;
        let server = UiServer::new(addr, self.state.clone());
        let result = server.serve(shutdown).await;
        self.shutdown();
        result
    }

    /// Cancel pipelines and background tasks
    pub fn shutdown(&self) {
        self.state.uploads.shutdown();
        for task in &self.tasks {
            task.abort();
        }
        debug!("Background tasks stopped");
    }
}

/// Feed pipeline outcomes into the finished-uploads counter and the
/// processing duration histogram.
async fn record_upload_metrics(mut events: broadcast::Receiver<UploadEvent>, metrics: Arc<Metrics>) {
    let mut started: HashMap<String, Instant> = HashMap::new();

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Upload metrics listener lagged, skipped {} events", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            UploadEvent::Added { item } => {
                started.insert(item.id, Instant::now());
            }
            UploadEvent::Completed { id, .. } => {
                let elapsed = started.remove(&id).map(|t| t.elapsed().as_secs_f64());
                metrics.record_upload_finished("completed", elapsed);
            }
            UploadEvent::Failed { id, .. } => {
                let elapsed = started.remove(&id).map(|t| t.elapsed().as_secs_f64());
                metrics.record_upload_finished("error", elapsed);
            }
            UploadEvent::Removed { id } => {
                started.remove(&id);
            }
            UploadEvent::Progress { .. } | UploadEvent::Processing { .. } => {}
        }
    }
}
