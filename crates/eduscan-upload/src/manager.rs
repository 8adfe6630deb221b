//! Working set of uploads and their background pipelines

use crate::config::UploadConfig;
use crate::error::{UploadError, UploadResult};
use crate::events::UploadEvent;
use crate::intake::{FileRef, Rejection};
use crate::item::{UploadItem, UploadStatus};
use crate::pipeline::{IncrementSource, PipelineTask, RandomIncrements};
use eduscan_core::GradingProvider;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Result of a batch of dropped or picked files
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptOutcome {
    pub accepted: Vec<UploadItem>,
    pub rejected: Vec<Rejection>,
}

/// State shared between the manager and pipeline tasks
pub(crate) struct Shared {
    items: RwLock<Vec<UploadItem>>,
    events: broadcast::Sender<UploadEvent>,
}

impl Shared {
    /// Apply `f` to the item with `id`. A missing id is a no-op.
    pub(crate) async fn update<F>(&self, id: &str, f: F) -> Option<UploadItem>
    where
        F: FnOnce(&mut UploadItem),
    {
        let mut items = self.items.write().await;
        let item = items.iter_mut().find(|item| item.id == id)?;
        f(item);
        Some(item.clone())
    }

    pub(crate) fn publish(&self, event: UploadEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Tracks accepted files and drives each through the simulated pipeline.
///
/// Cloning is cheap; clones share the same working set.
#[derive(Clone)]
pub struct UploadManager {
    shared: Arc<Shared>,
    tasks: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    config: Arc<UploadConfig>,
    provider: Arc<dyn GradingProvider>,
    increments: Arc<dyn IncrementSource>,
}

impl UploadManager {
    pub fn new(config: UploadConfig, provider: Arc<dyn GradingProvider>) -> UploadResult<Self> {
        Self::with_increments(config, provider, Arc::new(RandomIncrements))
    }

    pub fn with_increments(
        config: UploadConfig,
        provider: Arc<dyn GradingProvider>,
        increments: Arc<dyn IncrementSource>,
    ) -> UploadResult<Self> {
        config.pipeline.validate().map_err(UploadError::Invalid)?;
        let (events, _) = broadcast::channel(config.pipeline.event_capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                items: RwLock::new(Vec::new()),
                events,
            }),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
            provider,
            increments,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.shared.events.subscribe()
    }

    /// Filter a batch through the intake policy and start a pipeline for
    /// every accepted file. Rejected files never enter the working set.
    pub async fn accept(&self, files: Vec<FileRef>) -> AcceptOutcome {
        let mut outcome = AcceptOutcome::default();

        for file in files {
            match self.config.intake.check(&file) {
                Ok(()) => outcome.accepted.push(UploadItem::new(file)),
                Err(reason) => {
                    debug!("Rejected {}: {}", file.name, reason);
                    outcome.rejected.push(Rejection {
                        file_name: file.name,
                        reason,
                    });
                }
            }
        }

        if outcome.accepted.is_empty() {
            return outcome;
        }

        {
            let mut items = self.shared.items.write().await;
            items.extend(outcome.accepted.iter().cloned());
        }

        let mut tasks = self.lock_tasks();
        for item in &outcome.accepted {
            info!(
                "Accepted {} ({} bytes) as upload {}",
                item.file.name, item.file.size_bytes, item.id
            );
            self.shared.publish(UploadEvent::Added { item: item.clone() });

            let task = PipelineTask {
                shared: self.shared.clone(),
                id: item.id.clone(),
                file_name: item.file.name.clone(),
                config: self.config.pipeline.clone(),
                increments: self.increments.clone(),
                provider: self.provider.clone(),
            };
            tasks.insert(item.id.clone(), tokio::spawn(task.run()));
        }

        outcome
    }

    /// Drop an item and cancel its pipeline. Returns false for unknown ids.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut items = self.shared.items.write().await;
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        };

        if let Some(handle) = self.lock_tasks().remove(id) {
            handle.abort();
        }

        if removed {
            info!("Removed upload {}", id);
            self.shared.publish(UploadEvent::Removed { id: id.to_string() });
        }
        removed
    }

    /// Items in insertion order
    pub async fn list(&self) -> Vec<UploadItem> {
        self.shared.items.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<UploadItem> {
        self.shared
            .items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.shared.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.items.read().await.is_empty()
    }

    /// Whether at least one item is ready for grading
    pub async fn has_completed(&self) -> bool {
        self.shared
            .items
            .read()
            .await
            .iter()
            .any(|item| item.status == UploadStatus::Completed)
    }

    /// Cancel every running pipeline
    pub fn shutdown(&self) {
        let mut tasks = self.lock_tasks();
        let count = tasks.len();
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
        debug!("Cancelled {} upload pipelines", count);
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::intake::RejectionReason;
    use crate::pipeline::FixedIncrements;
    use async_trait::async_trait;
    use eduscan_core::MockGradingProvider;
    use eduscan_core::analytics::AnalyticsReport;
    use eduscan_core::feedback::StudentFeedback;
    use eduscan_core::grading::GradedAnswer;
    use std::time::Duration;
    use tokio::time::timeout;

    fn fast_config() -> UploadConfig {
        UploadConfig {
            intake: Default::default(),
            pipeline: PipelineConfig {
                tick_interval_ms: 5,
                max_increment: 20.0,
                processing_delay_ms: 20,
                event_capacity: 256,
            },
        }
    }

    fn manager() -> UploadManager {
        UploadManager::with_increments(
            fast_config(),
            Arc::new(MockGradingProvider::new()),
            Arc::new(FixedIncrements(25.0)),
        )
        .unwrap()
    }

    fn pdf(name: &str) -> FileRef {
        FileRef::new(name, 4096, Some("application/pdf".to_string()))
    }

    async fn wait_for<F>(manager: &UploadManager, id: &str, done: F) -> UploadItem
    where
        F: Fn(&UploadItem) -> bool,
    {
        timeout(Duration::from_secs(5), async {
            loop {
                if let Some(item) = manager.get(id).await
                    && done(&item)
                {
                    return item;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("item did not reach expected state")
    }

    #[tokio::test]
    async fn test_accept_and_complete() {
        let manager = manager();
        let outcome = manager.accept(vec![pdf("quiz.pdf")]).await;
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.rejected.is_empty());

        let item = &outcome.accepted[0];
        assert_eq!(item.status, UploadStatus::Uploading);
        assert_eq!(item.progress, 0.0);

        let done = wait_for(&manager, &item.id, |i| i.status.is_terminal()).await;
        assert_eq!(done.status, UploadStatus::Completed);
        assert_eq!(done.progress, 100.0);
        let text = done.result_text.unwrap();
        assert!(text.starts_with("Sample OCR text extracted from quiz.pdf:"));
        assert!(manager.has_completed().await);
    }

    #[tokio::test]
    async fn test_event_sequence_is_monotonic() {
        let manager = manager();
        let mut events = manager.subscribe();
        let outcome = manager.accept(vec![pdf("a.pdf")]).await;
        let id = outcome.accepted[0].id.clone();

        let mut seen = Vec::new();
        timeout(Duration::from_secs(5), async {
            loop {
                let event = events.recv().await.unwrap();
                let last = matches!(event, UploadEvent::Completed { .. });
                seen.push(event);
                if last {
                    break;
                }
            }
        })
        .await
        .unwrap();

        assert!(matches!(&seen[0], UploadEvent::Added { item } if item.id == id));
        let progress: Vec<f64> = seen
            .iter()
            .filter_map(|e| match e {
                UploadEvent::Progress { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![25.0, 50.0, 75.0]);
        assert!(matches!(seen[seen.len() - 2], UploadEvent::Processing { .. }));
        assert!(matches!(seen[seen.len() - 1], UploadEvent::Completed { .. }));
    }

    #[tokio::test]
    async fn test_result_text_only_when_completed() {
        let manager = manager();
        let outcome = manager.accept(vec![pdf("a.pdf")]).await;
        let id = outcome.accepted[0].id.clone();

        let processing = wait_for(&manager, &id, |i| i.status != UploadStatus::Uploading).await;
        if processing.status == UploadStatus::Processing {
            assert_eq!(processing.progress, 100.0);
            assert!(processing.result_text.is_none());
        }
        let done = wait_for(&manager, &id, |i| i.status == UploadStatus::Completed).await;
        assert!(done.result_text.is_some());
    }

    #[tokio::test]
    async fn test_rejected_files_never_enter() {
        let manager = manager();
        let big = FileRef::new("huge.pdf", 11 * 1024 * 1024, None);
        let doc = FileRef::new("essay.docx", 100, None);
        let outcome = manager.accept(vec![big, pdf("ok.pdf"), doc]).await;

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);
        assert!(matches!(
            outcome.rejected[0].reason,
            RejectionReason::TooLarge { .. }
        ));
        assert_eq!(outcome.rejected[1].reason, RejectionReason::UnsupportedType);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_insertion_order_preserved() {
        let manager = manager();
        manager.accept(vec![pdf("1.pdf"), pdf("2.pdf")]).await;
        manager.accept(vec![pdf("3.pdf")]).await;

        let names: Vec<String> = manager
            .list()
            .await
            .into_iter()
            .map(|i| i.file.name)
            .collect();
        assert_eq!(names, vec!["1.pdf", "2.pdf", "3.pdf"]);
    }

    #[tokio::test]
    async fn test_remove_cancels_pipeline() {
        let manager = manager();
        let outcome = manager.accept(vec![pdf("a.pdf"), pdf("b.pdf")]).await;
        let removed_id = outcome.accepted[0].id.clone();
        let kept_id = outcome.accepted[1].id.clone();

        assert!(manager.remove(&removed_id).await);
        assert!(!manager.remove(&removed_id).await);

        wait_for(&manager, &kept_id, |i| i.status == UploadStatus::Completed).await;
        // Give any stray task time to write
        tokio::time::sleep(Duration::from_millis(50)).await;

        let items = manager.list().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, kept_id);
    }

    #[tokio::test]
    async fn test_update_of_missing_item_is_noop() {
        let manager = manager();
        manager.accept(vec![pdf("a.pdf")]).await;
        let before = manager.list().await;

        let result = manager
            .shared
            .update("does-not-exist", |item| item.complete("x".to_string()))
            .await;
        assert!(result.is_none());
        assert_eq!(manager.list().await.len(), before.len());
    }

    #[tokio::test]
    async fn test_remove_unknown_id() {
        let manager = manager();
        assert!(!manager.remove("nope").await);
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_pipeline_config() {
        let mut config = fast_config();
        config.pipeline.max_increment = 0.0;
        let result = UploadManager::new(config, Arc::new(MockGradingProvider::new()));
        assert!(matches!(result, Err(UploadError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_infinite_increment_rejected() {
        let mut config = fast_config();
        config.pipeline.max_increment = f64::INFINITY;
        let result = UploadManager::new(config, Arc::new(MockGradingProvider::new()));
        assert!(matches!(result, Err(UploadError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_random_increments_reach_100_before_processing() {
        let mut config = fast_config();
        config.pipeline.tick_interval_ms = 1;
        config.pipeline.processing_delay_ms = 5;
        let manager = UploadManager::new(config, Arc::new(MockGradingProvider::new())).unwrap();
        let mut events = manager.subscribe();
        let outcome = manager.accept(vec![pdf("a.pdf")]).await;
        let id = outcome.accepted[0].id.clone();

        let mut seen = Vec::new();
        timeout(Duration::from_secs(10), async {
            loop {
                let event = events.recv().await.unwrap();
                let last = matches!(event, UploadEvent::Completed { .. });
                seen.push(event);
                if last {
                    break;
                }
            }
        })
        .await
        .unwrap();

        let mut previous = 0.0;
        let mut processing_at = None;
        for (index, event) in seen.iter().enumerate() {
            match event {
                UploadEvent::Progress { progress, .. } => {
                    assert!(processing_at.is_none());
                    assert!(*progress >= previous);
                    assert!(*progress < 100.0);
                    previous = *progress;
                }
                UploadEvent::Processing { .. } => processing_at = Some(index),
                _ => {}
            }
        }
        assert_eq!(processing_at, Some(seen.len() - 2));

        let done = manager.get(&id).await.unwrap();
        assert_eq!(done.status, UploadStatus::Completed);
        assert_eq!(done.progress, 100.0);
    }

    struct FailingProvider;

    #[async_trait]
    impl GradingProvider for FailingProvider {
        async fn graded_answers(&self) -> eduscan_core::Result<Vec<GradedAnswer>> {
            Ok(Vec::new())
        }
        async fn student_feedback(&self) -> eduscan_core::Result<Vec<StudentFeedback>> {
            Ok(Vec::new())
        }
        async fn analytics(&self) -> eduscan_core::Result<AnalyticsReport> {
            MockGradingProvider::new().analytics().await
        }
        async fn feedback_suggestion(&self) -> eduscan_core::Result<String> {
            Ok(String::new())
        }
        async fn extract_text(&self, _file_name: &str) -> eduscan_core::Result<String> {
            Err(eduscan_core::Error::Provider("scanner offline".to_string()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_provider_failure_marks_error() {
        let manager = UploadManager::with_increments(
            fast_config(),
            Arc::new(FailingProvider),
            Arc::new(FixedIncrements(50.0)),
        )
        .unwrap();
        let outcome = manager.accept(vec![pdf("a.pdf")]).await;
        let id = outcome.accepted[0].id.clone();

        let item = wait_for(&manager, &id, |i| i.status.is_terminal()).await;
        assert_eq!(item.status, UploadStatus::Error);
        assert!(item.result_text.is_none());
        assert!(!manager.has_completed().await);
    }

    #[tokio::test]
    async fn test_shutdown_stops_progress() {
        let manager = manager();
        let outcome = manager.accept(vec![pdf("a.pdf")]).await;
        manager.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let item = manager.get(&outcome.accepted[0].id).await.unwrap();
        assert_eq!(item.status, UploadStatus::Uploading);
    }
}
