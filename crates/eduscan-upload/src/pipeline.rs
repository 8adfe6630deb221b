//! Per-item simulated transfer and recognition

use crate::config::PipelineConfig;
use crate::events::UploadEvent;
use crate::item::UploadItem;
use crate::manager::Shared;
use eduscan_core::GradingProvider;
use rand::Rng;
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, warn};

/// Source of per-tick progress increments
pub trait IncrementSource: Send + Sync {
    /// Next increment in `[0, max)`
    fn next_increment(&self, max: f64) -> f64;
}

/// Uniformly random increments
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIncrements;

impl IncrementSource for RandomIncrements {
    fn next_increment(&self, max: f64) -> f64 {
        if !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        rand::rng().random_range(0.0..max)
    }
}

/// The same increment every tick, for deterministic pipelines
#[derive(Debug, Clone, Copy)]
pub struct FixedIncrements(pub f64);

impl IncrementSource for FixedIncrements {
    fn next_increment(&self, _max: f64) -> f64 {
        self.0
    }
}

pub(crate) struct PipelineTask {
    pub(crate) shared: Arc<Shared>,
    pub(crate) id: String,
    pub(crate) file_name: String,
    pub(crate) config: PipelineConfig,
    pub(crate) increments: Arc<dyn IncrementSource>,
    pub(crate) provider: Arc<dyn GradingProvider>,
}

impl PipelineTask {
    /// Drive one item to completion.
    ///
    /// Returns early as soon as the item is no longer in the working set.
    pub(crate) async fn run(self) {
        if !self.transfer().await {
            debug!("Upload {} removed during transfer", self.id);
            return;
        }

        sleep(self.config.processing_delay()).await;

        match self.provider.extract_text(&self.file_name).await {
            Ok(text) => {
                let updated = self
                    .shared
                    .update(&self.id, |item| item.complete(text.clone()))
                    .await;
                if updated.is_some() {
                    debug!("Upload {} ({}) completed", self.id, self.file_name);
                    self.shared.publish(UploadEvent::Completed {
                        id: self.id.clone(),
                        result_text: text,
                    });
                }
            }
            Err(e) => {
                warn!(
                    "Text extraction failed for {} via {}: {}",
                    self.file_name,
                    self.provider.name(),
                    e
                );
                if self.shared.update(&self.id, UploadItem::fail).await.is_some() {
                    self.shared.publish(UploadEvent::Failed {
                        id: self.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Tick progress up to 100 and switch to `processing`.
    /// Returns false if the item disappeared.
    async fn transfer(&self) -> bool {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let mut progress = 0.0_f64;
        loop {
            ticker.tick().await;
            progress += self
                .increments
                .next_increment(self.config.max_increment)
                .max(0.0);

            if progress >= 100.0 {
                if self
                    .shared
                    .update(&self.id, UploadItem::start_processing)
                    .await
                    .is_none()
                {
                    return false;
                }
                self.shared.publish(UploadEvent::Processing {
                    id: self.id.clone(),
                });
                return true;
            }

            if self
                .shared
                .update(&self.id, |item| item.advance(progress))
                .await
                .is_none()
            {
                return false;
            }
            self.shared.publish(UploadEvent::Progress {
                id: self.id.clone(),
                progress,
            });
        }
    }
}
