//! Upload simulator configuration

use crate::intake::IntakePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub intake: IntakePolicy,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Timing of the simulated transfer and recognition phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Interval between progress ticks (default: 200ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Upper bound (exclusive) of the random progress increment per tick
    #[serde(default = "default_max_increment")]
    pub max_increment: f64,

    /// Time spent in `processing` before completion (default: 2000ms)
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// Capacity of the event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_max_increment() -> f64 {
    20.0
}

fn default_processing_delay_ms() -> u64 {
    2000
}

fn default_event_capacity() -> usize {
    256
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_increment: default_max_increment(),
            processing_delay_ms: default_processing_delay_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl PipelineConfig {
    pub fn tick_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.max_increment.is_finite() || self.max_increment <= 0.0 {
            return Err(format!(
                "max_increment must be positive and finite, got {}",
                self.max_increment
            ));
        }
        if self.event_capacity == 0 {
            return Err("event_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
