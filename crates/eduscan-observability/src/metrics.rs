//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for EduScan:
//! - Login attempts by outcome
//! - Upload intake and pipeline outcomes
//! - Upload processing latency (accepted to terminal state)
//! - Grading overrides and feedback delivery

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for EduScan
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    // Session metrics
    /// Login attempts, labelled `success` or `failure`
    pub login_attempts_total: CounterVec,
    /// Logouts
    pub logouts_total: Counter,

    // Upload metrics
    /// Files accepted into the working set
    pub uploads_accepted_total: Counter,
    /// Files refused at intake, by reason
    pub uploads_rejected_total: CounterVec,
    /// Items reaching a terminal state, by status
    pub uploads_finished_total: CounterVec,
    /// Items removed by the user
    pub uploads_removed_total: Counter,
    /// Time from acceptance to terminal state
    pub upload_processing_duration_seconds: Histogram,

    // Grading metrics
    /// Teacher score overrides, by action (`save` or `reset`)
    pub score_overrides_total: CounterVec,
    /// Feedback sent to students
    pub feedback_sent_total: Counter,
    /// AI feedback suggestions appended
    pub feedback_generated_total: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let login_attempts_total = CounterVec::new(
            Opts::new("eduscan_login_attempts_total", "Total number of login attempts"),
            &["outcome"],
        )?;

        let logouts_total = Counter::with_opts(Opts::new(
            "eduscan_logouts_total",
            "Total number of logouts",
        ))?;

        let uploads_accepted_total = Counter::with_opts(Opts::new(
            "eduscan_uploads_accepted_total",
            "Total number of files accepted for processing",
        ))?;

        let uploads_rejected_total = CounterVec::new(
            Opts::new(
                "eduscan_uploads_rejected_total",
                "Total number of files rejected at intake",
            ),
            &["reason"],
        )?;

        let uploads_finished_total = CounterVec::new(
            Opts::new(
                "eduscan_uploads_finished_total",
                "Total number of uploads that reached a terminal state",
            ),
            &["status"],
        )?;

        let uploads_removed_total = Counter::with_opts(Opts::new(
            "eduscan_uploads_removed_total",
            "Total number of uploads removed from the working set",
        ))?;

        let upload_processing_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "eduscan_upload_processing_duration_seconds",
                "Time from acceptance to completion in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 7.5, 10.0, 20.0]),
        )?;

        let score_overrides_total = CounterVec::new(
            Opts::new(
                "eduscan_score_overrides_total",
                "Total number of teacher score overrides",
            ),
            &["action"],
        )?;

        let feedback_sent_total = Counter::with_opts(Opts::new(
            "eduscan_feedback_sent_total",
            "Total number of feedback messages sent to students",
        ))?;

        let feedback_generated_total = Counter::with_opts(Opts::new(
            "eduscan_feedback_generated_total",
            "Total number of AI feedback suggestions appended",
        ))?;

        registry.register(Box::new(login_attempts_total.clone()))?;
        registry.register(Box::new(logouts_total.clone()))?;
        registry.register(Box::new(uploads_accepted_total.clone()))?;
        registry.register(Box::new(uploads_rejected_total.clone()))?;
        registry.register(Box::new(uploads_finished_total.clone()))?;
        registry.register(Box::new(uploads_removed_total.clone()))?;
        registry.register(Box::new(upload_processing_duration_seconds.clone()))?;
        registry.register(Box::new(score_overrides_total.clone()))?;
        registry.register(Box::new(feedback_sent_total.clone()))?;
        registry.register(Box::new(feedback_generated_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            login_attempts_total,
            logouts_total,
            uploads_accepted_total,
            uploads_rejected_total,
            uploads_finished_total,
            uploads_removed_total,
            upload_processing_duration_seconds,
            score_overrides_total,
            feedback_sent_total,
            feedback_generated_total,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_login(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.login_attempts_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_logout(&self) {
        self.logouts_total.inc();
    }

    pub fn record_upload_accepted(&self) {
        self.uploads_accepted_total.inc();
    }

    /// `reason` is a short label such as `unsupported_type` or `too_large`
    pub fn record_upload_rejected(&self, reason: &str) {
        self.uploads_rejected_total.with_label_values(&[reason]).inc();
    }

    /// Record a terminal state and, when known, how long the item took
    pub fn record_upload_finished(&self, status: &str, duration_secs: Option<f64>) {
        self.uploads_finished_total.with_label_values(&[status]).inc();
        if let Some(secs) = duration_secs {
            self.upload_processing_duration_seconds.observe(secs);
        }
    }

    pub fn record_upload_removed(&self) {
        self.uploads_removed_total.inc();
    }

    pub fn record_score_override(&self, action: &str) {
        self.score_overrides_total.with_label_values(&[action]).inc();
    }

    pub fn record_feedback_sent(&self) {
        self.feedback_sent_total.inc();
    }

    pub fn record_feedback_generated(&self) {
        self.feedback_generated_total.inc();
    }
}
