use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Outbound notification metrics
#[derive(Debug, Default)]
pub struct NotificationMetrics {
    pub attempts: AtomicU64,
    pub delivered: AtomicU64,
    pub failed: AtomicU64,
    pub skipped: AtomicU64,
}

impl NotificationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> NotificationStats {
        NotificationStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Notification metrics: attempts={}, delivered={}, failed={}, skipped={}",
            stats.attempts, stats.delivered, stats.failed, stats.skipped
        );
    }
}

#[derive(Debug, Clone)]
pub struct NotificationStats {
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Global metrics instance
static NOTIFICATION_METRICS: std::sync::LazyLock<NotificationMetrics> =
    std::sync::LazyLock::new(NotificationMetrics::new);

pub fn notification_metrics() -> &'static NotificationMetrics {
    &NOTIFICATION_METRICS
}

/// Create correlated spans for workflow transitions
pub fn create_workflow_span(action: &str, form_id: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow_transition",
        workflow.action = action,
        form.id = form_id,
        correlation.id = correlation_id,
    )
}
