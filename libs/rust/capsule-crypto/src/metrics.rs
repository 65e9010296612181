//! Crypto Metrics
//!
//! Prometheus metrics for artifact encryption and key lifecycle.

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};
use std::time::Duration;

/// Metrics for crypto operations
#[derive(Clone)]
pub struct CryptoMetrics {
    /// Total operations counter by operation and status
    pub operations_total: IntCounterVec,
    /// Operation latency histogram by operation
    pub latency_seconds: HistogramVec,
    /// Error counter by operation and error type
    pub errors_total: IntCounterVec,
    /// Counter for keys generated on this device
    pub keys_generated_total: IntCounter,
}

impl CryptoMetrics {
    /// Creates crypto metrics and registers them with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let operations_total = IntCounterVec::new(
            Opts::new(
                "capsule_crypto_operations_total",
                "Total number of crypto operations",
            ),
            &["operation", "status"],
        )?;

        let latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "capsule_crypto_latency_seconds",
                "Crypto operation latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
            &["operation"],
        )?;

        let errors_total = IntCounterVec::new(
            Opts::new(
                "capsule_crypto_errors_total",
                "Total number of crypto errors",
            ),
            &["operation", "error_type"],
        )?;

        let keys_generated_total = IntCounter::new(
            "capsule_crypto_keys_generated_total",
            "Total number of device keys generated",
        )?;

        registry.register(Box::new(operations_total.clone()))?;
        registry.register(Box::new(latency_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(keys_generated_total.clone()))?;

        Ok(Self {
            operations_total,
            latency_seconds,
            errors_total,
            keys_generated_total,
        })
    }

    /// Records a successful operation
    pub fn record_success(&self, operation: &str, duration: Duration) {
        self.operations_total
            .with_label_values(&[operation, "success"])
            .inc();
        self.latency_seconds
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Records a failed operation
    pub fn record_failure(&self, operation: &str, error_type: &str, duration: Duration) {
        self.operations_total
            .with_label_values(&[operation, "failure"])
            .inc();
        self.latency_seconds
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
        self.errors_total
            .with_label_values(&[operation, error_type])
            .inc();
    }

    /// Increments the key generation counter
    pub fn record_key_generated(&self) {
        self.keys_generated_total.inc();
    }
}

impl std::fmt::Debug for CryptoMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success() {
        let registry = Registry::new();
        let metrics = CryptoMetrics::register(&registry).unwrap();

        metrics.record_success("encrypt", Duration::from_micros(250));
        metrics.record_success("encrypt", Duration::from_micros(300));

        let count = metrics
            .operations_total
            .with_label_values(&["encrypt", "success"])
            .get();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_record_failure() {
        let registry = Registry::new();
        let metrics = CryptoMetrics::register(&registry).unwrap();

        metrics.record_failure("decrypt", "decryption_failed", Duration::from_millis(1));

        assert_eq!(
            metrics
                .errors_total
                .with_label_values(&["decrypt", "decryption_failed"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["decrypt", "failure"])
                .get(),
            1
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = Registry::new();
        assert!(CryptoMetrics::register(&registry).is_ok());
        assert!(CryptoMetrics::register(&registry).is_err());
    }

    #[test]
    fn test_metrics_gathered() {
        let registry = Registry::new();
        let metrics = CryptoMetrics::register(&registry).unwrap();
        metrics.record_key_generated();

        let families = registry.gather();
        assert!(
            families
                .iter()
                .any(|f| f.get_name() == "capsule_crypto_keys_generated_total")
        );
    }
}
