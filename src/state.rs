//! # Application State Management
//!
//! Shared state handed to every HTTP request handler.
//!
//! Two kinds of data live here and they are treated differently:
//! - **Immutable per process**: the configuration and the token issuer.
//!   Both are constructed once at startup, after validation, and never
//!   change. They are plain fields — no locking, no interior mutability —
//!   so a handler can read them without any coordination.
//! - **Mutable counters**: request metrics, which every request updates.
//!   These sit behind `Arc<RwLock<...>>` so concurrent requests can bump
//!   them safely; reads clone a snapshot so the lock is never held while a
//!   response is being serialized.

use crate::config::AppConfig;
use crate::token::TokenIssuer;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// State shared across all HTTP request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration. Immutable for the life of the process.
    pub config: AppConfig,

    /// Signs Speechmatics credentials. Stateless between calls.
    pub issuer: TokenIssuer,

    /// Request counters, updated by middleware and handlers.
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// When the server started, for uptime reporting.
    pub start_time: Instant,
}

/// Counters collected across all HTTP requests.
#[derive(Debug, Default)]
pub struct AppMetrics {
    /// Total requests processed since startup
    pub request_count: u64,

    /// Total error responses (4xx and 5xx)
    pub error_count: u64,

    /// Requests rejected by the bearer-key gate
    pub unauthorized_count: u64,

    /// Credentials successfully issued
    pub tokens_issued: u64,

    /// Per-endpoint statistics, keyed by "METHOD /path"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Statistics for one endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    /// Build state from validated configuration.
    ///
    /// The issuer is constructed here, once, from the signing key that
    /// `AppConfig::validate` already guaranteed to be present.
    pub fn new(config: AppConfig) -> Self {
        let issuer = TokenIssuer::new(&config.auth.speechmatics_api_key);
        Self {
            config,
            issuer,
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    pub fn increment_unauthorized_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.unauthorized_count += 1;
    }

    pub fn record_token_issued(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.tokens_issued += 1;
    }

    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();

        let endpoint_metric = metrics
            .endpoint_metrics
            .entry(endpoint.to_string())
            .or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Snapshot the counters so callers never serialize under the lock.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        let metrics = self.metrics.read().unwrap();
        AppMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            unauthorized_count: metrics.unauthorized_count,
            tokens_issued: metrics.tokens_issued,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
