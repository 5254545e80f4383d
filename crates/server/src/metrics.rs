//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the mp4trim server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Clip outcomes by result code and encode latency
//! - Retention sweep activity

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mp4trim_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mp4trim_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mp4trim_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Clip Metrics
// =============================================================================

/// Clip requests by outcome (`success` or an error code).
pub static CLIPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mp4trim_clips_total", "Clip requests by outcome"),
        &["outcome"],
    )
    .unwrap()
});

/// Wall-clock time of successful clip requests (probe + encode).
pub static CLIP_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "mp4trim_clip_duration_seconds",
            "Time spent producing a clip",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

/// Bytes received through the upload form.
pub static UPLOAD_BYTES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("mp4trim_upload_bytes_total", "Total uploaded bytes stored").unwrap()
});

// =============================================================================
// Retention Metrics
// =============================================================================

/// Files evaluated by retention sweeps.
pub static SWEPT_FILES_PROCESSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mp4trim_retention_files_processed_total",
        "Files evaluated by retention sweeps",
    )
    .unwrap()
});

/// Files deleted by retention sweeps.
pub static SWEPT_FILES_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mp4trim_retention_files_deleted_total",
        "Files deleted by retention sweeps",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Clips
    registry.register(Box::new(CLIPS_TOTAL.clone())).unwrap();
    registry.register(Box::new(CLIP_DURATION.clone())).unwrap();
    registry
        .register(Box::new(UPLOAD_BYTES_TOTAL.clone()))
        .unwrap();

    // Retention
    registry
        .register(Box::new(SWEPT_FILES_PROCESSED.clone()))
        .unwrap();
    registry
        .register(Box::new(SWEPT_FILES_DELETED.clone()))
        .unwrap();
}

/// Record the outcome of one retention sweep.
pub fn record_sweep(stats: mp4trim_core::SweepStats) {
    SWEPT_FILES_PROCESSED.inc_by(stats.processed as u64);
    SWEPT_FILES_DELETED.inc_by(stats.deleted as u64);
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

static MEDIA_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/media/[a-z]+)/[^/]+$").unwrap());

/// Normalize a path for metric labels (served file names become `{file}`).
pub fn normalize_path(path: &str) -> String {
    MEDIA_FILE_RE.replace(path, "$1/{file}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_media_file() {
        let path = "/media/clips/clip_1700000000_1234.mp4";
        assert_eq!(normalize_path(path), "/media/clips/{file}");
    }

    #[test]
    fn test_normalize_path_upload_file() {
        let path = "/media/uploads/1700000000_1234_my_video.mp4";
        assert_eq!(normalize_path(path), "/media/uploads/{file}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/clips"), "/api/v1/clips");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("mp4trim_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Vec metrics only appear once a label set has been touched.
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        CLIPS_TOTAL.with_label_values(&["success"]).inc();
        CLIP_DURATION.observe(1.5);
        record_sweep(mp4trim_core::SweepStats {
            processed: 3,
            deleted: 1,
        });

        let output = encode_metrics();

        assert!(output.contains("mp4trim_http_request_duration_seconds"));
        assert!(output.contains("mp4trim_http_requests_in_flight"));
        assert!(output.contains("mp4trim_clips_total"));
        assert!(output.contains("mp4trim_clip_duration_seconds"));
        assert!(output.contains("mp4trim_upload_bytes_total"));
        assert!(output.contains("mp4trim_retention_files_processed_total"));
        assert!(output.contains("mp4trim_retention_files_deleted_total"));
    }
}
