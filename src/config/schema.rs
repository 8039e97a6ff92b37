//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! service. All types derive Serde traits for deserialization from
//! config files, and every section has defaults so a minimal config
//! file (or none at all) is enough to boot.

use serde::{Deserialize, Serialize};

/// Root configuration for the shortener service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Worker pool sizing.
    pub pool: PoolConfig,

    /// Admission control (load shedding) settings.
    pub admission: AdmissionConfig,

    /// Backend data service settings.
    pub data_service: DataServiceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Short-code generation settings.
    pub codes: CodeConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout applied at the ingress layer (seconds).
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads. Sessions shard across workers by
    /// `session_id % workers`.
    pub workers: usize,

    /// Per-worker queue capacity. `submit` fails once a worker's queue
    /// holds this many jobs.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
        }
    }
}

/// Admission control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Maximum concurrent in-flight requests before shedding.
    pub max_in_flight: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self { max_in_flight: 1024 }
    }
}

/// Backend data service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataServiceConfig {
    /// Backend address (e.g., "127.0.0.1:9200").
    pub address: String,

    /// Base API path; entity ids are appended for id-scoped operations.
    pub base_path: String,

    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9200".to_string(),
            base_path: "/api/v1/links".to_string(),
            timeout_ms: 2_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to telemetry.
    pub service_name: String,

    /// Whether the Prometheus exporter is started.
    pub metrics_enabled: bool,

    /// Address for the Prometheus scrape endpoint.
    pub metrics_address: String,

    /// Fraction of root traces that are sampled, in `[0.0, 1.0]`.
    pub trace_sample_ratio: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "url-shortener".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            trace_sample_ratio: 1.0,
        }
    }
}

/// Short-code generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Length of generated short codes.
    pub length: usize,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self { length: 7 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.pool.workers, 4);
        assert_eq!(config.pool.queue_capacity, 256);
        assert_eq!(config.admission.max_in_flight, 1024);
        assert_eq!(config.data_service.base_path, "/api/v1/links");
        assert_eq!(config.codes.length, 7);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [pool]
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.pool.workers, 2);
        assert_eq!(config.pool.queue_capacity, 256);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
