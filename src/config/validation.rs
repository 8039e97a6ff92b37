//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker count, capacities, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: `ServiceConfig` → `Result<(), Vec<ValidationError>>`
//! - Runs before the config is accepted into the system

use crate::config::schema::ServiceConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.workers == 0 {
        errors.push(err("pool.workers", "must be at least 1"));
    }
    if config.pool.queue_capacity == 0 {
        errors.push(err("pool.queue_capacity", "must be at least 1"));
    }
    if config.admission.max_in_flight == 0 {
        errors.push(err("admission.max_in_flight", "must be at least 1"));
    }
    if config.data_service.timeout_ms == 0 {
        errors.push(err("data_service.timeout_ms", "must be at least 1"));
    }
    if !config.data_service.base_path.starts_with('/') {
        errors.push(err("data_service.base_path", "must start with '/'"));
    }
    if config.codes.length == 0 {
        errors.push(err("codes.length", "must be at least 1"));
    }
    if !(0.0..=1.0).contains(&config.observability.trace_sample_ratio) {
        errors.push(err(
            "observability.trace_sample_ratio",
            "must be between 0.0 and 1.0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.pool.workers = 0;
        config.admission.max_in_flight = 0;
        config.data_service.base_path = "links".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "pool.workers"));
        assert!(errors.iter().any(|e| e.field == "admission.max_in_flight"));
        assert!(errors.iter().any(|e| e.field == "data_service.base_path"));
    }

    #[test]
    fn test_sample_ratio_bounds() {
        let mut config = ServiceConfig::default();
        config.observability.trace_sample_ratio = 1.5;
        assert!(validate_config(&config).is_err());
    }
}
