//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates > 0, windows > 0, sweep periods > 0)
//! - Check addresses and the backend URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{Algorithm, ProxyConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}': {1}")]
    BindAddress(String, std::net::AddrParseError),

    #[error("invalid backend URL '{0}': {1}")]
    BackendUrl(String, url::ParseError),

    #[error("backend URL '{0}' must use the http scheme")]
    BackendScheme(String),

    #[error("rate_limit.requests_per_second must be > 0 for algorithm {0}")]
    ZeroRate(Algorithm),

    #[error("rate_limit.window_secs must be > 0 for algorithm {0}")]
    ZeroWindow(Algorithm),

    #[error("sweeper.interval_secs must be > 0")]
    ZeroSweepInterval,

    #[error("sweeper.idle_timeout_secs must be > 0")]
    ZeroIdleTimeout,

    #[error("timeouts.request_secs must be > 0")]
    ZeroRequestTimeout,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
            e,
        ));
    }

    match Url::parse(&config.backend.url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::BackendScheme(config.backend.url.clone()));
            }
        }
        Err(e) => errors.push(ValidationError::BackendUrl(config.backend.url.clone(), e)),
    }

    let rl = &config.rate_limit;
    match rl.algorithm {
        Algorithm::NoRateLimit => {}
        alg => {
            if rl.requests_per_second == 0 {
                errors.push(ValidationError::ZeroRate(alg));
            }
            // A zero burst is legal (always-deny bucket); a zero window is not.
            if matches!(alg, Algorithm::FixedWindow | Algorithm::SlidingWindow)
                && rl.window_secs == 0
            {
                errors.push(ValidationError::ZeroWindow(alg));
            }
        }
    }

    if config.sweeper.interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }
    if config.sweeper.idle_timeout_secs == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
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
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut config = ProxyConfig::default();
        config.rate_limit.requests_per_second = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::ZeroRate(_))));
    }

    #[test]
    fn test_zero_burst_is_valid() {
        // A zero-capacity bucket is a legal always-deny configuration,
        // not a startup error.
        let mut config = ProxyConfig::default();
        config.rate_limit.algorithm = Algorithm::TokenBucket;
        config.rate_limit.burst_size = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_rate_allowed_when_unlimited() {
        let mut config = ProxyConfig::default();
        config.rate_limit.algorithm = Algorithm::NoRateLimit;
        config.rate_limit.requests_per_second = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_window_rejected_for_window_algorithms() {
        let mut config = ProxyConfig::default();
        config.rate_limit.algorithm = Algorithm::SlidingWindow;
        config.rate_limit.window_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::ZeroWindow(_))));
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.backend.url = "ftp://example.com".into();
        config.sweeper.interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
