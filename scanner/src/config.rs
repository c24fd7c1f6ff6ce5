//! Scanner configuration.
//!
//! Loaded from environment variables with defaults. Unparseable values fall
//! back to their default.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Base URL of the validation service (`GATECHECK_API_URL`)
    pub api_base_url: String,
    /// Scanner (admin) id sent with every request (`GATECHECK_ADMIN_ID`)
    pub admin_id: String,
    /// Gate location sent with every request (`GATECHECK_LOCATION`)
    pub location: String,
    /// Device id override (`GATECHECK_DEVICE_ID`); the host identity is used when unset
    pub device_id: Option<String>,
    /// Minimum interval between accepted codes (`GATECHECK_SCAN_COOLDOWN_MS`)
    pub scan_cooldown: Duration,
    /// Auto-reset delay after a verdict (`GATECHECK_RESULT_RESET_MS`)
    pub result_reset: Duration,
    /// Auto-reset delay after a failed attempt (`GATECHECK_ERROR_RESET_MS`)
    pub error_reset: Duration,
    /// HTTP request timeout (`GATECHECK_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,
    /// How long `stop()` waits for the frame worker (`GATECHECK_STOP_TIMEOUT_MS`)
    pub stop_timeout: Duration,
    /// Prometheus scrape address (`GATECHECK_METRICS_ADDR`); disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl ScannerConfig {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.parse().ok())
                .map_or(default, Duration::from_millis)
        };

        Self {
            api_base_url: lookup("GATECHECK_API_URL").unwrap_or(defaults.api_base_url),
            admin_id: lookup("GATECHECK_ADMIN_ID").unwrap_or(defaults.admin_id),
            location: lookup("GATECHECK_LOCATION").unwrap_or(defaults.location),
            device_id: lookup("GATECHECK_DEVICE_ID").filter(|id| !id.is_empty()),
            scan_cooldown: millis("GATECHECK_SCAN_COOLDOWN_MS", defaults.scan_cooldown),
            result_reset: millis("GATECHECK_RESULT_RESET_MS", defaults.result_reset),
            error_reset: millis("GATECHECK_ERROR_RESET_MS", defaults.error_reset),
            request_timeout: lookup("GATECHECK_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
            stop_timeout: millis("GATECHECK_STOP_TIMEOUT_MS", defaults.stop_timeout),
            metrics_addr: lookup("GATECHECK_METRICS_ADDR").and_then(|s| s.parse().ok()),
        }
    }

    /// Set the validation service URL
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the device id
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Set the cooldown between accepted codes
    #[must_use]
    pub const fn with_scan_cooldown(mut self, cooldown: Duration) -> Self {
        self.scan_cooldown = cooldown;
        self
    }

    /// Set the verdict and failure auto-reset delays
    #[must_use]
    pub const fn with_reset_delays(mut self, result: Duration, error: Duration) -> Self {
        self.result_reset = result;
        self.error_reset = error;
        self
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the frame worker stop timeout
    #[must_use]
    pub const fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            admin_id: "admin-scanner-001".to_string(),
            location: "Main Gate".to_string(),
            device_id: None,
            scan_cooldown: Duration::from_millis(3_000),
            result_reset: Duration::from_millis(5_000),
            error_reset: Duration::from_millis(3_000),
            request_timeout: Duration::from_secs(10),
            stop_timeout: Duration::from_millis(2_000),
            metrics_addr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ScannerConfig::from_lookup(|_| None);
        assert_eq!(config, ScannerConfig::default());
        assert_eq!(config.result_reset, Duration::from_secs(5));
        assert_eq!(config.error_reset, Duration::from_secs(3));
    }

    #[test]
    fn reads_overrides() {
        let config = ScannerConfig::from_lookup(lookup(&[
            ("GATECHECK_API_URL", "https://tickets.example"),
            ("GATECHECK_LOCATION", "North Gate"),
            ("GATECHECK_DEVICE_ID", "pixel-7"),
            ("GATECHECK_SCAN_COOLDOWN_MS", "1500"),
            ("GATECHECK_REQUEST_TIMEOUT_SECS", "4"),
            ("GATECHECK_METRICS_ADDR", "127.0.0.1:9100"),
        ]));

        assert_eq!(config.api_base_url, "https://tickets.example");
        assert_eq!(config.location, "North Gate");
        assert_eq!(config.device_id.as_deref(), Some("pixel-7"));
        assert_eq!(config.scan_cooldown, Duration::from_millis(1_500));
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = ScannerConfig::from_lookup(lookup(&[
            ("GATECHECK_RESULT_RESET_MS", "soon"),
            ("GATECHECK_METRICS_ADDR", "not-an-addr"),
            ("GATECHECK_DEVICE_ID", ""),
        ]));

        assert_eq!(config.result_reset, Duration::from_secs(5));
        assert_eq!(config.metrics_addr, None);
        assert_eq!(config.device_id, None);
    }
}
