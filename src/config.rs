use crate::error::EngineError;
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recognized engine options, with their documented defaults.
///
/// Constructed via [`EngineConfig::default`] and tweaked with the builder
/// methods, or deserialized wholesale from the caller's configuration file.
/// [`EngineConfig::validate`] must be called (or implicitly happens inside
/// [`crate::engine::analyze`]) before use — it never block-fixes an
/// out-of-range value, it rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum distinct counterparties to flag a fan-in/fan-out hub.
    pub fan_min_spokes: usize,
    /// Sliding window width, in seconds, for fan detection.
    pub fan_window_secs: i64,
    /// Optional minimum aggregate window volume for a fan finding (0 = disabled).
    pub fan_min_volume: Decimal,
    /// Minimum path length (edges) for a shell chain.
    pub chain_min_length: usize,
    /// Maximum `tx_count` for an intermediate node to count as "shell".
    pub chain_max_intermediate_tx: u32,
    /// Fractional tolerance between adjacent edge amounts on a chain.
    pub chain_amount_tolerance: f64,
    /// Minimum final score for an account to be reported as suspicious.
    pub suspicious_threshold: u8,
    /// Distinct-counterparty threshold above which the merchant
    /// false-positive dampening applies.
    pub merchant_counterparty_threshold: usize,
    /// Whether C2/C3/C4 may run concurrently over the shared graph.
    pub parallel_detectors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fan_min_spokes: 10,
            fan_window_secs: 72 * 3600,
            fan_min_volume: Decimal::ZERO,
            chain_min_length: 4,
            chain_max_intermediate_tx: 3,
            chain_amount_tolerance: 0.10,
            suspicious_threshold: 50,
            merchant_counterparty_threshold: 1000,
            parallel_detectors: true,
        }
    }
}

impl EngineConfig {
    pub fn fan_window(&self) -> Duration {
        Duration::seconds(self.fan_window_secs)
    }

    /// Reject out-of-range options before any detector runs.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.fan_window_secs <= 0 {
            return Err(EngineError::ConfigurationError(
                "FAN_WINDOW must be positive".into(),
            ));
        }
        if self.fan_min_spokes == 0 {
            return Err(EngineError::ConfigurationError(
                "FAN_MIN_SPOKES must be at least 1".into(),
            ));
        }
        if self.fan_min_volume < Decimal::ZERO {
            return Err(EngineError::ConfigurationError(
                "FAN_MIN_VOLUME must not be negative".into(),
            ));
        }
        if self.chain_min_length < 2 {
            return Err(EngineError::ConfigurationError(
                "CHAIN_MIN_LENGTH must be at least 2".into(),
            ));
        }
        if self.chain_amount_tolerance < 0.0 {
            return Err(EngineError::ConfigurationError(
                "CHAIN_AMOUNT_TOLERANCE must not be negative".into(),
            ));
        }
        if self.suspicious_threshold > 100 {
            return Err(EngineError::ConfigurationError(
                "SUSPICIOUS_THRESHOLD must be within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let cfg = EngineConfig {
            fan_window_secs: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_negative_min_volume_rejected() {
        let cfg = EngineConfig {
            fan_min_volume: Decimal::from(-1),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
