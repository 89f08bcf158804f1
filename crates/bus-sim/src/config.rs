//! Schedule configuration for the simulated device

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays between emissions in one device cycle
///
/// Each delay is the wait *after* the named emission. Defaults reproduce
/// the timing of the real controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequencerConfig {
    /// Wait after the cycle-start Idle status, before Moving
    pub idle_to_moving_delay_ms: u64,
    /// Wait after Moving, before the ControlRequest acknowledgment
    pub moving_to_ack_delay_ms: u64,
    /// Wait after the acknowledgment, before returning to Idle
    pub ack_to_idle_delay_ms: u64,
    /// Wait after Idle, before reporting the error
    pub idle_to_error_delay_ms: u64,
    /// Wait after the error, before the error clears
    pub error_to_idle_delay_ms: u64,
    /// Wait after the post-error Idle, before the next cycle
    pub idle_after_error_delay_ms: u64,
    /// Error code reported in the Error status
    pub error_code: u8,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            idle_to_moving_delay_ms: 3000,
            moving_to_ack_delay_ms: 2000,
            ack_to_idle_delay_ms: 2000,
            idle_to_error_delay_ms: 3000,
            error_to_idle_delay_ms: 4000,
            idle_after_error_delay_ms: 5000,
            error_code: 5,
        }
    }
}

impl SequencerConfig {
    /// Same schedule with every delay set to zero
    pub fn immediate() -> Self {
        Self {
            idle_to_moving_delay_ms: 0,
            moving_to_ack_delay_ms: 0,
            ack_to_idle_delay_ms: 0,
            idle_to_error_delay_ms: 0,
            error_to_idle_delay_ms: 0,
            idle_after_error_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn idle_to_moving_delay(&self) -> Duration {
        Duration::from_millis(self.idle_to_moving_delay_ms)
    }

    pub fn moving_to_ack_delay(&self) -> Duration {
        Duration::from_millis(self.moving_to_ack_delay_ms)
    }

    pub fn ack_to_idle_delay(&self) -> Duration {
        Duration::from_millis(self.ack_to_idle_delay_ms)
    }

    pub fn idle_to_error_delay(&self) -> Duration {
        Duration::from_millis(self.idle_to_error_delay_ms)
    }

    pub fn error_to_idle_delay(&self) -> Duration {
        Duration::from_millis(self.error_to_idle_delay_ms)
    }

    pub fn idle_after_error_delay(&self) -> Duration {
        Duration::from_millis(self.idle_after_error_delay_ms)
    }

    /// Total wall time of one full cycle
    pub fn cycle_duration(&self) -> Duration {
        self.idle_to_moving_delay()
            + self.moving_to_ack_delay()
            + self.ack_to_idle_delay()
            + self.idle_to_error_delay()
            + self.error_to_idle_delay()
            + self.idle_after_error_delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cycle_duration() {
        assert_eq!(
            SequencerConfig::default().cycle_duration(),
            Duration::from_secs(19)
        );
    }

    #[test]
    fn test_immediate_keeps_error_code() {
        let config = SequencerConfig::immediate();
        assert_eq!(config.cycle_duration(), Duration::ZERO);
        assert_eq!(config.error_code, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SequencerConfig =
            serde_json::from_str(r#"{ "error_to_idle_delay_ms": 100 }"#).unwrap();
        assert_eq!(config.error_to_idle_delay(), Duration::from_millis(100));
        assert_eq!(config.idle_to_moving_delay(), Duration::from_secs(3));
        assert_eq!(config.error_code, 5);
    }
}
