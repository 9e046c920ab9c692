use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use crate::error::BridgeError;
use crate::frame::MAX_RELAYS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Exact name of the MIDI input port to listen on.
    pub midi_port: String,
    /// Serial device path prefixes tried in order. A trailing `*` is allowed.
    pub serial_patterns: Vec<String>,
    pub baud_rate: u32,
    /// Controller boot time after the port is opened.
    pub settle_ms: u64,
    pub first_motor: u8,
    pub last_motor: u8,
    pub relay_count: u8,
    pub poll_interval_us: u64,
    pub aggregate_interval_us: u64,
    /// Pause between motor writes in the shutdown zero-out.
    pub shutdown_step_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            midi_port: "from Max 1".to_string(),
            serial_patterns: vec![
                "/dev/cu.usbserial*".to_string(),
                "/dev/cu.SLAB*".to_string(),
                "/dev/cu.wchusbserial*".to_string(),
            ],
            baud_rate: 115_200,
            settle_ms: 2000,
            first_motor: 1,
            last_motor: 10,
            relay_count: 16,
            poll_interval_us: 100,
            aggregate_interval_us: 1000,
            shutdown_step_ms: 100,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let ron_string = fs::read_to_string(path).map_err(|source| BridgeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BridgeConfig =
            ron::from_str(&ron_string).map_err(|e| BridgeError::config(path, e))?;
        config.validate().map_err(|reason| BridgeError::config(path, reason))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_RELAYS).contains(&self.relay_count) {
            return Err(format!(
                "relay_count must be between 1 and {MAX_RELAYS}, got {}",
                self.relay_count
            ));
        }
        if self.first_motor > self.last_motor || self.last_motor > 127 {
            return Err(format!(
                "motor range {}..={} must be non-empty and within 0..=127",
                self.first_motor, self.last_motor
            ));
        }
        if self.serial_patterns.is_empty() {
            return Err("serial_patterns must not be empty".to_string());
        }
        Ok(())
    }

    pub fn motor_range(&self) -> RangeInclusive<u8> {
        self.first_motor..=self.last_motor
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    pub fn aggregate_interval(&self) -> Duration {
        Duration::from_micros(self.aggregate_interval_us)
    }

    pub fn shutdown_step(&self) -> Duration {
        Duration::from_millis(self.shutdown_step_ms)
    }
}
