use serde::{Deserialize, Serialize};
use std::time::Duration;

/// PrintLink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintLinkConfig {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
    /// Session tuning parameters
    #[serde(default)]
    pub session: SessionConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Session tuning parameters for one printer link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Serial baud rate (the printer line speed is fixed per model)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Minimum spacing between consecutive gated writes in milliseconds;
    /// the printer needs settling time between packets
    #[serde(default = "default_write_gap")]
    pub write_gap_ms: u64,
    /// Interval between read-loop polls of the transport in milliseconds
    #[serde(default = "default_read_poll")]
    pub read_poll_ms: u64,
    /// Open timeout handed to the serial layer in milliseconds
    #[serde(default = "default_open_timeout")]
    pub open_timeout_ms: u64,
    /// Timeout for device info retrieval during connect, in milliseconds
    #[serde(default = "default_info_timeout")]
    pub info_timeout_ms: u64,
    /// Heartbeat interval in milliseconds; 0 disables the periodic health check
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
}

impl SessionConfig {
    pub fn write_gap(&self) -> Duration {
        Duration::from_millis(self.write_gap_ms)
    }

    pub fn read_poll(&self) -> Duration {
        Duration::from_millis(self.read_poll_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn info_timeout(&self) -> Duration {
        Duration::from_millis(self.info_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        if self.heartbeat_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.heartbeat_interval_ms))
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_write_gap() -> u64 {
    10
}

fn default_read_poll() -> u64 {
    10
}

fn default_open_timeout() -> u64 {
    100
}

fn default_info_timeout() -> u64 {
    3_000
}

fn default_heartbeat_interval() -> u64 {
    10_000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            write_gap_ms: default_write_gap(),
            read_poll_ms: default_read_poll(),
            open_timeout_ms: default_open_timeout(),
            info_timeout_ms: default_info_timeout(),
            heartbeat_interval_ms: default_heartbeat_interval(),
        }
    }
}

impl Default for PrintLinkConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            session: SessionConfig::default(),
        }
    }
}
