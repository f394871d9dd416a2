//! Configuration loading and validation

use anyhow::Result;
use handlink_core::{Quat, ReferenceFrame, Vec3};
use handlink_listener::{ListenerConfig, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::publisher::DEFAULT_PERIOD;

/// Smallest accepted line limit; a full protocol message fits well within it
pub const MIN_LINE_BYTES: usize = 256;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub listener: ListenerSection,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between status log lines (0 to disable)
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: default_status_interval(),
        }
    }
}

fn default_status_interval() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerSection {
    /// TCP port on 127.0.0.1
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bytes requested per socket read
    #[serde(default = "default_read_chunk")]
    pub read_chunk_bytes: usize,
    /// Longest partial line kept while waiting for a newline
    #[serde(default = "default_max_line")]
    pub max_line_bytes: usize,
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            read_chunk_bytes: default_read_chunk(),
            max_line_bytes: default_max_line(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_read_chunk() -> usize {
    ListenerConfig::default().read_chunk_bytes
}

fn default_max_line() -> usize {
    ListenerConfig::default().max_line_bytes
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Pose publishing period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_PERIOD.as_millis() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    #[serde(default = "default_left_serial")]
    pub left_serial: String,
    #[serde(default = "default_right_serial")]
    pub right_serial: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            left_serial: default_left_serial(),
            right_serial: default_right_serial(),
        }
    }
}

fn default_left_serial() -> String {
    "handlink-left".to_string()
}

fn default_right_serial() -> String {
    "handlink-right".to_string()
}

/// Static head pose for running without a VR runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion as `[w, x, y, z]`
    #[serde(default = "default_orientation")]
    pub orientation: [f32; 4],
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: default_orientation(),
        }
    }
}

fn default_orientation() -> [f32; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

impl ListenerSection {
    /// Listener settings with the line limit raised to [`MIN_LINE_BYTES`]
    pub fn to_listener_config(&self) -> ListenerConfig {
        if self.max_line_bytes < MIN_LINE_BYTES {
            warn!(
                max_line_bytes = self.max_line_bytes,
                min = MIN_LINE_BYTES,
                "Line limit too small, raising it"
            );
        }
        ListenerConfig {
            read_chunk_bytes: self.read_chunk_bytes.max(1),
            max_line_bytes: self.max_line_bytes.max(MIN_LINE_BYTES),
        }
    }
}

impl PublisherConfig {
    /// Publishing period, never shorter than 1 ms
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl ReferenceConfig {
    /// Head frame with a normalized orientation
    pub fn to_reference_frame(&self) -> ReferenceFrame {
        let [w, x, y, z] = self.orientation;
        let raw = Quat::from_xyzw(x, y, z, w);
        let orientation = if raw.is_finite() && raw.length_squared() > f32::EPSILON {
            raw.normalize()
        } else {
            warn!(orientation = ?self.orientation, "Invalid reference orientation, using identity");
            Quat::IDENTITY
        };

        ReferenceFrame {
            position: Vec3::from_array(self.position),
            orientation,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.listener.port, 65432);
        assert_eq!(config.publisher.interval_ms, 5);
        assert_eq!(config.devices.left_serial, "handlink-left");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("handlink.toml");
        std::fs::write(
            &path,
            "[listener]\nport = 7000\n\n[reference]\nposition = [0.0, 1.6, 0.0]\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, 7000);
        assert_eq!(config.listener.max_line_bytes, 64 * 1024);
        assert_eq!(config.reference.orientation, [1.0, 0.0, 0.0, 0.0]);
        let frame = config.reference.to_reference_frame();
        assert_abs_diff_eq!(frame.position.y, 1.6, epsilon = 1e-6);
        assert_eq!(frame.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[listener]\nport = \"not a port\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_saved_default_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("handlink.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, DEFAULT_PORT);
        assert_eq!(config.daemon.status_interval_secs, 10);
        assert_eq!(config.devices.right_serial, "handlink-right");
    }

    #[test]
    fn test_reference_orientation_is_normalized() {
        let reference = ReferenceConfig {
            position: [0.0; 3],
            orientation: [2.0, 0.0, 0.0, 0.0],
        };
        assert_eq!(reference.to_reference_frame().orientation, Quat::IDENTITY);

        let zero = ReferenceConfig {
            position: [0.0; 3],
            orientation: [0.0; 4],
        };
        assert_eq!(zero.to_reference_frame().orientation, Quat::IDENTITY);

        let tilted = ReferenceConfig {
            position: [0.0; 3],
            orientation: [1.0, 0.0, 1.0, 0.0],
        };
        let q = tilted.to_reference_frame().orientation;
        assert_abs_diff_eq!(q.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_listener_limits_floor() {
        let section = ListenerSection {
            port: DEFAULT_PORT,
            read_chunk_bytes: 0,
            max_line_bytes: 0,
        };
        let listener = section.to_listener_config();
        assert_eq!(listener.read_chunk_bytes, 1);
        assert_eq!(listener.max_line_bytes, MIN_LINE_BYTES);

        let defaults = ListenerSection::default().to_listener_config();
        assert_eq!(defaults.max_line_bytes, ListenerConfig::default().max_line_bytes);
        assert_eq!(defaults.read_chunk_bytes, ListenerConfig::default().read_chunk_bytes);
    }

    #[test]
    fn test_default_interval_matches_publisher() {
        let publisher = PublisherConfig::default();
        assert_eq!(publisher.period(), DEFAULT_PERIOD);
    }

    #[test]
    fn test_publisher_period_floor() {
        let publisher = PublisherConfig { interval_ms: 0 };
        assert_eq!(publisher.period(), Duration::from_millis(1));
    }
}
