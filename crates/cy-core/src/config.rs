//! # Pure Data Module - Configuration DTO
//!
//! Defines the configuration data and the TOML → DTO mapping. Missing keys
//! take the product defaults from [`AppConfig::default`]. A port outside the
//! u16 range is an error; a poll interval below [`MIN_POLL_INTERVAL_MS`] is
//! raised to it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;

/// Well-known port the hub listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Path the message channel is served at.
pub const DEFAULT_WS_PATH: &str = "/ws";

/// Floor for the clipboard poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Application configuration DTO (pure data, no logic)
/// 应用配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listening port
    pub port: u16,

    /// Path of the WebSocket endpoint
    pub ws_path: String,

    /// Explicit bind IP; LAN detection is used when absent
    pub bind_ip: Option<String>,

    /// Local clipboard poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Sync images (false selects the text-only codec/port pair)
    pub images: bool,

    /// Emit user notifications
    pub notifications_enabled: bool,

    /// Where received images are written; platform default when absent
    pub image_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ws_path: DEFAULT_WS_PATH.to_string(),
            bind_ip: None,
            poll_interval_ms: 1000,
            images: true,
            notifications_enabled: true,
            image_dir: None,
        }
    }
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let section = |name: &str, key: &str| toml_value.get(name).and_then(|s| s.get(key));

        let port = match section("network", "port").and_then(|v| v.as_integer()) {
            Some(p) => match u16::try_from(p) {
                Ok(port) => port,
                Err(_) => bail!("network.port {p} is outside 0..=65535"),
            },
            None => defaults.port,
        };

        Ok(Self {
            port,
            ws_path: section("network", "ws_path")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or(defaults.ws_path),
            bind_ip: section("network", "bind_ip")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            poll_interval_ms: section("sync", "poll_interval_ms")
                .and_then(|v| v.as_integer())
                .map(|ms| u64::try_from(ms).unwrap_or(0).max(MIN_POLL_INTERVAL_MS))
                .unwrap_or(defaults.poll_interval_ms),
            images: section("sync", "images")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.images),
            notifications_enabled: section("notifications", "enabled")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.notifications_enabled),
            image_dir: section("storage", "image_dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}
