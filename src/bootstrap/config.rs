//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - Read TOML configuration files / 读取 TOML 配置文件
//! - Parse TOML into the AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! Range checks belong to `AppConfig::from_toml`; this layer only reads.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cy_core::AppConfig;
use tracing::info;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. The default path is optional: when it is
/// missing the product defaults are used.
pub fn resolve_config(explicit: Option<&Path>, default_path: PathBuf) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    if default_path.exists() {
        load_config(&default_path)
    } else {
        info!(path = %default_path.display(), "no config file, using defaults");
        Ok(AppConfig::default())
    }
}
