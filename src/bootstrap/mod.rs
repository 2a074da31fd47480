//! Process bootstrap: configuration, logging, dependency wiring.
//!
//! 启动流程：加载配置 → 初始化日志 → 端口检查 → 组装依赖 → 控制台。

pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use run::run;
