//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - Create platform adapters (clipboard, image sink, notifier) / 创建平台适配器
//! - Create the WebSocket transport / 创建 WebSocket 传输
//! - Assemble the hub and lifecycle controller / 组装同步中心与生命周期控制器
//!
//! This is the only place that depends on cy-app, cy-network and cy-platform
//! at once. It assembles; it does not decide.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tracing::{info, warn};

use cy_app::{ConnectionRegistry, LifecycleController, LifecycleDeps, LifecycleSettings, SyncHub, SyncHubDeps};
use cy_core::ports::{AppDirs, ClipboardPort, ImageSinkPort, NotifierPort, PeerTransportPort};
use cy_core::{AppConfig, ClipboardError, TaggedCodec, TextOnlyCodec, WireCodec};
use cy_network::WsTransport;
use cy_platform::net_utils::get_physical_lan_ip;
use cy_platform::{FileImageSink, LocalClipboard, TracingNotifier};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("clipboard initialization failed: {0}")]
    ClipboardInit(#[from] ClipboardError),
}

/// Everything the console needs after wiring.
pub struct AppRuntime {
    pub controller: Arc<LifecycleController>,
    pub notifier: Arc<TracingNotifier>,
}

/// Pick the listen IP: explicit override, then LAN detection, then loopback.
pub fn resolve_bind_ip(config: &AppConfig) -> IpAddr {
    if let Some(raw) = config.bind_ip.as_deref() {
        match raw.parse::<IpAddr>() {
            Ok(ip) => return ip,
            Err(e) => warn!(bind_ip = raw, error = %e, "ignoring invalid bind_ip"),
        }
    }

    match get_physical_lan_ip() {
        Some(ip) => IpAddr::V4(ip),
        None => {
            warn!("falling back to loopback; peers on the LAN will not reach this hub");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Wire codec matching the image setting.
fn select_codec(config: &AppConfig) -> Arc<dyn WireCodec> {
    if config.images {
        Arc::new(TaggedCodec)
    } else {
        Arc::new(TextOnlyCodec)
    }
}

pub fn wire_dependencies(
    config: &AppConfig,
    app_dirs: &AppDirs,
    notifier: Arc<TracingNotifier>,
) -> WiringResult<AppRuntime> {
    let clipboard: Arc<dyn ClipboardPort> = Arc::new(LocalClipboard::new(config.images)?);
    let codec = select_codec(config);

    let image_sink: Option<Arc<dyn ImageSinkPort>> = config.images.then(|| {
        let dir = config
            .image_dir
            .clone()
            .unwrap_or_else(|| FileImageSink::default_dir(app_dirs));
        info!(dir = %dir.display(), "received images will be saved");
        Arc::new(FileImageSink::new(dir)) as Arc<dyn ImageSinkPort>
    });

    let notifier_port: Arc<dyn NotifierPort> = notifier.clone();
    let hub = Arc::new(SyncHub::from_deps(SyncHubDeps {
        registry: Arc::new(ConnectionRegistry::new()),
        clipboard,
        codec,
        notifier: notifier_port.clone(),
        image_sink,
    }));

    let transport: Arc<dyn PeerTransportPort> = Arc::new(WsTransport::new(config.ws_path.clone()));
    let bind_addr = SocketAddr::new(resolve_bind_ip(config), config.port);

    let controller = Arc::new(LifecycleController::from_deps(LifecycleDeps {
        hub,
        transport,
        notifier: notifier_port,
        settings: LifecycleSettings {
            bind_addr,
            ws_path: config.ws_path.clone(),
            poll_interval: config.poll_interval(),
        },
    }));

    Ok(AppRuntime {
        controller,
        notifier,
    })
}
