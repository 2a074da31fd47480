//! Application entry: the steps `main` runs, in order.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::info;

use cy_app::LifecycleController;
use cy_core::ports::{AppDirsPort, NotifierPort};
use cy_platform::net_utils::is_port_in_use;
use cy_platform::{DirsAppDirsAdapter, TracingNotifier};

use super::config::resolve_config;
use super::tracing::init_tracing_subscriber;
use super::wiring::wire_dependencies;
use crate::cli::Cli;
use crate::console::run_console;

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let app_dirs = DirsAppDirsAdapter::new()
        .get_app_dirs()
        .context("failed to resolve application directories")?;
    init_tracing_subscriber(&app_dirs.logs_dir())?;

    let mut config = resolve_config(cli.config.as_deref(), app_dirs.config_file())?;
    cli.apply_overrides(&mut config);
    info!(?config, "configuration loaded");

    let notifier = Arc::new(TracingNotifier::new(config.notifications_enabled));

    if is_port_in_use(config.port) {
        notifier.notify(
            "Clipy",
            &format!(
                "The port {} is busy. Close the application using the port to start the application again.",
                config.port
            ),
        );
        return Ok(ExitCode::from(1));
    }

    let runtime = wire_dependencies(&config, &app_dirs, notifier)?;
    let reporter = spawn_status_reporter(runtime.controller.clone());

    if !cli.no_start {
        runtime
            .controller
            .start()
            .await
            .context("failed to start sync server")?;
    }

    let console = run_console(&runtime).await;

    runtime.controller.exit().await;
    reporter.abort();
    console?;
    Ok(ExitCode::SUCCESS)
}

/// Log every state or peer-count change, like the tray tooltip would show.
fn spawn_status_reporter(controller: Arc<LifecycleController>) -> JoinHandle<()> {
    let mut states = controller.subscribe_state();
    let mut peers = controller.subscribe_peers();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = states.changed() => if changed.is_err() { break },
                changed = peers.changed() => if changed.is_err() { break },
            }
            let status = controller.status().await;
            info!(state = %status.state, peers = status.peers, "status");
        }
    })
}
