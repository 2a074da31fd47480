//! Line-oriented control console.
//!
//! Stands in for the tray menu: every command maps to one Lifecycle API call
//! or observability hook. Ctrl-C and end of input both behave as `exit`.

use std::str::FromStr;

use anyhow::Context;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use cy_core::ServerState;

use crate::bootstrap::wiring::AppRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Pause,
    Resume,
    Status,
    Url,
    Notify(bool),
    Help,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),

    #[error("usage: notify on|off")]
    NotifyUsage,
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next().map(str::to_ascii_lowercase);

        match (command.as_str(), argument.as_deref()) {
            ("start", None) => Ok(Self::Start),
            ("pause" | "stop", None) => Ok(Self::Pause),
            ("resume", None) => Ok(Self::Resume),
            ("status", None) => Ok(Self::Status),
            ("url", None) => Ok(Self::Url),
            ("notify", Some("on")) => Ok(Self::Notify(true)),
            ("notify", Some("off")) => Ok(Self::Notify(false)),
            ("notify", _) => Err(ParseCommandError::NotifyUsage),
            ("help" | "?", None) => Ok(Self::Help),
            ("exit" | "quit", None) => Ok(Self::Exit),
            _ => Err(ParseCommandError::Unknown(line.trim().to_string())),
        }
    }
}

const HELP: &str = "\
commands:
  start          start syncing (resumes when paused)
  pause | stop   pause syncing, peers stay connected
  resume         resume syncing
  status         show state and connected devices
  url            show the address peers connect to
  notify on|off  toggle notifications
  exit           stop the server and quit";

/// Run one command. Returns `false` when the console should stop.
pub async fn dispatch(runtime: &AppRuntime, command: ConsoleCommand) -> bool {
    let controller = &runtime.controller;
    match command {
        ConsoleCommand::Start if controller.state() == ServerState::Paused => {
            controller.resume().await;
        }
        ConsoleCommand::Start => match controller.start().await {
            Ok(outcome) if outcome.changed() => {
                if let Some(url) = controller.connect_url().await {
                    println!("connect peers to {url}");
                }
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "start failed"),
        },
        ConsoleCommand::Pause => {
            controller.pause().await;
        }
        ConsoleCommand::Resume => {
            controller.resume().await;
        }
        ConsoleCommand::Status => {
            let status = controller.status().await;
            println!("state: {}, connected devices: {}", status.state, status.peers);
        }
        ConsoleCommand::Url => match controller.connect_url().await {
            Some(url) => println!("{url}"),
            None => println!("server is not running"),
        },
        ConsoleCommand::Notify(enabled) => runtime.notifier.set_enabled(enabled),
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Exit => return false,
    }
    true
}

/// Read commands from stdin until `exit`, Ctrl-C or end of input.
pub async fn run_console(runtime: &AppRuntime) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let line = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                info!("interrupted");
                break;
            }
            line = lines.next_line() => line.context("failed to read console input")?,
        };

        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(command) => {
                if !dispatch(runtime, command).await {
                    break;
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    Ok(())
}
