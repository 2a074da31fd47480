use std::path::PathBuf;

use clap::Parser;
use cy_core::AppConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "clipy")]
#[command(version, about = "Share one clipboard between this desktop and devices on the LAN", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to the per-user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// IP address to bind instead of the detected LAN address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Sync text only; images are neither sent nor accepted
    #[arg(long)]
    pub text_only: bool,

    /// Start with notifications turned off
    #[arg(long)]
    pub no_notifications: bool,

    /// Stay stopped after launch until the `start` command
    #[arg(long)]
    pub no_start: bool,
}

impl Cli {
    /// Command-line values win over the file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = &self.bind {
            config.bind_ip = Some(bind.clone());
        }
        if self.text_only {
            config.images = false;
        }
        if self.no_notifications {
            config.notifications_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "clipy",
            "--port",
            "9000",
            "--bind",
            "10.0.0.2",
            "--text-only",
            "--no-notifications",
        ]);
        let mut config = AppConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_ip.as_deref(), Some("10.0.0.2"));
        assert!(!config.images);
        assert!(!config.notifications_enabled);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let cli = Cli::parse_from(["clipy"]);
        let mut config = AppConfig {
            port: 7000,
            ..AppConfig::default()
        };

        cli.apply_overrides(&mut config);

        assert_eq!(config.port, 7000);
        assert!(config.images);
        assert!(config.notifications_enabled);
        assert!(!cli.no_start);
    }

    #[test]
    fn no_start_keeps_server_stopped_on_launch() {
        let cli = Cli::parse_from(["clipy", "--no-start"]);

        assert!(cli.no_start);
    }
}
