use std::process::ExitCode;

use clap::Parser;
use clipy_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    clipy_lib::run(Cli::parse()).await
}
