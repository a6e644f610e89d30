//! Remodel CLI Application
//!
//! Command-line interface for the remodel renovation planner.

mod args;
mod cli;
mod export;
mod renderer;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args { no_color, command } = Args::parse();
    let cli = Cli::new(TerminalRenderer::new(!no_color));

    info!("Remodel started");

    match command {
        Run(args) => cli.run(args).await,
        Show(args) => cli.show(&args),
        Script(args) => cli.script(&args),
    }
}
